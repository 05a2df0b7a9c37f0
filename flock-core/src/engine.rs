use rand::RngCore;

use crate::config::{SimulationConfig, UpdatePolicyKind};
use crate::error::Result;
use crate::policy::{policy_for, UpdatePolicy};
use crate::state::{Agent, AgentId, Obstacle, SimulationState};

/// What a call to [`StepEngine::step`] did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The simulation is stopped; nothing changed.
    Skipped,
    Advanced {
        step: u64,
        /// Agents removed by collision this tick, in population order.
        eliminated: Vec<AgentId>,
    },
}

/// True when the agent overlaps any obstacle.
pub fn collides(agent: &Agent, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .any(|obstacle| agent.position.distance(&obstacle.position) < obstacle.radius + agent.radius)
}

/// Splits the population into survivors and the ids of agents touching an
/// obstacle. Builds a fresh list; the input is never edited in place.
pub fn eliminate_collisions(agents: Vec<Agent>, obstacles: &[Obstacle]) -> (Vec<Agent>, Vec<AgentId>) {
    let mut alive = Vec::with_capacity(agents.len());
    let mut eliminated = Vec::new();

    for agent in agents {
        if collides(&agent, obstacles) {
            eliminated.push(agent.id);
        } else {
            alive.push(agent);
        }
    }

    (alive, eliminated)
}

/// Runs ticks: update policy first, then collision elimination, then the
/// step counter.
pub struct StepEngine {
    policy: Box<dyn UpdatePolicy>,
}

impl StepEngine {
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: policy_for(config),
        })
    }

    pub fn with_policy(policy: Box<dyn UpdatePolicy>) -> Self {
        Self { policy }
    }

    pub fn policy_kind(&self) -> UpdatePolicyKind {
        self.policy.kind()
    }

    pub fn step(&self, state: &mut SimulationState, rng: &mut dyn RngCore) -> TickOutcome {
        if !state.running {
            return TickOutcome::Skipped;
        }

        let next = self.policy.compute_next_state(state, rng);
        let (alive, eliminated) = eliminate_collisions(next.agents, &state.obstacles);

        if !eliminated.is_empty() {
            log::debug!(
                "step {}: {} agent(s) hit an obstacle",
                state.step + 1,
                eliminated.len()
            );
        }

        state.agents = alive;
        state.step += 1;

        TickOutcome::Advanced {
            step: state.step,
            eliminated,
        }
    }
}
