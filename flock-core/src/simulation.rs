use rand::{Rng, RngCore};

use crate::config::SimulationConfig;
use crate::engine::{StepEngine, TickOutcome};
use crate::error::{ensure_non_negative, Result, SimulationError};
use crate::state::{initial_velocity, Agent, AgentId, Attractor, Obstacle, ObstacleId, SimulationState};
use crate::vector::Point;

fn ensure_finite_point(name: &'static str, point: Point) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            name,
            format!("coordinates must be finite, got ({}, {})", point.x, point.y),
        ))
    }
}

/// A live simulation: state plus the fixed configuration and engine that
/// advance it.
pub struct Simulation {
    state: SimulationState,
    config: SimulationConfig,
    engine: StepEngine,
}

impl Simulation {
    pub fn new(state: SimulationState, config: SimulationConfig) -> Result<Self> {
        let engine = StepEngine::new(&config)?;
        let SimulationState {
            agents,
            obstacles,
            attractor,
            step,
            running,
        } = state;
        ensure_finite_point("attractor.position", attractor.position)?;

        let mut state = SimulationState::new(agents, obstacles)?;
        state.attractor = attractor;
        state.step = step;
        state.running = running;

        Ok(Self {
            state,
            config,
            engine,
        })
    }

    /// Creates a running simulation at step 0 from caller-supplied entities.
    pub fn create(agents: Vec<Agent>, obstacles: Vec<Obstacle>, config: SimulationConfig) -> Result<Self> {
        Self::new(SimulationState::new(agents, obstacles)?, config)
    }

    /// `config.initial_agents` agents scattered over the canvas, no obstacles.
    pub fn with_default_population(config: SimulationConfig, rng: &mut dyn RngCore) -> Result<Self> {
        config.validate()?;

        let mut agents: Vec<Agent> = Vec::with_capacity(config.initial_agents);
        for _ in 0..config.initial_agents {
            let id = {
                let taken = agents.iter().map(|agent| &agent.id).collect();
                AgentId::generate(rng, &taken)
            };
            agents.push(Agent::random(
                id,
                config.width,
                config.height,
                &config.agent,
                config.policy,
                rng,
            ));
        }

        Self::create(agents, Vec::new(), config)
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn into_state(self) -> SimulationState {
        self.state
    }

    pub fn step(&mut self, rng: &mut dyn RngCore) -> TickOutcome {
        self.engine.step(&mut self.state, rng)
    }

    /// Advances up to `count` ticks; a count of zero or less runs one.
    /// Returns the outcome of every tick attempted.
    pub fn step_many(&mut self, count: i64, rng: &mut dyn RngCore) -> Vec<TickOutcome> {
        let count = count.max(1);
        let mut outcomes = Vec::new();
        for _ in 0..count {
            let outcome = self.step(rng);
            let skipped = outcome == TickOutcome::Skipped;
            outcomes.push(outcome);
            if skipped {
                break;
            }
        }
        outcomes
    }

    /// Adds an agent built from the configured template, heading in a
    /// random direction at its default speed.
    pub fn add_agent(&mut self, position: Point, rng: &mut dyn RngCore) -> Result<&Agent> {
        ensure_finite_point("position", position)?;

        let id = AgentId::generate(rng, &self.state.agent_ids());
        let heading = rng.gen_range(0.0..360.0);
        let template = self.config.agent;
        let velocity = initial_velocity(template.default_speed, heading, self.config.policy);

        self.state.agents.push(Agent::new(id, position, velocity, &template));
        log::debug!("added agent at ({:.1}, {:.1})", position.x, position.y);
        Ok(&self.state.agents[self.state.agents.len() - 1])
    }

    pub fn add_obstacle(&mut self, position: Point, radius: f64, rng: &mut dyn RngCore) -> Result<&Obstacle> {
        ensure_finite_point("position", position)?;
        ensure_non_negative("radius", radius)?;

        let id = ObstacleId::generate(rng, &self.state.obstacle_ids());
        self.state.obstacles.push(Obstacle::new(id, position, radius));
        log::debug!(
            "added obstacle at ({:.1}, {:.1}) radius {:.1}",
            position.x,
            position.y,
            radius
        );
        Ok(&self.state.obstacles[self.state.obstacles.len() - 1])
    }

    pub fn set_attractor(&mut self, position: Point, active: bool) -> Result<()> {
        ensure_finite_point("position", position)?;
        self.state.attractor = Attractor { position, active };
        Ok(())
    }

    pub fn toggle_running(&mut self) -> bool {
        self.state.toggle_running()
    }
}
