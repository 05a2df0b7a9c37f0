//! Interchangeable per-tick update strategies.

use rand::RngCore;

use crate::behavior::steering_force;
use crate::config::{ForceParams, SimulationConfig, UpdatePolicyKind};
use crate::decision::DecisionEngine;
use crate::math::wrap_coordinate;
use crate::state::{Agent, SimulationState};
use crate::vector::{Point, Velocity};

/// Computes the next generation of agents from an immutable snapshot.
///
/// Implementations only move agents. Collision elimination and the step
/// counter belong to [`crate::engine::StepEngine`].
pub trait UpdatePolicy: Send + Sync {
    fn kind(&self) -> UpdatePolicyKind;

    /// Returns `snapshot` with every agent advanced by one tick and wrapped
    /// onto the canvas. Agents keep their order and ids.
    fn compute_next_state(&self, snapshot: &SimulationState, rng: &mut dyn RngCore) -> SimulationState;
}

/// Toroidal canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn wrap(&self, point: Point) -> Point {
        Point::new(
            wrap_coordinate(point.x, self.width),
            wrap_coordinate(point.y, self.height),
        )
    }
}

fn with_agents(snapshot: &SimulationState, agents: Vec<Agent>) -> SimulationState {
    SimulationState {
        agents,
        obstacles: snapshot.obstacles.clone(),
        attractor: snapshot.attractor,
        step: snapshot.step,
        running: snapshot.running,
    }
}

/// Continuous Boids steering with five weighted rules
pub struct WeightedForces {
    params: ForceParams,
    canvas: Canvas,
}

impl WeightedForces {
    pub fn new(params: ForceParams, canvas: Canvas) -> Self {
        Self { params, canvas }
    }

    pub fn update_agent(&self, agent: &Agent, snapshot: &SimulationState) -> Agent {
        let force = steering_force(
            agent,
            &snapshot.agents,
            &snapshot.obstacles,
            &snapshot.attractor,
            &self.params,
        );
        let velocity = (agent.velocity.to_vector() + force).limit(self.params.max_speed);

        let mut updated = agent.clone();
        updated.position = self.canvas.wrap(agent.position + velocity);
        updated.velocity = Velocity::from(velocity);
        updated
    }
}

impl UpdatePolicy for WeightedForces {
    fn kind(&self) -> UpdatePolicyKind {
        UpdatePolicyKind::WeightedForces
    }

    fn compute_next_state(&self, snapshot: &SimulationState, _rng: &mut dyn RngCore) -> SimulationState {
        let agents = snapshot
            .agents
            .iter()
            .map(|agent| self.update_agent(agent, snapshot))
            .collect();
        with_agents(snapshot, agents)
    }
}

/// Two-phase priority decisions: all agents decide, then all agents move
pub struct PriorityDecision {
    engine: DecisionEngine,
    canvas: Canvas,
}

impl PriorityDecision {
    pub fn new(engine: DecisionEngine, canvas: Canvas) -> Self {
        Self { engine, canvas }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }
}

impl UpdatePolicy for PriorityDecision {
    fn kind(&self) -> UpdatePolicyKind {
        UpdatePolicyKind::PriorityDecision
    }

    fn compute_next_state(&self, snapshot: &SimulationState, rng: &mut dyn RngCore) -> SimulationState {
        let decisions = self.engine.decide_all(snapshot, rng);

        let agents = snapshot
            .agents
            .iter()
            .zip(decisions.iter())
            .map(|(agent, decision)| {
                let mut moved = self.engine.apply(agent, decision);
                moved.position = self.canvas.wrap(moved.position);
                moved
            })
            .collect();
        with_agents(snapshot, agents)
    }
}

/// Builds the policy selected by `config.policy`.
pub fn policy_for(config: &SimulationConfig) -> Box<dyn UpdatePolicy> {
    let canvas = Canvas::new(config.width, config.height);
    match config.policy {
        UpdatePolicyKind::WeightedForces => Box::new(WeightedForces::new(config.forces, canvas)),
        UpdatePolicyKind::PriorityDecision => Box::new(PriorityDecision::new(
            DecisionEngine::new(config.decision),
            canvas,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentTemplate;
    use crate::state::AgentId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agent(id: &str, x: f64, y: f64, velocity: Velocity) -> Agent {
        Agent::new(AgentId::new(id), Point::new(x, y), velocity, &AgentTemplate::default())
    }

    #[test]
    fn test_canvas_wraps_every_edge() {
        let canvas = Canvas::new(1200.0, 800.0);
        let eps = 0.25;

        assert!((canvas.wrap(Point::new(1200.0 + eps, 400.0)).x - eps).abs() < 1e-9);
        assert!((canvas.wrap(Point::new(-eps, 400.0)).x - (1200.0 - eps)).abs() < 1e-9);
        assert!((canvas.wrap(Point::new(600.0, 800.0 + eps)).y - eps).abs() < 1e-9);
        assert!((canvas.wrap(Point::new(600.0, -eps)).y - (800.0 - eps)).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_update_clamps_speed_and_wraps() {
        let policy = WeightedForces::new(ForceParams::default(), Canvas::new(1200.0, 800.0));
        let a = agent("a", 1199.0, 400.0, Velocity::cartesian(10.0, 0.0));
        let snapshot = SimulationState::new(vec![a.clone()], Vec::new()).unwrap();

        let moved = policy.update_agent(&a, &snapshot);
        assert!((moved.velocity.speed() - 3.0).abs() < 1e-12);
        assert!((moved.position.x - 2.0).abs() < 1e-9);
        assert_eq!(moved.position.y, 400.0);
    }

    #[test]
    fn test_weighted_update_stands_still_without_forces() {
        let policy = WeightedForces::new(ForceParams::default(), Canvas::new(1200.0, 800.0));
        let a = agent("a", 600.0, 400.0, Velocity::cartesian(0.0, 0.0));
        let snapshot = SimulationState::new(vec![a.clone()], Vec::new()).unwrap();

        let moved = policy.update_agent(&a, &snapshot);
        assert_eq!(moved.position, a.position);
    }

    #[test]
    fn test_weighted_writes_cartesian_velocities() {
        let config = SimulationConfig::default();
        let policy = policy_for(&config);
        let snapshot = SimulationState::new(
            vec![agent("a", 100.0, 100.0, Velocity::polar(2.0, 90.0))],
            Vec::new(),
        )
        .unwrap();

        let next = policy.compute_next_state(&snapshot, &mut StdRng::seed_from_u64(0));
        assert!(matches!(next.agents[0].velocity, Velocity::Cartesian { .. }));
        assert!((next.agents[0].position.y - 102.0).abs() < 1e-9);
    }

    #[test]
    fn test_decisions_use_pre_tick_snapshot() {
        // b reacts to where a was, not to where a moves this tick
        let config = SimulationConfig::default().with_policy(UpdatePolicyKind::PriorityDecision);
        let policy = PriorityDecision::new(DecisionEngine::new(config.decision), Canvas::new(1200.0, 800.0));

        let a = agent("a", 100.0, 100.0, Velocity::polar(2.0, 0.0));
        let b = agent("b", 85.0, 100.0, Velocity::polar(2.0, 0.0));
        let forward = SimulationState::new(vec![a.clone(), b.clone()], Vec::new()).unwrap();
        let reversed = SimulationState::new(vec![b, a], Vec::new()).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        let first = policy.compute_next_state(&forward, &mut rng);
        let mut rng = StdRng::seed_from_u64(11);
        let second = policy.compute_next_state(&reversed, &mut rng);

        let b_first = first.agent(&AgentId::new("b")).unwrap();
        let b_second = second.agent(&AgentId::new("b")).unwrap();
        assert!((b_first.position.x - b_second.position.x).abs() < 1e-9);
        assert!((b_first.position.y - b_second.position.y).abs() < 1e-9);
    }

    #[test]
    fn test_policy_for_matches_config() {
        let weighted = policy_for(&SimulationConfig::default());
        assert_eq!(weighted.kind(), UpdatePolicyKind::WeightedForces);

        let priority = policy_for(&SimulationConfig::default().with_policy(UpdatePolicyKind::PriorityDecision));
        assert_eq!(priority.kind(), UpdatePolicyKind::PriorityDecision);
    }
}
