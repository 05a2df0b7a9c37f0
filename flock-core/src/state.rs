use std::collections::HashSet;
use std::fmt;

use rand::{Rng, RngCore};

use crate::config::{AgentTemplate, UpdatePolicyKind};
use crate::error::{ensure_non_negative, Result, SimulationError};
use crate::vector::{Point, PolarVelocity, Velocity};

/// Stable identity of an agent for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AgentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ObstacleId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Draws `bird_<hex>` ids until one is not in `taken`.
    pub fn generate(rng: &mut dyn RngCore, taken: &HashSet<&AgentId>) -> Self {
        loop {
            let candidate = AgentId(format!("bird_{:08x}", rng.next_u32()));
            if !taken.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl ObstacleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate(rng: &mut dyn RngCore, taken: &HashSet<&ObstacleId>) -> Self {
        loop {
            let candidate = ObstacleId(format!("obstacle_{:08x}", rng.next_u32()));
            if !taken.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single flocking agent
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,
    pub position: Point,
    pub velocity: Velocity,
    pub radius: f64,
    /// Reach of the field of view used by the decision policy.
    pub detection_radius: f64,
    /// Half-width of the field of view, in degrees either side of heading.
    pub field_of_view_angle: f64,
    /// Cruising speed used when wandering.
    pub default_speed: f64,
}

impl Agent {
    pub fn new(id: AgentId, position: Point, velocity: Velocity, template: &AgentTemplate) -> Self {
        Self {
            id,
            position,
            velocity,
            radius: template.radius,
            detection_radius: template.detection_radius,
            field_of_view_angle: template.field_of_view_angle,
            default_speed: template.default_speed,
        }
    }

    /// Places an agent uniformly on the canvas, cruising at the template
    /// speed in a random direction.
    pub fn random(
        id: AgentId,
        width: f64,
        height: f64,
        template: &AgentTemplate,
        policy: UpdatePolicyKind,
        rng: &mut dyn RngCore,
    ) -> Self {
        let position = Point::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
        let heading = rng.gen_range(0.0..360.0);
        let velocity = initial_velocity(template.default_speed, heading, policy);
        Self::new(id, position, velocity, template)
    }

    /// Current heading in degrees.
    pub fn heading(&self) -> f64 {
        self.velocity.to_polar().angle
    }

    pub fn validate(&self) -> Result<()> {
        if !self.position.is_finite() {
            return Err(SimulationError::invalid(
                "agent.position",
                format!("agent {} has a non-finite position", self.id),
            ));
        }
        if !self.velocity.is_finite() {
            return Err(SimulationError::invalid(
                "agent.velocity",
                format!("agent {} has a non-finite velocity", self.id),
            ));
        }
        ensure_non_negative("agent.radius", self.radius)?;
        ensure_non_negative("agent.detection_radius", self.detection_radius)?;
        ensure_non_negative("agent.field_of_view_angle", self.field_of_view_angle)?;
        ensure_non_negative("agent.default_speed", self.default_speed)?;
        Ok(())
    }
}

/// Velocity for a freshly placed agent, in the form the policy works in.
pub fn initial_velocity(speed: f64, heading: f64, policy: UpdatePolicyKind) -> Velocity {
    let polar = PolarVelocity::new(speed, heading);
    match policy {
        UpdatePolicyKind::WeightedForces => polar.to_vector().into(),
        UpdatePolicyKind::PriorityDecision => polar.into(),
    }
}

/// A static circular obstacle
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub id: ObstacleId,
    pub position: Point,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(id: ObstacleId, position: Point, radius: f64) -> Self {
        Self {
            id,
            position,
            radius,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.position.is_finite() {
            return Err(SimulationError::invalid(
                "obstacle.position",
                format!("obstacle {} has a non-finite position", self.id),
            ));
        }
        ensure_non_negative("obstacle.radius", self.radius)
    }
}

/// The single global attraction point. Exerts no force while inactive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attractor {
    pub position: Point,
    pub active: bool,
}

/// Everything that changes between ticks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationState {
    pub agents: Vec<Agent>,
    pub obstacles: Vec<Obstacle>,
    pub attractor: Attractor,
    pub step: u64,
    pub running: bool,
}

impl SimulationState {
    /// Builds a running state at step 0 after validating every entity and
    /// checking that ids are unique.
    pub fn new(mut agents: Vec<Agent>, obstacles: Vec<Obstacle>) -> Result<Self> {
        let mut agent_ids = HashSet::with_capacity(agents.len());
        for agent in &agents {
            agent.validate()?;
            if !agent_ids.insert(&agent.id) {
                return Err(SimulationError::invalid(
                    "agent.id",
                    format!("duplicate agent id {}", agent.id),
                ));
            }
        }

        let mut obstacle_ids = HashSet::with_capacity(obstacles.len());
        for obstacle in &obstacles {
            obstacle.validate()?;
            if !obstacle_ids.insert(&obstacle.id) {
                return Err(SimulationError::invalid(
                    "obstacle.id",
                    format!("duplicate obstacle id {}", obstacle.id),
                ));
            }
        }

        // Deserialized polar velocities skip the normalizing constructor.
        for agent in &mut agents {
            agent.velocity = agent.velocity.normalized();
        }

        Ok(Self {
            agents,
            obstacles,
            attractor: Attractor::default(),
            step: 0,
            running: true,
        })
    }

    pub fn empty() -> Self {
        Self {
            agents: Vec::new(),
            obstacles: Vec::new(),
            attractor: Attractor::default(),
            step: 0,
            running: true,
        }
    }

    /// Three birds and two obstacles clustered near the origin.
    pub fn demo() -> Self {
        let template = AgentTemplate {
            radius: 1.0,
            ..AgentTemplate::default()
        };
        let bird = |id: &str, x: f64, y: f64, heading: f64| {
            Agent::new(
                AgentId::new(id),
                Point::new(x, y),
                Velocity::polar(template.default_speed, heading),
                &template,
            )
        };

        Self {
            agents: vec![
                bird("bird_1", 0.0, 0.0, 0.0),
                bird("bird_2", 10.0, 10.0, 45.0),
                bird("bird_3", -10.0, 5.0, 90.0),
            ],
            obstacles: vec![
                Obstacle::new(ObstacleId::new("obstacle_1"), Point::new(15.0, 15.0), 3.0),
                Obstacle::new(ObstacleId::new("obstacle_2"), Point::new(25.0, 5.0), 2.0),
            ],
            attractor: Attractor::default(),
            step: 0,
            running: true,
        }
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| &agent.id == id)
    }

    pub fn agent_ids(&self) -> HashSet<&AgentId> {
        self.agents.iter().map(|agent| &agent.id).collect()
    }

    pub fn obstacle_ids(&self) -> HashSet<&ObstacleId> {
        self.obstacles.iter().map(|obstacle| &obstacle.id).collect()
    }

    /// Flips the running flag and returns the new value.
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agent(id: &str, x: f64, y: f64) -> Agent {
        Agent::new(
            AgentId::new(id),
            Point::new(x, y),
            Velocity::cartesian(1.0, 0.0),
            &AgentTemplate::default(),
        )
    }

    #[test]
    fn test_new_state_starts_running_at_step_zero() {
        let state = SimulationState::new(vec![agent("a", 1.0, 1.0)], Vec::new()).unwrap();
        assert_eq!(state.step, 0);
        assert!(state.running);
        assert!(!state.attractor.active);
    }

    #[test]
    fn test_duplicate_agent_ids_rejected() {
        let result = SimulationState::new(vec![agent("a", 1.0, 1.0), agent("a", 2.0, 2.0)], Vec::new());
        assert!(matches!(result, Err(SimulationError::InvalidParameter { name: "agent.id", .. })));
    }

    #[test]
    fn test_negative_obstacle_radius_rejected() {
        let obstacle = Obstacle::new(ObstacleId::new("o"), Point::new(0.0, 0.0), -1.0);
        assert!(SimulationState::new(Vec::new(), vec![obstacle]).is_err());
    }

    #[test]
    fn test_nan_position_rejected() {
        let result = SimulationState::new(vec![agent("a", f64::NAN, 1.0)], Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_polar_angles_are_normalized_on_create() {
        let template = AgentTemplate::default();
        let agent = Agent::new(
            AgentId::new("bird_1"),
            Point::new(1.0, 1.0),
            Velocity::Polar { speed: 2.0, angle: 450.0 },
            &template,
        );
        let backwards = Agent::new(
            AgentId::new("bird_2"),
            Point::new(2.0, 2.0),
            Velocity::Polar { speed: 2.0, angle: -90.0 },
            &template,
        );

        let state = SimulationState::new(vec![agent, backwards], Vec::new()).unwrap();
        assert_eq!(state.agents[0].velocity, Velocity::Polar { speed: 2.0, angle: 90.0 });
        assert_eq!(state.agents[1].velocity, Velocity::Polar { speed: 2.0, angle: 270.0 });
    }

    #[test]
    fn test_toggle_running() {
        let mut state = SimulationState::empty();
        assert!(!state.toggle_running());
        assert!(state.toggle_running());
    }

    #[test]
    fn test_generated_ids_avoid_taken() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = AgentId::generate(&mut rng, &HashSet::new());

        let mut replay = StdRng::seed_from_u64(7);
        let taken: HashSet<&AgentId> = [&first].into_iter().collect();
        let second = AgentId::generate(&mut replay, &taken);

        assert_ne!(first, second);
        assert!(second.0.starts_with("bird_"));
    }

    #[test]
    fn test_random_agent_is_on_canvas() {
        let mut rng = StdRng::seed_from_u64(1);
        let template = AgentTemplate::default();
        for n in 0..50 {
            let agent = Agent::random(
                AgentId::new(format!("bird_{}", n)),
                100.0,
                50.0,
                &template,
                UpdatePolicyKind::PriorityDecision,
                &mut rng,
            );
            assert!((0.0..100.0).contains(&agent.position.x));
            assert!((0.0..50.0).contains(&agent.position.y));
            assert!(matches!(agent.velocity, Velocity::Polar { .. }));
        }
    }

    #[test]
    fn test_demo_fixture() {
        let demo = SimulationState::demo();
        assert_eq!(demo.agents.len(), 3);
        assert_eq!(demo.obstacles.len(), 2);
        assert!(SimulationState::new(demo.agents, demo.obstacles).is_ok());
    }
}
