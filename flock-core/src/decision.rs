//! Priority-based decision model.
//!
//! Each agent picks exactly one intent per tick, in order: steer clear of an
//! obstacle it can see, react to the neighbours it can see, or wander.

use rand::{Rng, RngCore};

use crate::config::DecisionParams;
use crate::math::{angle_difference, compose_velocities, limit_velocity, normalize_angle};
use crate::state::{Agent, AgentId, Obstacle, SimulationState};
use crate::vector::{Point, PolarVelocity, Vector2D};

/// Clearance added to an obstacle's radius before it triggers avoidance.
pub const OBSTACLE_SAFETY_MARGIN: f64 = 5.0;

/// Headings closer than this count as flying the same way.
pub const SAME_HEADING_ANGLE: f64 = 45.0;

/// Largest random heading jitter while wandering, in degrees.
pub const WANDER_JITTER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DecisionReason {
    ObstacleAvoidance,
    BirdInteraction,
    RandomMove,
}

impl DecisionReason {
    /// 1 is the most urgent tier.
    pub fn priority(self) -> u8 {
        match self {
            DecisionReason::ObstacleAvoidance => 1,
            DecisionReason::BirdInteraction => 2,
            DecisionReason::RandomMove => 3,
        }
    }
}

/// The intent chosen for one agent during the decision phase
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionResult {
    pub agent_id: AgentId,
    pub velocity: PolarVelocity,
    pub priority: u8,
    pub reason: DecisionReason,
}

impl DecisionResult {
    fn new(agent_id: AgentId, velocity: PolarVelocity, reason: DecisionReason) -> Self {
        Self {
            agent_id,
            velocity,
            priority: reason.priority(),
            reason,
        }
    }
}

/// True iff `target` is within the agent's detection radius and within
/// `field_of_view_angle` degrees of its heading.
pub fn is_in_fov(agent: &Agent, target: Point) -> bool {
    let distance = agent.position.distance(&target);
    if distance > agent.detection_radius {
        return false;
    }

    let bearing = (target - agent.position).heading();
    angle_difference(bearing, agent.heading()).abs() <= agent.field_of_view_angle
}

/// Tier 1: stop and swing 90 degrees away from the first visible obstacle
/// inside its safety margin.
pub fn avoid_obstacles<'a, I>(agent: &Agent, obstacles: I) -> Option<PolarVelocity>
where
    I: Iterator<Item = &'a Obstacle>,
{
    let current = agent.velocity.to_polar();

    for obstacle in obstacles {
        if !is_in_fov(agent, obstacle.position) {
            continue;
        }

        let distance = agent.position.distance(&obstacle.position);
        if distance < obstacle.radius + OBSTACLE_SAFETY_MARGIN {
            let rotation = if current.speed < 0.0 { -1.0 } else { 1.0 };
            return Some(PolarVelocity {
                speed: 0.0,
                angle: normalize_angle(current.angle + 90.0 * rotation),
            });
        }
    }

    None
}

/// Tier 2: average the pull or push of every visible neighbour.
///
/// Neighbours closer than `perfect_distance` repel, farther ones attract, and
/// one at exactly that distance is ignored. A neighbour flying the same way
/// counts double.
pub fn interact_with_agents<'a, I>(
    agent: &Agent,
    others: I,
    perfect_distance: f64,
) -> Option<PolarVelocity>
where
    I: Iterator<Item = &'a Agent>,
{
    let heading = agent.heading();
    let mut composite = Vector2D::zero();
    let mut count = 0;

    for other in others {
        if other.id == agent.id || !is_in_fov(agent, other.position) {
            continue;
        }

        let distance = agent.position.distance(&other.position);
        let bearing = (other.position - agent.position).heading();

        let mut interaction = if distance < perfect_distance {
            PolarVelocity::new(-1.0, bearing + 180.0)
        } else if distance > perfect_distance {
            PolarVelocity::new(1.0, bearing)
        } else {
            continue;
        };

        if angle_difference(other.heading(), heading).abs() < SAME_HEADING_ANGLE {
            interaction.speed *= 2.0;
        }

        composite += interaction.to_vector();
        count += 1;
    }

    if count > 0 {
        Some(PolarVelocity::from_vector(composite / count as f64))
    } else {
        None
    }
}

/// Tier 3: cruise at the default speed with a small random heading jitter.
pub fn random_move(agent: &Agent, rng: &mut dyn RngCore) -> PolarVelocity {
    let jitter = rng.gen_range(-WANDER_JITTER..=WANDER_JITTER);
    PolarVelocity::new(agent.default_speed, agent.heading() + jitter)
}

pub struct DecisionEngine {
    params: DecisionParams,
}

impl DecisionEngine {
    pub fn new(params: DecisionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DecisionParams {
        &self.params
    }

    pub fn decide(
        &self,
        agent: &Agent,
        snapshot: &SimulationState,
        rng: &mut dyn RngCore,
    ) -> DecisionResult {
        if let Some(velocity) = avoid_obstacles(agent, snapshot.obstacles.iter()) {
            return DecisionResult::new(agent.id.clone(), velocity, DecisionReason::ObstacleAvoidance);
        }

        if let Some(velocity) =
            interact_with_agents(agent, snapshot.agents.iter(), self.params.perfect_distance)
        {
            return DecisionResult::new(agent.id.clone(), velocity, DecisionReason::BirdInteraction);
        }

        DecisionResult::new(agent.id.clone(), random_move(agent, rng), DecisionReason::RandomMove)
    }

    /// Phase one of a tick: every agent decides against the same snapshot.
    pub fn decide_all(&self, snapshot: &SimulationState, rng: &mut dyn RngCore) -> Vec<DecisionResult> {
        snapshot
            .agents
            .iter()
            .map(|agent| self.decide(agent, snapshot, &mut *rng))
            .collect()
    }

    /// Phase two: turn a decision into the agent's next velocity and
    /// position. Canvas wrapping is left to the caller.
    pub fn apply(&self, agent: &Agent, decision: &DecisionResult) -> Agent {
        let current = agent.velocity.to_polar();

        let desired = compose_velocities(current, decision.velocity);
        let next = limit_velocity(
            current,
            desired,
            self.params.max_speed,
            self.params.max_turn_angle,
        );

        let mut updated = agent.clone();
        updated.position += next.to_vector() * self.params.time_step;
        updated.velocity = next.into();
        updated
    }
}
