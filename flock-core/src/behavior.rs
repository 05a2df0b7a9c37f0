//! Steering rules for the weighted-force model.
//!
//! Every rule reads an immutable snapshot and skips the acting agent by id.

use crate::config::ForceParams;
use crate::state::{Agent, Attractor, Obstacle};
use crate::vector::Vector2D;

/// Extra clearance beyond the touching distance at which avoidance starts.
pub const OBSTACLE_AVOID_MARGIN: f64 = 10.0;

/// Distance at which the attractor's pull stops saturating.
pub const ATTRACTION_SATURATION_DISTANCE: f64 = 100.0;

/// Neighbours within `max_distance`, excluding the agent itself and any
/// neighbour sitting exactly on top of it.
fn neighbours<'a, I>(
    agent: &'a Agent,
    others: I,
    max_distance: f64,
) -> impl Iterator<Item = (&'a Agent, f64)> + 'a
where
    I: Iterator<Item = &'a Agent> + 'a,
{
    others.filter_map(move |other| {
        if other.id == agent.id {
            return None;
        }
        let distance = agent.position.distance(&other.position);
        (distance > 0.0 && distance < max_distance).then_some((other, distance))
    })
}

pub fn separation<'a, I>(agent: &'a Agent, others: I, params: &ForceParams) -> Vector2D
where
    I: Iterator<Item = &'a Agent> + 'a,
{
    let mut steering = Vector2D::zero();
    let mut count = 0;

    for (other, distance) in neighbours(agent, others, params.separation_distance) {
        let away = (agent.position - other.position).normalize();
        steering += away / distance;
        count += 1;
    }

    if count > 0 {
        steering = steering / count as f64;
    }

    steering.limit(params.max_force)
}

pub fn alignment<'a, I>(agent: &'a Agent, others: I, params: &ForceParams) -> Vector2D
where
    I: Iterator<Item = &'a Agent> + 'a,
{
    let mut sum = Vector2D::zero();
    let mut count = 0;

    for (other, _) in neighbours(agent, others, params.alignment_distance) {
        sum += other.velocity.to_vector();
        count += 1;
    }

    if count > 0 {
        (sum / count as f64).limit(params.max_force)
    } else {
        Vector2D::zero()
    }
}

pub fn cohesion<'a, I>(agent: &'a Agent, others: I, params: &ForceParams) -> Vector2D
where
    I: Iterator<Item = &'a Agent> + 'a,
{
    let mut center = Vector2D::zero();
    let mut count = 0;

    for (other, _) in neighbours(agent, others, params.cohesion_distance) {
        center += other.position;
        count += 1;
    }

    if count > 0 {
        center = center / count as f64;
        (center - agent.position).limit(params.max_force)
    } else {
        Vector2D::zero()
    }
}

/// Repulsion from every obstacle closer than its radius plus the agent's
/// radius plus [`OBSTACLE_AVOID_MARGIN`], growing linearly as the gap
/// closes. Contributions are summed, not averaged.
pub fn avoid_obstacles<'a, I>(agent: &Agent, obstacles: I, params: &ForceParams) -> Vector2D
where
    I: Iterator<Item = &'a Obstacle>,
{
    let mut steering = Vector2D::zero();

    for obstacle in obstacles {
        let distance = agent.position.distance(&obstacle.position);
        let avoid_distance = obstacle.radius + agent.radius + OBSTACLE_AVOID_MARGIN;

        if distance < avoid_distance {
            let strength = 1.0 - distance / avoid_distance;
            steering += (agent.position - obstacle.position) * strength;
        }
    }

    steering.limit(params.max_force)
}

/// Pull toward an active attractor.
///
/// Capped at twice `max_force`, so a strong attractor can outweigh the
/// flocking rules.
pub fn attraction(agent: &Agent, attractor: &Attractor, params: &ForceParams) -> Vector2D {
    if !attractor.active {
        return Vector2D::zero();
    }

    let mut steering = attractor.position - agent.position;
    let distance = agent.position.distance(&attractor.position);
    if distance > 0.0 {
        steering = steering * (ATTRACTION_SATURATION_DISTANCE / distance).min(1.0);
    }

    steering.limit(params.max_force * 2.0)
}

/// Weighted sum of all five rules for one agent.
pub fn steering_force(
    agent: &Agent,
    agents: &[Agent],
    obstacles: &[Obstacle],
    attractor: &Attractor,
    params: &ForceParams,
) -> Vector2D {
    let sep = separation(agent, agents.iter(), params) * params.separation_weight;
    let ali = alignment(agent, agents.iter(), params) * params.alignment_weight;
    let coh = cohesion(agent, agents.iter(), params) * params.cohesion_weight;
    let avoid = avoid_obstacles(agent, obstacles.iter(), params) * params.avoidance_weight;
    let attract = attraction(agent, attractor, params) * params.attraction_weight;

    sep + ali + coh + avoid + attract
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentTemplate;
    use crate::state::{AgentId, ObstacleId};
    use crate::vector::{Point, Velocity};

    fn agent(id: &str, x: f64, y: f64, dx: f64, dy: f64) -> Agent {
        Agent::new(
            AgentId::new(id),
            Point::new(x, y),
            Velocity::cartesian(dx, dy),
            &AgentTemplate::default(),
        )
    }

    fn params() -> ForceParams {
        ForceParams {
            max_force: 1.0,
            ..ForceParams::default()
        }
    }

    #[test]
    fn test_rules_without_neighbours_are_zero() {
        let lone = agent("a", 100.0, 100.0, 1.0, 0.0);
        let far = agent("b", 900.0, 700.0, 0.0, 1.0);
        let flock = vec![lone.clone(), far];

        assert_eq!(separation(&lone, flock.iter(), &params()), Vector2D::zero());
        assert_eq!(alignment(&lone, flock.iter(), &params()), Vector2D::zero());
        assert_eq!(cohesion(&lone, flock.iter(), &params()), Vector2D::zero());
    }

    #[test]
    fn test_agent_never_counts_itself() {
        let a = agent("a", 10.0, 10.0, 1.0, 0.0);
        let flock = vec![a.clone()];
        assert_eq!(alignment(&a, flock.iter(), &params()), Vector2D::zero());
    }

    #[test]
    fn test_separation_points_away() {
        let a = agent("a", 10.0, 10.0, 0.0, 0.0);
        let b = agent("b", 15.0, 10.0, 0.0, 0.0);
        let flock = vec![a.clone(), b];

        let force = separation(&a, flock.iter(), &params());
        // unit vector (-1, 0) scaled by 1/5
        assert!((force.x + 0.2).abs() < 1e-12);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn test_separation_is_clamped() {
        let a = agent("a", 10.0, 10.0, 0.0, 0.0);
        let b = agent("b", 10.5, 10.0, 0.0, 0.0);
        let flock = vec![a.clone(), b];
        let tight = ForceParams {
            max_force: 0.1,
            ..ForceParams::default()
        };

        let force = separation(&a, flock.iter(), &tight);
        assert!((force.magnitude() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_alignment_averages_velocities() {
        let a = agent("a", 0.0, 0.0, 0.0, 0.0);
        let b = agent("b", 10.0, 0.0, 0.4, 0.0);
        let c = agent("c", 0.0, 10.0, 0.0, 0.2);
        let flock = vec![a.clone(), b, c];

        let force = alignment(&a, flock.iter(), &params());
        assert!((force.x - 0.2).abs() < 1e-12);
        assert!((force.y - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_cohesion_steers_to_centre() {
        let a = agent("a", 0.0, 0.0, 0.0, 0.0);
        let b = agent("b", 0.4, 0.0, 0.0, 0.0);
        let c = agent("c", 0.0, 0.4, 0.0, 0.0);
        let flock = vec![a.clone(), b, c];

        let force = cohesion(&a, flock.iter(), &params());
        assert!((force.x - 0.2).abs() < 1e-12);
        assert!((force.y - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_obstacle_avoidance_grows_when_closer() {
        let obstacle = Obstacle::new(ObstacleId::new("o"), Point::new(0.0, 0.0), 10.0);
        let obstacles = vec![obstacle];
        let loose = ForceParams {
            max_force: 100.0,
            ..ForceParams::default()
        };

        let near = avoid_obstacles(&agent("a", 16.0, 0.0, 0.0, 0.0), obstacles.iter(), &loose);
        let far = avoid_obstacles(&agent("a", 24.0, 0.0, 0.0, 0.0), obstacles.iter(), &loose);
        let outside = avoid_obstacles(&agent("a", 26.0, 0.0, 0.0, 0.0), obstacles.iter(), &loose);

        assert!(near.x > 0.0);
        assert!(far.x > 0.0);
        assert!(near.x / 16.0 > far.x / 24.0);
        assert_eq!(outside, Vector2D::zero());
    }

    #[test]
    fn test_inactive_attractor_is_zero() {
        let attractor = Attractor {
            position: Point::new(500.0, 500.0),
            active: false,
        };
        let a = agent("a", 0.0, 0.0, 0.0, 0.0);
        assert_eq!(attraction(&a, &attractor, &params()), Vector2D::zero());
    }

    #[test]
    fn test_attraction_may_exceed_max_force() {
        let attractor = Attractor {
            position: Point::new(500.0, 0.0),
            active: true,
        };
        let a = agent("a", 0.0, 0.0, 0.0, 0.0);
        let p = ForceParams {
            max_force: 0.1,
            ..ForceParams::default()
        };

        let force = attraction(&a, &attractor, &p);
        assert!((force.magnitude() - 0.2).abs() < 1e-12);
        assert!(force.x > 0.0);
    }

    #[test]
    fn test_attraction_saturates_far_away() {
        let attractor = Attractor {
            position: Point::new(400.0, 0.0),
            active: true,
        };
        let a = agent("a", 0.0, 0.0, 0.0, 0.0);
        let p = ForceParams {
            max_force: 1000.0,
            ..ForceParams::default()
        };

        // 400 * min(1, 100 / 400)
        let force = attraction(&a, &attractor, &p);
        assert!((force.x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_steering_force_applies_weights() {
        let a = agent("a", 0.0, 0.0, 0.0, 0.0);
        let b = agent("b", 10.0, 0.0, 0.5, 0.0);
        let flock = vec![a.clone(), b];
        let p = ForceParams {
            separation_weight: 0.0,
            cohesion_weight: 0.0,
            alignment_weight: 2.0,
            max_force: 1.0,
            ..ForceParams::default()
        };

        let force = steering_force(&a, &flock, &[], &Attractor::default(), &p);
        assert!((force.x - 1.0).abs() < 1e-12);
        assert_eq!(force.y, 0.0);
    }
}
