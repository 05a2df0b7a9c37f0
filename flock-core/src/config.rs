use crate::error::{ensure_non_negative, ensure_positive, Result};

/// Which update policy drives each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UpdatePolicyKind {
    /// Continuous Boids steering: five weighted forces summed every tick.
    #[default]
    WeightedForces,
    /// Discrete three-tier policy: avoid, interact, wander.
    PriorityDecision,
}

/// Constants for the weighted-force model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForceParams {
    pub separation_distance: f64,
    pub alignment_distance: f64,
    pub cohesion_distance: f64,
    pub max_speed: f64,
    pub max_force: f64,
    pub separation_weight: f64,
    pub alignment_weight: f64,
    pub cohesion_weight: f64,
    pub avoidance_weight: f64,
    pub attraction_weight: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            separation_distance: 25.0,
            alignment_distance: 50.0,
            cohesion_distance: 50.0,
            max_speed: 3.0,
            max_force: 0.1,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            avoidance_weight: 2.0,
            attraction_weight: 1.0,
        }
    }
}

/// Constants for the priority-decision model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecisionParams {
    /// Spacing at which two agents neither attract nor repel.
    pub perfect_distance: f64,
    pub max_speed: f64,
    /// Largest heading change per tick, in degrees.
    pub max_turn_angle: f64,
    pub time_step: f64,
}

impl Default for DecisionParams {
    fn default() -> Self {
        Self {
            perfect_distance: 8.0,
            max_speed: 5.0,
            max_turn_angle: 30.0,
            time_step: 1.0,
        }
    }
}

/// Attributes given to agents created without explicit values
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentTemplate {
    pub radius: f64,
    pub detection_radius: f64,
    pub field_of_view_angle: f64,
    pub default_speed: f64,
}

impl Default for AgentTemplate {
    fn default() -> Self {
        Self {
            radius: 5.0,
            detection_radius: 20.0,
            field_of_view_angle: 45.0,
            default_speed: 2.0,
        }
    }
}

/// Configuration for one simulation run. Fixed for the lifetime of the
/// state it was created with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    pub width: f64,
    pub height: f64,
    pub policy: UpdatePolicyKind,
    pub forces: ForceParams,
    pub decision: DecisionParams,
    pub agent: AgentTemplate,
    /// Population size used when resetting to defaults.
    pub initial_agents: usize,
    /// Seed for the random source; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            policy: UpdatePolicyKind::default(),
            forces: ForceParams::default(),
            decision: DecisionParams::default(),
            agent: AgentTemplate::default(),
            initial_agents: 30,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_policy(mut self, policy: UpdatePolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("width", self.width)?;
        ensure_positive("height", self.height)?;

        let f = &self.forces;
        ensure_non_negative("forces.separation_distance", f.separation_distance)?;
        ensure_non_negative("forces.alignment_distance", f.alignment_distance)?;
        ensure_non_negative("forces.cohesion_distance", f.cohesion_distance)?;
        ensure_non_negative("forces.max_speed", f.max_speed)?;
        ensure_non_negative("forces.max_force", f.max_force)?;
        ensure_non_negative("forces.separation_weight", f.separation_weight)?;
        ensure_non_negative("forces.alignment_weight", f.alignment_weight)?;
        ensure_non_negative("forces.cohesion_weight", f.cohesion_weight)?;
        ensure_non_negative("forces.avoidance_weight", f.avoidance_weight)?;
        ensure_non_negative("forces.attraction_weight", f.attraction_weight)?;

        let d = &self.decision;
        ensure_non_negative("decision.perfect_distance", d.perfect_distance)?;
        ensure_non_negative("decision.max_speed", d.max_speed)?;
        ensure_non_negative("decision.max_turn_angle", d.max_turn_angle)?;
        ensure_positive("decision.time_step", d.time_step)?;

        let a = &self.agent;
        ensure_non_negative("agent.radius", a.radius)?;
        ensure_non_negative("agent.detection_radius", a.detection_radius)?;
        ensure_non_negative("agent.field_of_view_angle", a.field_of_view_angle)?;
        ensure_non_negative("agent.default_speed", a.default_speed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_canvas() {
        let config = SimulationConfig {
            width: 0.0,
            ..Default::default()
        };
        match config.validate() {
            Err(SimulationError::InvalidParameter { name, .. }) => assert_eq!(name, "width"),
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_nan_weight() {
        let mut config = SimulationConfig::default();
        config.forces.cohesion_weight = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_time_step() {
        let mut config = SimulationConfig::default();
        config.decision.time_step = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_policies_keep_separate_speed_limits() {
        let config = SimulationConfig::default();
        assert_ne!(config.forces.max_speed, config.decision.max_speed);
    }
}
