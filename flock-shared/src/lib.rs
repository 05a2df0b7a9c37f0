use flock_core::{Agent, Obstacle, Point, SimulationConfig, SimulationError, SimulationState};
use serde::{Deserialize, Serialize};

/// Request to drop a new agent at a canvas position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AddAgentRequest {
    pub x: f64,
    pub y: f64,
}

impl AddAgentRequest {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Request to place a circular obstacle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AddObstacleRequest {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl AddObstacleRequest {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Request to move and/or (de)activate the attractor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SetAttractorRequest {
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

impl SetAttractorRequest {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Request to advance the simulation. A missing or non-positive count runs
/// a single tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct StepRequest {
    #[serde(default)]
    pub count: Option<i64>,
}

impl StepRequest {
    pub fn ticks(&self) -> i64 {
        self.count.unwrap_or(1).max(1)
    }
}

/// Request to replace the live simulation wholesale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSimulationRequest {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    /// Defaults apply when absent.
    #[serde(default)]
    pub config: Option<SimulationConfig>,
}

/// Full state returned by every state-changing operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResponse {
    pub state: SimulationState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessResponse {
    pub message: String,
    pub success: bool,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

/// Serialized form of a [`SimulationError`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl From<&SimulationError> for ErrorResponse {
    fn from(err: &SimulationError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

/// Population and control-flag overview of a simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationSummary {
    pub agent_count: usize,
    pub obstacle_count: usize,
    pub step: u64,
    pub running: bool,
    pub attractor_active: bool,
}

impl From<&SimulationState> for SimulationSummary {
    fn from(state: &SimulationState) -> Self {
        Self {
            agent_count: state.agents.len(),
            obstacle_count: state.obstacles.len(),
            step: state.step,
            running: state.running,
            attractor_active: state.attractor.active,
        }
    }
}
