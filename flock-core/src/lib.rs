pub mod behavior;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod math;
pub mod policy;
pub mod simulation;
pub mod state;
pub mod vector;

pub use config::{AgentTemplate, DecisionParams, ForceParams, SimulationConfig, UpdatePolicyKind};
pub use decision::{DecisionEngine, DecisionReason, DecisionResult};
pub use engine::{StepEngine, TickOutcome};
pub use error::{Result, SimulationError};
pub use policy::{Canvas, PriorityDecision, UpdatePolicy, WeightedForces};
pub use simulation::Simulation;
pub use state::{Agent, AgentId, Attractor, Obstacle, ObstacleId, SimulationState};
pub use vector::{Point, PolarVelocity, Vector2D, Velocity};
