//! Request dispatch for whatever transport fronts the service.
//!
//! Each command carries the same request record the shared crate defines and
//! yields either a response record or an [`ErrorResponse`].

use flock_core::SimulationError;
use flock_shared::{
    AddAgentRequest, AddObstacleRequest, CreateSimulationRequest, ErrorResponse,
    SetAttractorRequest, SimulationResponse, SimulationSummary, StepRequest, SuccessResponse,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

use crate::service::SimulationService;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Create(CreateSimulationRequest),
    Step(StepRequest),
    GetState,
    Summary,
    AddAgent(AddAgentRequest),
    AddObstacle(AddObstacleRequest),
    SetAttractor(SetAttractorRequest),
    Toggle,
    Reset,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reply {
    State(SimulationResponse),
    Summary(SimulationSummary),
    Success(SuccessResponse),
}

pub type CommandResult = std::result::Result<Reply, ErrorResponse>;

fn state_reply(result: flock_core::Result<flock_core::SimulationState>) -> CommandResult {
    result
        .map(|state| Reply::State(SimulationResponse { state }))
        .map_err(|err: SimulationError| ErrorResponse::from(&err))
}

pub fn dispatch(service: &SimulationService, command: Command) -> CommandResult {
    match command {
        Command::Create(request) => state_reply(service.create_simulation(
            request.agents,
            request.obstacles,
            request.config,
        )),
        Command::Step(request) => state_reply(service.step(request.ticks())),
        Command::GetState => state_reply(service.get_state()),
        Command::Summary => service
            .summary()
            .map(Reply::Summary)
            .map_err(|err| ErrorResponse::from(&err)),
        Command::AddAgent(request) => state_reply(service.add_agent(request.position())),
        Command::AddObstacle(request) => {
            state_reply(service.add_obstacle(request.position(), request.radius))
        }
        Command::SetAttractor(request) => {
            state_reply(service.set_attractor(request.position(), request.active))
        }
        Command::Toggle => state_reply(service.toggle_running()),
        Command::Reset => service
            .reset()
            .map(|_| Reply::Success(SuccessResponse::new("Simulation reset")))
            .map_err(|err| ErrorResponse::from(&err)),
    }
}

/// Applies newline-delimited JSON commands in order. Blank lines and lines
/// starting with `#` are skipped. A malformed line aborts the script; a
/// command the service rejects is logged and the script carries on.
pub fn run_script<R: BufRead>(service: &SimulationService, reader: R) -> anyhow::Result<Vec<CommandResult>> {
    let mut results = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let command: Command = serde_json::from_str(trimmed)
            .map_err(|err| anyhow::anyhow!("line {}: invalid command: {}", index + 1, err))?;
        let result = dispatch(service, command);
        if let Err(err) = &result {
            warn!("line {}: {}", index + 1, err.error);
        }
        results.push(result);
    }

    Ok(results)
}
