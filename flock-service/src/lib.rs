pub mod command;
pub mod driver;
pub mod service;
pub mod settings;

pub use command::{dispatch, run_script, Command, CommandResult, Reply};
pub use driver::{run, RunOptions, RunReport};
pub use service::SimulationService;
pub use settings::{load_config, Overrides};
