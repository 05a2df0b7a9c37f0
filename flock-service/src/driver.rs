//! Headless tick loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use flock_shared::SimulationSummary;
use log::{info, warn};
use tokio::time::MissedTickBehavior;

use crate::service::SimulationService;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    pub steps: u64,
    /// Pause between ticks; `None` runs them back to back.
    pub interval: Option<Duration>,
    /// Log a summary every this many ticks; 0 disables it.
    pub log_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            steps: 100,
            interval: None,
            log_every: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub ticks_run: u64,
    pub interrupted: bool,
    pub summary: SimulationSummary,
}

/// Advances the service one tick at a time until `options.steps` ticks have
/// run, the simulation is paused, or Ctrl-C arrives.
pub async fn run(service: Arc<SimulationService>, options: RunOptions) -> Result<RunReport> {
    let mut ticker = options.interval.map(|period| {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticks_run = 0;
    let mut interrupted = false;

    while ticks_run < options.steps {
        let wait = async {
            match ticker.as_mut() {
                Some(ticker) => {
                    ticker.tick().await;
                }
                None => tokio::task::yield_now().await,
            }
        };

        tokio::select! {
            _ = wait => {}
            _ = &mut shutdown => {
                warn!("interrupted after {} tick(s)", ticks_run);
                interrupted = true;
                break;
            }
        }

        let state = service.step(1).context("Failed to advance simulation")?;
        if !state.running {
            info!("simulation is paused; stopping the run");
            break;
        }
        ticks_run += 1;

        if options.log_every > 0 && ticks_run % options.log_every == 0 {
            let summary = SimulationSummary::from(&state);
            info!(
                "step {}: {} agent(s), {} obstacle(s), attractor {}",
                summary.step,
                summary.agent_count,
                summary.obstacle_count,
                if summary.attractor_active { "on" } else { "off" }
            );
        }
    }

    let summary = service.summary().context("Failed to read final state")?;
    Ok(RunReport {
        ticks_run,
        interrupted,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::SimulationConfig;

    fn service() -> Arc<SimulationService> {
        let config = SimulationConfig {
            initial_agents: 8,
            ..SimulationConfig::default().with_seed(5)
        };
        Arc::new(SimulationService::with_default_simulation(config).unwrap())
    }

    #[tokio::test]
    async fn test_runs_requested_ticks() {
        let service = service();
        let report = run(
            service.clone(),
            RunOptions {
                steps: 25,
                interval: None,
                log_every: 5,
            },
        )
        .await
        .unwrap();

        assert_eq!(report.ticks_run, 25);
        assert!(!report.interrupted);
        assert_eq!(report.summary.step, 25);
        assert_eq!(service.get_state().unwrap().step, 25);
    }

    #[tokio::test]
    async fn test_paced_run() {
        let report = run(
            service(),
            RunOptions {
                steps: 3,
                interval: Some(Duration::from_millis(1)),
                log_every: 0,
            },
        )
        .await
        .unwrap();

        assert_eq!(report.ticks_run, 3);
        assert_eq!(report.summary.step, 3);
    }

    #[tokio::test]
    async fn test_paused_simulation_stops_run() {
        let service = service();
        service.toggle_running().unwrap();

        let report = run(service, RunOptions::default()).await.unwrap();
        assert_eq!(report.ticks_run, 0);
        assert_eq!(report.summary.step, 0);
        assert!(!report.summary.running);
    }

    #[tokio::test]
    async fn test_run_without_simulation_fails() {
        let service = Arc::new(SimulationService::new(SimulationConfig::default()).unwrap());
        assert!(run(service, RunOptions::default()).await.is_err());
    }
}
