//! Owner of the live simulation.
//!
//! One reader/writer lock guards both the simulation and the random source.
//! Reads take the shared lock; every mutation, including a whole multi-tick
//! `step`, runs under the exclusive lock.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use flock_core::{
    Agent, Obstacle, Point, Result, Simulation, SimulationConfig, SimulationError, SimulationState,
    TickOutcome,
};
use flock_shared::SimulationSummary;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng_for(config: &SimulationConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn log_rejection<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(err @ SimulationError::InvalidParameter { .. }) = &result {
        warn!("{} rejected: {}", operation, err);
    }
    result
}

struct Inner {
    simulation: Option<Simulation>,
    rng: StdRng,
}

impl Inner {
    fn active(&self) -> Result<&Simulation> {
        self.simulation.as_ref().ok_or(SimulationError::NoActiveSimulation)
    }

    /// Splits the borrow so the simulation and the rng can be used together.
    fn active_mut(&mut self) -> Result<(&mut Simulation, &mut StdRng)> {
        match self.simulation.as_mut() {
            Some(simulation) => Ok((simulation, &mut self.rng)),
            None => Err(SimulationError::NoActiveSimulation),
        }
    }
}

pub struct SimulationService {
    defaults: SimulationConfig,
    inner: RwLock<Inner>,
}

impl SimulationService {
    /// A service with no live simulation. `defaults` is what `reset` and a
    /// config-less `create_simulation` use.
    pub fn new(defaults: SimulationConfig) -> Result<Self> {
        defaults.validate()?;
        let rng = rng_for(&defaults);
        Ok(Self {
            defaults,
            inner: RwLock::new(Inner {
                simulation: None,
                rng,
            }),
        })
    }

    /// A service already holding the default population.
    pub fn with_default_simulation(defaults: SimulationConfig) -> Result<Self> {
        let service = Self::new(defaults)?;
        service.reset()?;
        Ok(service)
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn defaults(&self) -> &SimulationConfig {
        &self.defaults
    }

    pub fn is_active(&self) -> bool {
        self.read().simulation.is_some()
    }

    pub fn get_state(&self) -> Result<SimulationState> {
        Ok(self.read().active()?.state().clone())
    }

    pub fn summary(&self) -> Result<SimulationSummary> {
        Ok(SimulationSummary::from(self.read().active()?.state()))
    }

    pub fn config(&self) -> Result<SimulationConfig> {
        Ok(self.read().active()?.config().clone())
    }

    /// Replaces the live simulation. The new one is fully built and
    /// validated before the old one is dropped.
    pub fn create_simulation(
        &self,
        agents: Vec<Agent>,
        obstacles: Vec<Obstacle>,
        config: Option<SimulationConfig>,
    ) -> Result<SimulationState> {
        let config = config.unwrap_or_else(|| self.defaults.clone());
        let reseed = config.seed.is_some().then(|| rng_for(&config));
        let simulation = log_rejection("create", Simulation::create(agents, obstacles, config))?;
        let state = simulation.state().clone();

        let mut inner = self.write();
        if let Some(rng) = reseed {
            inner.rng = rng;
        }
        inner.simulation = Some(simulation);

        info!(
            "created simulation: {} agent(s), {} obstacle(s)",
            state.agents.len(),
            state.obstacles.len()
        );
        Ok(state)
    }

    /// Discards the live simulation and starts over with the default
    /// population and configuration.
    pub fn reset(&self) -> Result<SimulationState> {
        let mut inner = self.write();
        if self.defaults.seed.is_some() {
            inner.rng = rng_for(&self.defaults);
        }
        let simulation = Simulation::with_default_population(self.defaults.clone(), &mut inner.rng)?;
        let state = simulation.state().clone();
        inner.simulation = Some(simulation);

        info!("simulation reset with {} agent(s)", state.agents.len());
        Ok(state)
    }

    /// Advances `count` ticks back to back (at least one) and returns the
    /// final state only.
    pub fn step(&self, count: i64) -> Result<SimulationState> {
        let mut inner = self.write();
        let (simulation, rng) = inner.active_mut()?;

        let outcomes = simulation.step_many(count, rng);
        let eliminated: usize = outcomes
            .iter()
            .map(|outcome| match outcome {
                TickOutcome::Advanced { eliminated, .. } => eliminated.len(),
                TickOutcome::Skipped => 0,
            })
            .sum();

        let state = simulation.state().clone();
        if eliminated > 0 {
            warn!(
                "step {}: {} agent(s) eliminated, {} remaining",
                state.step,
                eliminated,
                state.agents.len()
            );
        } else {
            debug!("step {}: {} agent(s)", state.step, state.agents.len());
        }
        Ok(state)
    }

    pub fn add_agent(&self, position: Point) -> Result<SimulationState> {
        let mut inner = self.write();
        let (simulation, rng) = inner.active_mut()?;
        log_rejection("add agent", simulation.add_agent(position, rng).map(|_| ()))?;
        Ok(simulation.state().clone())
    }

    pub fn add_obstacle(&self, position: Point, radius: f64) -> Result<SimulationState> {
        let mut inner = self.write();
        let (simulation, rng) = inner.active_mut()?;
        log_rejection(
            "add obstacle",
            simulation.add_obstacle(position, radius, rng).map(|_| ()),
        )?;
        Ok(simulation.state().clone())
    }

    pub fn set_attractor(&self, position: Point, active: bool) -> Result<SimulationState> {
        let mut inner = self.write();
        let (simulation, _) = inner.active_mut()?;
        log_rejection("set attractor", simulation.set_attractor(position, active))?;
        Ok(simulation.state().clone())
    }

    pub fn toggle_running(&self) -> Result<SimulationState> {
        let mut inner = self.write();
        let (simulation, _) = inner.active_mut()?;
        let running = simulation.toggle_running();
        info!("simulation {}", if running { "resumed" } else { "paused" });
        Ok(simulation.state().clone())
    }
}
