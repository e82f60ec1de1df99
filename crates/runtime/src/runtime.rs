//! Tick loop that drives the agent against a game session.
//!
//! One decision per tick: poll a snapshot, validate it, run the anomaly
//! checks, decide, execute, then wait a fixed interval. Session faults are
//! caught here, logged, and retried after a backoff; only a run of
//! consecutive faults ends the loop with an error.

use std::collections::BTreeMap;
use std::time::Duration;

use game_core::{AgentConfig, Command, WorldSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::anomaly::{Anomaly, AnomalyDetector};
use crate::api::{GameSession, Result, RuntimeError};
use crate::providers::{DecisionEngine, Phase};

/// Tick loop settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Pause between ticks.
    pub tick_interval: Duration,
    /// Pause after a faulted tick.
    pub error_backoff: Duration,
    /// Consecutive faulted ticks after which the run is aborted.
    pub max_consecutive_faults: u32,
    /// Stop after this many decided ticks.
    pub max_ticks: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            error_backoff: Duration::from_millis(500),
            max_consecutive_faults: 10,
            max_ticks: None,
        }
    }
}

/// Summary of a finished run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Ticks on which a command was decided.
    pub ticks: u64,
    /// Ticks lost to session faults or invalid snapshots.
    pub faults: u64,
    pub anomalies: Vec<Anomaly>,
    pub final_phase: Option<Phase>,
    pub final_rationale: String,
    /// Exploration coverage of the last floor, in percent.
    pub coverage_percent: f32,
    pub floors_seen: u32,
    pub deaths: u32,
    pub phase_ticks: BTreeMap<Phase, u64>,
    /// Command counts keyed by command name.
    pub commands: BTreeMap<String, u64>,
}

/// Outcome of a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    /// A command was decided and executed.
    Executed(Command),
    /// The session has no more snapshots.
    Finished,
}

/// Drives a [`DecisionEngine`] and an [`AnomalyDetector`] against a
/// [`GameSession`].
pub struct Orchestrator {
    config: RuntimeConfig,
    engine: DecisionEngine,
    detector: AnomalyDetector,
    report: RunReport,
    last_phase: Option<Phase>,
}

impl Orchestrator {
    /// Create a new orchestrator builder
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Execute a single tick.
    ///
    /// Errors are returned as-is; [`Orchestrator::run`] decides whether to
    /// retry.
    pub async fn step<S>(&mut self, session: &mut S) -> Result<Tick>
    where
        S: GameSession + ?Sized,
    {
        let Some(snapshot) = session.next_snapshot().await? else {
            return Ok(Tick::Finished);
        };
        snapshot.validate()?;

        self.report.anomalies.extend(self.detector.check(&snapshot));
        let command = self.engine.decide(&snapshot);
        self.record(&snapshot, &command);

        session.execute(&command).await?;
        Ok(Tick::Executed(command))
    }

    /// Run until the session ends, `max_ticks` is reached, or too many
    /// consecutive faults occur.
    pub async fn run<S>(mut self, session: &mut S) -> Result<RunReport>
    where
        S: GameSession + ?Sized,
    {
        info!(
            target: "runtime",
            tick_ms = self.config.tick_interval.as_millis() as u64,
            max_ticks = ?self.config.max_ticks,
            seed = self.engine.config().seed,
            "starting run"
        );

        let mut consecutive_faults = 0u32;
        loop {
            if self
                .config
                .max_ticks
                .is_some_and(|max| self.report.ticks >= max)
            {
                info!(target: "runtime", "tick limit reached");
                break;
            }

            match self.step(session).await {
                Ok(Tick::Finished) => {
                    info!(target: "runtime", "session ended");
                    break;
                }
                Ok(Tick::Executed(_)) => {
                    consecutive_faults = 0;
                    tokio::time::sleep(self.config.tick_interval).await;
                }
                Err(err) => {
                    consecutive_faults += 1;
                    self.report.faults += 1;
                    warn!(
                        target: "runtime",
                        consecutive = consecutive_faults,
                        error = %err,
                        "tick faulted, backing off"
                    );
                    if consecutive_faults >= self.config.max_consecutive_faults {
                        return Err(RuntimeError::TooManyFaults {
                            faults: consecutive_faults,
                            last: Box::new(err),
                        });
                    }
                    tokio::time::sleep(self.config.error_backoff).await;
                }
            }
        }

        Ok(self.finish())
    }

    fn record(&mut self, snapshot: &WorldSnapshot, command: &Command) {
        let phase = self.engine.phase();
        if self.last_phase != Some(phase) {
            info!(
                target: "runtime",
                floor = snapshot.floor,
                from = ?self.last_phase,
                to = %phase,
                "phase changed"
            );
            self.last_phase = Some(phase);
        }

        let report = &mut self.report;
        report.ticks += 1;
        report.floors_seen = report.floors_seen.max(snapshot.floor + 1);
        report.deaths = snapshot.deaths;
        *report.phase_ticks.entry(phase).or_default() += 1;
        *report.commands.entry(command.name().to_owned()).or_default() += 1;
    }

    /// Current report, without consuming the orchestrator.
    pub fn report(&self) -> RunReport {
        let mut report = self.report.clone();
        report.final_phase = self.last_phase;
        report.final_rationale = self.engine.rationale().to_owned();
        report.coverage_percent = self.engine.coverage_percent();
        report
    }

    fn finish(self) -> RunReport {
        let report = self.report();
        info!(
            target: "runtime",
            ticks = report.ticks,
            faults = report.faults,
            anomalies = report.anomalies.len(),
            coverage = report.coverage_percent,
            "run finished"
        );
        report
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    config: RuntimeConfig,
    agent: AgentConfig,
}

impl OrchestratorBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            agent: AgentConfig::default(),
        }
    }

    /// Override tick loop configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override agent tunables
    pub fn agent_config(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            detector: AnomalyDetector::new(self.agent.anomaly.clone()),
            engine: DecisionEngine::new(self.agent),
            config: self.config,
            report: RunReport::default(),
            last_phase: None,
        }
    }
}
