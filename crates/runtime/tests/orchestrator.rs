//! Tick loop runs against in-memory and recorded sessions.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use game_core::{AgentConfig, Command, GridMap, WorldPoint, WorldSnapshot};
use runtime::scenario::to_json_lines;
use runtime::{
    AnomalyKind, GameSession, Orchestrator, Phase, ReplaySession, Result, RuntimeConfig,
    RuntimeError, Tick,
};

fn config(max_consecutive_faults: u32, max_ticks: Option<u64>) -> RuntimeConfig {
    RuntimeConfig {
        tick_interval: Duration::ZERO,
        error_backoff: Duration::ZERO,
        max_consecutive_faults,
        max_ticks,
    }
}

fn orchestrator(config: RuntimeConfig) -> Orchestrator {
    Orchestrator::builder()
        .config(config)
        .agent_config(AgentConfig::with_seed(7))
        .build()
}

fn room() -> GridMap {
    GridMap::from_ascii(
        &["########", "#......#", "#......#", "#......#", "########"],
        2.0,
    )
    .unwrap()
}

/// A player wandering east along the middle row, one snapshot per 100 ms.
fn walk(ticks: u64) -> Vec<WorldSnapshot> {
    (0..ticks)
        .map(|tick| {
            let x = 3.0 + (tick % 10) as f32;
            let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(x, 5.0));
            snapshot.timestamp_ms = tick * 100;
            snapshot
        })
        .collect()
}

/// Fails `failures` times, then serves `inner`.
struct FlakySession {
    failures: u32,
    inner: ReplaySession,
}

#[async_trait]
impl GameSession for FlakySession {
    async fn next_snapshot(&mut self) -> Result<Option<WorldSnapshot>> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(RuntimeError::Session("bridge timed out".into()));
        }
        self.inner.next_snapshot().await
    }

    async fn execute(&mut self, command: &Command) -> Result<()> {
        self.inner.execute(command).await
    }
}

#[tokio::test]
async fn replay_file_runs_to_completion() {
    let snapshots = walk(25);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(to_json_lines(&snapshots).unwrap().as_bytes())
        .unwrap();

    let mut session = ReplaySession::load_from_file(file.path()).unwrap();
    assert_eq!(session.remaining(), 25);

    let report = orchestrator(config(3, None))
        .run(&mut session)
        .await
        .unwrap();

    assert_eq!(report.ticks, 25);
    assert_eq!(report.faults, 0);
    assert_eq!(report.floors_seen, 1);
    assert_eq!(report.phase_ticks.values().sum::<u64>(), 25);
    assert_eq!(report.commands.values().sum::<u64>(), 25);
    assert_eq!(report.final_phase, Some(Phase::GetKey));
    assert!(report.coverage_percent > 0.0);
    assert_eq!(session.executed().len(), 25);
}

#[tokio::test]
async fn max_ticks_stops_early() {
    let mut session = ReplaySession::new(walk(40));
    let report = orchestrator(config(3, Some(10)))
        .run(&mut session)
        .await
        .unwrap();
    assert_eq!(report.ticks, 10);
    assert_eq!(session.remaining(), 30);
}

#[tokio::test]
async fn transient_faults_are_retried() {
    let mut session = FlakySession {
        failures: 2,
        inner: ReplaySession::new(walk(5)),
    };
    let report = orchestrator(config(3, None))
        .run(&mut session)
        .await
        .unwrap();
    assert_eq!(report.faults, 2);
    assert_eq!(report.ticks, 5);
}

#[tokio::test]
async fn consecutive_faults_abort_the_run() {
    let mut session = FlakySession {
        failures: 10,
        inner: ReplaySession::new(walk(5)),
    };
    let err = orchestrator(config(3, None))
        .run(&mut session)
        .await
        .unwrap_err();
    match err {
        RuntimeError::TooManyFaults { faults, last } => {
            assert_eq!(faults, 3);
            assert!(matches!(*last, RuntimeError::Session(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.failures, 7);
}

#[tokio::test]
async fn invalid_snapshot_is_skipped_as_a_fault() {
    let mut snapshots = walk(4);
    snapshots[1].player.position = WorldPoint::new(f32::NAN, 5.0);
    let mut session = ReplaySession::new(snapshots);

    let report = orchestrator(config(3, None))
        .run(&mut session)
        .await
        .unwrap();
    assert_eq!(report.ticks, 3);
    assert_eq!(report.faults, 1);
    assert_eq!(session.executed().len(), 3);
}

#[tokio::test]
async fn anomalies_end_up_in_the_report() {
    let mut snapshots = walk(6);
    for snapshot in &mut snapshots {
        snapshot.vitals.hp = 150.0;
    }
    let mut session = ReplaySession::new(snapshots);

    let report = orchestrator(config(3, None))
        .run(&mut session)
        .await
        .unwrap();
    // All six ticks share one dedup bucket on one floor.
    let kinds: Vec<_> = report.anomalies.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [AnomalyKind::HpOverflow]);
}

#[tokio::test]
async fn step_reports_finish() {
    let mut session = ReplaySession::new(walk(1));
    let mut orchestrator = orchestrator(config(3, None));

    assert!(matches!(
        orchestrator.step(&mut session).await.unwrap(),
        Tick::Executed(_)
    ));
    assert_eq!(orchestrator.step(&mut session).await.unwrap(), Tick::Finished);
    assert_eq!(orchestrator.report().ticks, 1);
}

#[tokio::test]
async fn runs_are_reproducible() {
    let first = orchestrator(config(3, None))
        .run(&mut ReplaySession::new(walk(30)))
        .await
        .unwrap();
    let second = orchestrator(config(3, None))
        .run(&mut ReplaySession::new(walk(30)))
        .await
        .unwrap();
    assert_eq!(first, second);
}
