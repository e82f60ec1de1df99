use std::collections::{BTreeSet, VecDeque};

use game_core::{AnomalyConfig, WorldPoint, WorldSnapshot};
use tracing::warn;

use super::types::{Anomaly, AnomalyKind};

/// What the previous tick looked like, for between-tick comparisons.
#[derive(Clone, Copy, Debug)]
struct PreviousTick {
    floor: u32,
    deaths: u32,
    item_count: usize,
}

/// Checks each snapshot against game invariants.
///
/// Findings are deduplicated on `(kind, floor, timestamp / bucket)`, so a
/// condition that persists is reported once per bucket rather than every
/// tick.
pub struct AnomalyDetector {
    config: AnomalyConfig,
    previous: Option<PreviousTick>,
    /// Positions within the stall window, oldest first.
    positions: VecDeque<(u64, WorldPoint)>,
    reported: BTreeSet<(AnomalyKind, u32, u64)>,
    anomalies: Vec<Anomaly>,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            previous: None,
            positions: VecDeque::new(),
            reported: BTreeSet::new(),
            anomalies: Vec::new(),
        }
    }

    /// Runs every check against `snapshot` and returns the findings that were
    /// not already reported in their bucket.
    pub fn check(&mut self, snapshot: &WorldSnapshot) -> Vec<Anomaly> {
        let mut findings = Vec::new();

        let cell = snapshot.player_cell();
        if !snapshot.grid.is_walkable(cell) {
            findings.push((
                AnomalyKind::BoundsViolation,
                format!("player at {} resolves to non-walkable cell {cell}", snapshot.position()),
            ));
        }

        let vitals = &snapshot.vitals;
        if vitals.hp > vitals.max_hp {
            findings.push((
                AnomalyKind::HpOverflow,
                format!("hp {:.1} exceeds max {:.1}", vitals.hp, vitals.max_hp),
            ));
        }
        if vitals.mp > vitals.max_mp + self.config.mp_overflow_tolerance {
            findings.push((
                AnomalyKind::MpOverflow,
                format!("mp {:.1} exceeds max {:.1}", vitals.mp, vitals.max_mp),
            ));
        }

        let same_life = self
            .previous
            .is_some_and(|prev| prev.floor == snapshot.floor && prev.deaths == snapshot.deaths);
        if let Some(prev) = self.previous
            && same_life
            && prev.item_count > snapshot.items.len() + 1
        {
            findings.push((
                AnomalyKind::BulkItemDisappearance,
                format!(
                    "{} floor items vanished in one tick ({} -> {})",
                    prev.item_count - snapshot.items.len(),
                    prev.item_count,
                    snapshot.items.len()
                ),
            ));
        }
        self.previous = Some(PreviousTick {
            floor: snapshot.floor,
            deaths: snapshot.deaths,
            item_count: snapshot.items.len(),
        });

        if !same_life {
            self.positions.clear();
        }
        if let Some(variance) = self.track_stall(snapshot) {
            findings.push((
                AnomalyKind::Stall,
                format!(
                    "position variance {variance:.4} over {} s",
                    self.config.stall_window_ms / 1000
                ),
            ));
        }

        findings
            .into_iter()
            .filter_map(|(kind, description)| self.report(snapshot, kind, description))
            .collect()
    }

    /// Updates the stall window and returns its variance once it spans the
    /// full window below the threshold.
    fn track_stall(&mut self, snapshot: &WorldSnapshot) -> Option<f32> {
        if snapshot.boss_fight_active() || snapshot.is_dead() {
            self.positions.clear();
            return None;
        }

        let now = snapshot.timestamp_ms;
        if self.positions.back().is_some_and(|&(t, _)| t > now) {
            // Clock went backwards; start over.
            self.positions.clear();
        }
        self.positions.push_back((now, snapshot.position()));

        let cutoff = now.saturating_sub(self.config.stall_window_ms);
        while self.positions.len() > 1 && self.positions[1].0 <= cutoff {
            self.positions.pop_front();
        }
        let &(oldest, _) = self.positions.front()?;
        if now < self.config.stall_window_ms || oldest > cutoff {
            return None;
        }

        let n = self.positions.len() as f32;
        let (sum_x, sum_z) = self
            .positions
            .iter()
            .fold((0.0, 0.0), |(x, z), (_, p)| (x + p.x, z + p.z));
        let mean = WorldPoint::new(sum_x / n, sum_z / n);
        let variance = self
            .positions
            .iter()
            .map(|(_, p)| p.distance_squared(mean))
            .sum::<f32>()
            / n;

        (variance < self.config.stall_variance).then_some(variance)
    }

    fn report(&mut self, snapshot: &WorldSnapshot, kind: AnomalyKind, description: String) -> Option<Anomaly> {
        let bucket = snapshot.timestamp_ms / self.config.dedup_bucket_ms.max(1);
        if !self.reported.insert((kind, snapshot.floor, bucket)) {
            return None;
        }

        let anomaly = Anomaly {
            kind,
            severity: kind.severity(),
            description,
            timestamp_ms: snapshot.timestamp_ms,
            floor: snapshot.floor,
        };
        warn!(
            target: "runtime::anomaly",
            kind = %anomaly.kind,
            severity = %anomaly.severity,
            floor = anomaly.floor,
            timestamp_ms = anomaly.timestamp_ms,
            "{}",
            anomaly.description
        );
        self.anomalies.push(anomaly.clone());
        Some(anomaly)
    }

    /// Every finding reported so far, in order.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn into_anomalies(self) -> Vec<Anomaly> {
        self.anomalies
    }
}
