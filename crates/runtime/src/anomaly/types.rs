use serde::{Deserialize, Serialize};

/// Invariant a finding is about.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnomalyKind {
    /// Player stands in a cell that is not walkable.
    BoundsViolation,
    /// Current HP above maximum HP.
    HpOverflow,
    /// Current MP above maximum MP plus the regen tolerance.
    MpOverflow,
    /// More than one floor item vanished between two ticks.
    BulkItemDisappearance,
    /// Player position barely varied over the stall window.
    Stall,
}

impl AnomalyKind {
    pub fn severity(self) -> Severity {
        match self {
            AnomalyKind::BoundsViolation => Severity::High,
            AnomalyKind::HpOverflow | AnomalyKind::MpOverflow => Severity::Medium,
            AnomalyKind::BulkItemDisappearance => Severity::Medium,
            AnomalyKind::Stall => Severity::Low,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One reported finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub description: String,
    pub timestamp_ms: u64,
    pub floor: u32,
}
