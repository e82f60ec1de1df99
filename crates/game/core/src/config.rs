//! Agent tunables.
//!
//! Every empirical constant the agent uses lives here so a run can be
//! re-tuned without code changes. Defaults reproduce the reference values.
//! All sections deserialize with per-field defaults, so a configuration file
//! only needs to name the values it overrides.

use crate::geometry::AngleConvention;

/// Top-level agent configuration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AgentConfig {
    pub pathfinding: PathfindingConfig,
    pub navigation: NavigationConfig,
    pub decision: DecisionConfig,
    pub boss: BossCombatConfig,
    pub anomaly: AnomalyConfig,
    /// Seed for the random-walk and random-sample fallbacks.
    pub seed: u64,
}

impl AgentConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// A* search parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PathfindingConfig {
    /// Extra cost per wall in the destination cell's 8-neighbourhood.
    pub wall_penalty: f32,
    /// Largest ring searched for a walkable substitute goal.
    pub substitute_radius: u32,
}

impl PathfindingConfig {
    pub const DEFAULT_WALL_PENALTY: f32 = 0.3;
    pub const DEFAULT_SUBSTITUTE_RADIUS: u32 = 5;
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            wall_penalty: Self::DEFAULT_WALL_PENALTY,
            substitute_radius: Self::DEFAULT_SUBSTITUTE_RADIUS,
        }
    }
}

/// Path following, recovery watchdogs and exploration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NavigationConfig {
    pub angle_convention: AngleConvention,
    /// Waypoints closer than this are considered passed.
    pub waypoint_reach: f32,
    /// Replan once the live target is this far from the cached one.
    pub target_drift: f32,
    /// Per-tick displacement below which the agent counts as not moving.
    pub stuck_displacement: f32,
    /// Consecutive motionless ticks before the target is abandoned.
    pub stuck_ticks: u32,
    /// Consecutive non-actionable ticks before the random walk kicks in.
    pub noop_ticks: u32,
    /// Length of one random-walk episode.
    pub random_walk_ticks: u32,
    /// Committed exploration targets closer than this count as reached.
    pub target_reached: f32,
    /// Frontier cells tried per re-commit, nearest first.
    pub frontier_candidates: usize,
    /// Random cells tried when no frontier cell routes.
    pub random_samples: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            angle_convention: AngleConvention::default(),
            waypoint_reach: 1.5,
            target_drift: 2.0,
            stuck_displacement: 0.05,
            stuck_ticks: 20,
            noop_ticks: 40,
            random_walk_ticks: 8,
            target_reached: 2.0,
            frontier_candidates: 10,
            random_samples: 20,
        }
    }
}

/// Thresholds and radii used by the rule list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DecisionConfig {
    /// HP fraction below which a potion is used regardless of context.
    pub emergency_heal_ratio: f32,
    /// HP fraction below which a potion is used outside combat.
    pub proactive_heal_ratio: f32,
    /// MP fraction below which a mana potion is used.
    pub mana_restore_ratio: f32,
    /// Hostiles within this radius count as a threat (shield, "in combat").
    pub threat_radius: f32,
    /// Hostiles within this radius are engaged in melee.
    pub melee_radius: f32,
    /// Largest facing error (radians) at which an attack is still thrown.
    pub facing_tolerance: f32,
    /// MP spent per attack.
    pub attack_cost: f32,
    /// Reach for shrine, stairs and boss-trigger interaction.
    pub interact_radius: f32,
    /// Interaction attempts on one shrine before giving up on it.
    pub shrine_max_attempts: u32,
    /// Only detour to a shrine closer than this.
    pub shrine_detour_distance: f32,
    /// Detour radius for floor items with nothing more pressing.
    pub pickup_radius: f32,
    /// Detour radius while stairs are visible or the boss is active.
    pub pickup_radius_pressed: f32,
    /// Distance at which an inactive boss is triggered.
    pub boss_activation_range: f32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            emergency_heal_ratio: 0.30,
            proactive_heal_ratio: 0.60,
            mana_restore_ratio: 0.25,
            threat_radius: 6.0,
            melee_radius: 2.5,
            facing_tolerance: 0.35,
            attack_cost: 5.0,
            interact_radius: 2.0,
            shrine_max_attempts: 3,
            shrine_detour_distance: 15.0,
            pickup_radius: 8.0,
            pickup_radius_pressed: 3.0,
            boss_activation_range: 3.0,
        }
    }
}

/// Boss fight positioning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BossCombatConfig {
    /// Distance kept from a telegraphing boss.
    pub telegraph_safe_radius: f32,
    /// How far behind a stunned boss the agent positions itself.
    pub behind_offset: f32,
    /// Distance at which the behind point counts as reached.
    pub behind_reach: f32,
    /// Melee reach against the boss.
    pub attack_range: f32,
    /// Without mana, retreat when closer than this.
    pub danger_range: f32,
}

impl Default for BossCombatConfig {
    fn default() -> Self {
        Self {
            telegraph_safe_radius: 6.0,
            behind_offset: 2.0,
            behind_reach: 1.0,
            attack_range: 3.0,
            danger_range: 2.0,
        }
    }
}

/// Invariant checks over the snapshot stream.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AnomalyConfig {
    /// Slack on MP before it counts as overflowing (regen rounding).
    pub mp_overflow_tolerance: f32,
    /// Window over which positional variance is measured.
    pub stall_window_ms: u64,
    /// Variance (world units²) below which the agent counts as stalled.
    pub stall_variance: f32,
    /// Findings of one kind on one floor are reported once per bucket.
    pub dedup_bucket_ms: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            mp_overflow_tolerance: 1.0,
            stall_window_ms: 20_000,
            stall_variance: 0.01,
            dedup_bucket_ms: 10_000,
        }
    }
}
