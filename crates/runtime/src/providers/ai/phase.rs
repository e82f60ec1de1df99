//! Primary objective of the current floor.

use game_core::WorldSnapshot;
use serde::{Deserialize, Serialize};

use super::context::AgentState;

/// What the agent is working towards.
///
/// Recomputed from the snapshot every tick. [`Phase::PickupItem`] is never
/// derived; it marks ticks spent detouring for a floor item.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub enum Phase {
    GetKey,
    GetShrine,
    FightBoss,
    Ascend,
    #[default]
    Explore,
    PickupItem,
}

impl Phase {
    pub fn determine(snapshot: &WorldSnapshot, state: &AgentState) -> Phase {
        if snapshot.boss_fight_active() {
            return Phase::FightBoss;
        }
        if !snapshot.flags.has_boss_key {
            return Phase::GetKey;
        }
        if snapshot.living_boss().is_some() {
            if shrine_detour_available(snapshot, state) {
                return Phase::GetShrine;
            }
            return Phase::FightBoss;
        }
        if snapshot.stairs.is_some() {
            return Phase::Ascend;
        }
        Phase::Explore
    }
}

/// A shrine worth visiting before triggering the boss.
fn shrine_detour_available(snapshot: &WorldSnapshot, state: &AgentState) -> bool {
    let Some(shrine) = snapshot.shrine else {
        return false;
    };
    let decision = &state.config.decision;
    !snapshot.flags.shrine_used
        && state.shrine_attempts < decision.shrine_max_attempts
        && snapshot.distance_to(shrine) <= decision.shrine_detour_distance
        && !state.nav.is_blacklisted(snapshot.grid.world_to_grid(shrine))
}
