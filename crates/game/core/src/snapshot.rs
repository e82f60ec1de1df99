//! Per-tick observation of the game under test.
//!
//! A [`WorldSnapshot`] is everything the agent is allowed to know on one
//! tick. It is produced by the session driver, read by the agent, and never
//! mutated. Optional world entities (boss, stairs, shrine) are modelled as
//! `Option`s so "absent" has exactly one meaning.

use crate::error::SnapshotError;
use crate::geometry::{CellPos, WorldPoint};
use crate::grid::GridMap;

/// Kinds of items the player can hold or find on the floor.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ItemKind {
    /// Restores health.
    Potion,
    /// Restores mana.
    ManaPotion,
    /// Light source; lights the surroundings while active.
    Torch,
    /// Temporary defensive buff.
    Shield,
    /// Permanent stat increase.
    Tonic,
    /// Opens the boss encounter.
    BossKey,
    /// Anything the agent does not know how to use.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl ItemKind {
    pub fn is_key(self) -> bool {
        matches!(self, ItemKind::BossKey)
    }
}

/// Player pose.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub position: WorldPoint,
    /// Facing angle in the configured [`crate::AngleConvention`].
    pub facing: f32,
}

/// Player vitals.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitals {
    pub hp: f32,
    pub max_hp: f32,
    pub mp: f32,
    pub max_mp: f32,
    pub atk: f32,
}

impl Vitals {
    /// Current HP as a fraction of max HP.
    ///
    /// Reads as full health when max HP is unknown; validated snapshots
    /// always carry a positive max.
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            1.0
        }
    }

    /// Current MP as a fraction of max MP (1.0 when the player has no mana pool).
    pub fn mp_ratio(&self) -> f32 {
        if self.max_mp > 0.0 {
            self.mp / self.max_mp
        } else {
            1.0
        }
    }
}

/// Boolean progress and buff flags reported by the game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusFlags {
    pub has_boss_key: bool,
    pub boss_active: bool,
    pub shrine_used: bool,
    pub shield_buff: bool,
    pub torch_active: bool,
    pub combo_count: u32,
}

/// A visible hostile (excluding the boss).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hostile {
    pub position: WorldPoint,
    pub hp: f32,
    pub max_hp: f32,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
}

/// The floor boss, when visible.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BossState {
    pub position: WorldPoint,
    pub hp: f32,
    pub max_hp: f32,
    pub active: bool,
    /// Winding up a high-damage attack.
    pub telegraphing: bool,
    /// Wind-up progress in `[0, 1]`.
    pub telegraph_progress: f32,
    pub stunned: bool,
    pub enraged: bool,
    pub facing: f32,
}

impl BossState {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// An item lying on the floor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldItem {
    pub position: WorldPoint,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ItemKind,
}

/// A visible door.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Door {
    pub position: WorldPoint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub open: bool,
}

/// One tick's complete read of observable world state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldSnapshot {
    /// Monotonic game time in milliseconds.
    pub timestamp_ms: u64,
    /// Floor index; a change means the previous floor's topology is gone.
    pub floor: u32,
    /// Number of deaths so far; a change means the agent respawned.
    #[cfg_attr(feature = "serde", serde(default))]
    pub deaths: u32,
    pub player: PlayerState,
    pub vitals: Vitals,
    /// Held items; the index is the inventory slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub inventory: Vec<ItemKind>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: StatusFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hostiles: Vec<Hostile>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub boss: Option<BossState>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<WorldItem>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub doors: Vec<Door>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stairs: Option<WorldPoint>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shrine: Option<WorldPoint>,
    pub grid: GridMap,
}

impl WorldSnapshot {
    /// Creates a snapshot with the player standing at `position` on `grid`
    /// and every optional field empty.
    pub fn new(grid: GridMap, position: WorldPoint) -> Self {
        Self {
            timestamp_ms: 0,
            floor: 0,
            deaths: 0,
            player: PlayerState {
                position,
                facing: 0.0,
            },
            vitals: Vitals {
                hp: 100.0,
                max_hp: 100.0,
                mp: 50.0,
                max_mp: 50.0,
                atk: 10.0,
            },
            inventory: Vec::new(),
            flags: StatusFlags::default(),
            hostiles: Vec::new(),
            boss: None,
            items: Vec::new(),
            doors: Vec::new(),
            stairs: None,
            shrine: None,
            grid,
        }
    }

    pub fn position(&self) -> WorldPoint {
        self.player.position
    }

    pub fn player_cell(&self) -> CellPos {
        self.grid.world_to_grid(self.player.position)
    }

    pub fn distance_to(&self, point: WorldPoint) -> f32 {
        self.player.position.distance(point)
    }

    /// First inventory slot holding `kind`.
    pub fn slot_of(&self, kind: ItemKind) -> Option<usize> {
        self.inventory.iter().position(|&held| held == kind)
    }

    /// Boss that is alive, if one is visible.
    pub fn living_boss(&self) -> Option<&BossState> {
        self.boss.as_ref().filter(|boss| boss.is_alive())
    }

    /// Whether the boss fight is under way.
    pub fn boss_fight_active(&self) -> bool {
        self.living_boss()
            .is_some_and(|boss| boss.active || self.flags.boss_active)
    }

    /// Nearest living hostile and its distance. Ties keep the earlier entry.
    pub fn nearest_hostile(&self) -> Option<(&Hostile, f32)> {
        self.hostiles
            .iter()
            .filter(|hostile| hostile.hp > 0.0)
            .map(|hostile| (hostile, self.distance_to(hostile.position)))
            .fold(None, |best: Option<(&Hostile, f32)>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
    }

    pub fn is_dead(&self) -> bool {
        self.vitals.hp <= 0.0
    }

    /// Checks the invariants the agent relies on.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !self.player.position.is_finite() || !self.player.facing.is_finite() {
            return Err(SnapshotError::NonFinite("player"));
        }
        let v = &self.vitals;
        if ![v.hp, v.max_hp, v.mp, v.max_mp, v.atk]
            .iter()
            .all(|value| value.is_finite())
        {
            return Err(SnapshotError::NonFinite("vitals"));
        }
        if v.max_hp <= 0.0 {
            return Err(SnapshotError::InvalidMaxHp(v.max_hp));
        }
        if let Some(boss) = &self.boss
            && (!boss.position.is_finite() || !boss.facing.is_finite())
        {
            return Err(SnapshotError::NonFinite("boss"));
        }
        if self.hostiles.iter().any(|h| !h.position.is_finite()) {
            return Err(SnapshotError::NonFinite("hostiles"));
        }
        if self.items.iter().any(|item| !item.position.is_finite()) {
            return Err(SnapshotError::NonFinite("items"));
        }
        Ok(())
    }
}
