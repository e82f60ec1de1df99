//! Commands the agent hands back to the session driver.
//!
//! One [`Command`] is produced per tick. The driver translates it into input
//! events (key presses, mouse turn, clicks) for the game under test.

use bitflags::bitflags;

bitflags! {
    /// Movement keys held for the tick, relative to the player's facing.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MoveKeys: u8 {
        const FORWARD = 1 << 0;
        const BACK    = 1 << 1;
        const LEFT    = 1 << 2;
        const RIGHT   = 1 << 3;
    }
}

/// A single tick's output.
///
/// Angles are absolute target headings in the configured
/// [`crate::AngleConvention`], not relative rotations.
#[derive(Clone, Copy, Debug, Default, PartialEq, strum::IntoStaticStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    /// Do nothing this tick.
    #[default]
    Noop,
    /// Hold movement keys without turning.
    Move { keys: MoveKeys },
    /// Turn to face `angle`.
    Turn { angle: f32 },
    /// Turn to face `angle`, then hold movement keys.
    TurnAndMove { angle: f32, keys: MoveKeys },
    /// Primary attack.
    Attack,
    /// Interact with whatever is in front of the player.
    Interact,
    /// Use the item in the given inventory slot.
    UseItem { slot: usize },
}

impl Command {
    /// Walk forward along `angle`.
    pub fn walk(angle: f32) -> Self {
        Command::TurnAndMove {
            angle,
            keys: MoveKeys::FORWARD,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Command::Noop)
    }

    /// Whether executing the command is expected to displace the player.
    pub fn is_movement(&self) -> bool {
        match self {
            Command::Move { keys } | Command::TurnAndMove { keys, .. } => !keys.is_empty(),
            _ => false,
        }
    }

    /// Target heading carried by the command, if any.
    pub fn heading(&self) -> Option<f32> {
        match self {
            Command::Turn { angle } | Command::TurnAndMove { angle, .. } => Some(*angle),
            _ => None,
        }
    }

    /// Stable snake_case name of the variant.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_requires_keys() {
        assert!(Command::walk(0.3).is_movement());
        assert!(
            Command::Move {
                keys: MoveKeys::LEFT
            }
            .is_movement()
        );
        assert!(
            !Command::Move {
                keys: MoveKeys::empty()
            }
            .is_movement()
        );
        assert!(!Command::Turn { angle: 1.0 }.is_movement());
        assert!(!Command::Attack.is_movement());
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(Command::walk(0.0).name(), "turn_and_move");
        assert_eq!(Command::UseItem { slot: 2 }.name(), "use_item");
        assert_eq!(Command::Noop.name(), "noop");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn command_serializes_with_type_tag() {
        let json = serde_json::to_value(Command::UseItem { slot: 3 }).unwrap();
        assert_eq!(json["type"], "use_item");
        assert_eq!(json["slot"], 3);
    }
}
