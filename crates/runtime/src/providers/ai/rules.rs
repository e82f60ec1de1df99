//! The agent's rules, in priority order.
//!
//! Each rule looks at the snapshot and the blackboard and either returns a
//! command or declines with `None`. Rules may update the blackboard (shrine
//! retries, the explanation, the phase) but never the snapshot.

use game_core::{AngleConvention, Command, ItemKind, WorldItem, WorldPoint, WorldSnapshot, angle_delta};

use super::boss;
use super::context::AgentState;
use super::phase::Phase;

/// Faces `target`, or attacks once facing it within `tolerance`.
pub(crate) fn strike(
    convention: AngleConvention,
    position: WorldPoint,
    facing: f32,
    target: WorldPoint,
    tolerance: f32,
) -> Command {
    let angle = convention.heading(position, target);
    if angle_delta(facing, angle).abs() > tolerance {
        Command::Turn { angle }
    } else {
        Command::Attack
    }
}

/// Whether a living hostile or an active boss is within `radius`.
pub(crate) fn threatened(snapshot: &WorldSnapshot, radius: f32) -> bool {
    let hostile_near = snapshot
        .nearest_hostile()
        .is_some_and(|(_, distance)| distance <= radius);
    let boss_near = snapshot.boss_fight_active()
        && snapshot
            .living_boss()
            .is_some_and(|boss| snapshot.distance_to(boss.position) <= radius);
    hostile_near || boss_near
}

/// Nearest item matching `filter`; ties keep the earlier entry.
fn nearest_item<'a>(
    snapshot: &'a WorldSnapshot,
    mut filter: impl FnMut(&WorldItem) -> bool,
) -> Option<(&'a WorldItem, f32)> {
    snapshot
        .items
        .iter()
        .filter(|&item| filter(item))
        .map(|item| (item, snapshot.distance_to(item.position)))
        .fold(None, |best: Option<(&WorldItem, f32)>, candidate| match best {
            Some(current) if current.1 <= candidate.1 => Some(current),
            _ => Some(candidate),
        })
}

/// Holds still while dead; the respawn arrives as a new life.
pub fn dead(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    if !snapshot.is_dead() {
        return None;
    }
    state.explain("dead, waiting for respawn");
    Some(Command::Noop)
}

/// Consumables, most urgent first.
pub fn utility_items(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let config = &state.config.decision;
    let vitals = &snapshot.vitals;
    let flags = &snapshot.flags;
    let in_combat = threatened(snapshot, config.threat_radius);

    let wanted: [(bool, ItemKind, &str); 6] = [
        (!flags.torch_active, ItemKind::Torch, "lighting torch"),
        (
            vitals.hp_ratio() < config.emergency_heal_ratio,
            ItemKind::Potion,
            "emergency heal",
        ),
        (
            vitals.max_mp > 0.0 && vitals.mp_ratio() < config.mana_restore_ratio,
            ItemKind::ManaPotion,
            "restoring mana",
        ),
        (
            in_combat && !flags.shield_buff,
            ItemKind::Shield,
            "raising shield",
        ),
        (true, ItemKind::Tonic, "drinking tonic"),
        (
            vitals.hp_ratio() < config.proactive_heal_ratio && !in_combat,
            ItemKind::Potion,
            "topping up health",
        ),
    ];

    let (slot, reason) = wanted
        .iter()
        .filter(|(wanted, _, _)| *wanted)
        .find_map(|&(_, kind, reason)| snapshot.slot_of(kind).map(|slot| (slot, reason)))?;
    state.explain(format!("{reason} (slot {slot})"));
    Some(Command::UseItem { slot })
}

/// Fights the nearest hostile in melee reach while mana allows.
pub fn melee_engagement(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let config = &state.config.decision;
    let (hostile, distance) = snapshot.nearest_hostile()?;
    if distance > config.melee_radius || snapshot.vitals.mp < config.attack_cost {
        return None;
    }

    let command = strike(
        state.config.navigation.angle_convention,
        snapshot.position(),
        snapshot.player.facing,
        hostile.position,
        config.facing_tolerance,
    );
    let rationale = format!("engaging {} at {distance:.1}", hostile.kind);
    state.explain(rationale);
    Some(command)
}

/// Uses an adjacent, unconsumed shrine, a bounded number of times per floor.
pub fn shrine_interaction(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let shrine = snapshot.shrine?;
    let config = &state.config.decision;
    if snapshot.flags.shrine_used
        || state.shrine_attempts >= config.shrine_max_attempts
        || snapshot.distance_to(shrine) > config.interact_radius
    {
        return None;
    }
    state.shrine_attempts += 1;
    let rationale = format!(
        "using shrine (attempt {}/{})",
        state.shrine_attempts, config.shrine_max_attempts
    );
    state.explain(rationale);
    Some(Command::Interact)
}

/// Detours for nearby floor items; the radius shrinks while stairs are
/// visible or the boss is active.
pub fn opportunistic_pickup(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let config = &state.config.decision;
    let pressed = snapshot.stairs.is_some() || snapshot.boss_fight_active();
    let radius = if pressed {
        config.pickup_radius_pressed
    } else {
        config.pickup_radius
    };

    let grid = &snapshot.grid;
    let nav = &state.nav;
    let (item, distance) = nearest_item(snapshot, |item| {
        !item.kind.is_key() && !nav.is_blacklisted(grid.world_to_grid(item.position))
    })?;
    if distance > radius {
        return None;
    }

    let command = state
        .nav
        .try_move_toward(grid, snapshot.position(), item.position)?;
    state.phase = Phase::PickupItem;
    state.explain(format!("picking up {} at {distance:.1}", item.kind));
    Some(command)
}

/// Continues a watchdog random walk.
pub fn random_walk_recovery(_snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let command = state.nav.random_walk_step()?;
    state.explain("random walk after idling");
    Some(command)
}

pub fn get_key(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let grid = &snapshot.grid;
    let nav = &state.nav;
    let key = nearest_item(snapshot, |item| {
        item.kind.is_key() && !nav.is_blacklisted(grid.world_to_grid(item.position))
    });
    if let Some((key, distance)) = key
        && let Some(command) = state
            .nav
            .try_move_toward(grid, snapshot.position(), key.position)
    {
        state.explain(format!("heading for key at {distance:.1}"));
        return Some(command);
    }
    explore(snapshot, state)
}

pub fn get_shrine(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let shrine = snapshot.shrine?;
    if let Some(command) = state
        .nav
        .try_move_toward(&snapshot.grid, snapshot.position(), shrine)
    {
        let distance = snapshot.distance_to(shrine);
        state.explain(format!("detouring to shrine at {distance:.1}"));
        return Some(command);
    }
    trigger_boss(snapshot, state)
}

pub fn fight_boss(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    if snapshot.boss_fight_active() {
        boss::engage(snapshot, state)
    } else {
        trigger_boss(snapshot, state)
    }
}

/// Walks up to an inactive boss and wakes it.
///
/// A boss whose cell was abandoned as unreachable is left alone until
/// exploration opens another way.
fn trigger_boss(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let boss = snapshot.living_boss()?;
    let distance = snapshot.distance_to(boss.position);
    if distance <= state.config.decision.boss_activation_range {
        state.explain("triggering boss");
        return Some(Command::Interact);
    }
    if state
        .nav
        .is_blacklisted(snapshot.grid.world_to_grid(boss.position))
    {
        return explore(snapshot, state);
    }
    let command = state
        .nav
        .move_toward(&snapshot.grid, snapshot.position(), boss.position);
    state.explain(format!("approaching boss at {distance:.1}"));
    Some(command)
}

pub fn ascend(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let stairs = snapshot.stairs?;
    let distance = snapshot.distance_to(stairs);
    if distance <= state.config.decision.interact_radius {
        state.explain("taking the stairs");
        return Some(Command::Interact);
    }
    // Abandoned by the stuck watchdog; keep looking for another way round.
    if state.nav.is_blacklisted(snapshot.grid.world_to_grid(stairs)) {
        return explore(snapshot, state);
    }
    let command = state
        .nav
        .move_toward(&snapshot.grid, snapshot.position(), stairs);
    state.explain(format!("heading for stairs at {distance:.1}"));
    Some(command)
}

pub fn explore(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let step = state
        .exploration
        .explore(&mut state.nav, &snapshot.grid, snapshot.position());
    match step.target {
        Some(cell) => state.explain(format!("exploring ({}) towards {cell}", step.mode)),
        None => state.explain(format!("exploring ({})", step.mode)),
    }
    Some(step.command)
}

#[cfg(test)]
mod tests {
    use game_core::{AgentConfig, BossState, GridMap, Hostile, MoveKeys};

    use super::*;

    fn room() -> GridMap {
        GridMap::from_ascii(
            &[
                "##########",
                "#........#",
                "#........#",
                "#........#",
                "#........#",
                "##########",
            ],
            2.0,
        )
        .unwrap()
    }

    fn state() -> AgentState {
        AgentState::new(AgentConfig::default())
    }

    #[test]
    fn emergency_heal_uses_potion_slot() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(5.0, 5.0));
        snapshot.vitals.hp = 20.0;
        snapshot.inventory = vec![ItemKind::Shield, ItemKind::Potion];
        snapshot.flags.torch_active = true;

        let command = utility_items(&snapshot, &mut state());
        assert_eq!(command, Some(Command::UseItem { slot: 1 }));
    }

    #[test]
    fn proactive_heal_waits_until_out_of_combat() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(5.0, 5.0));
        snapshot.vitals.hp = 50.0;
        snapshot.inventory = vec![ItemKind::Potion];
        snapshot.flags.torch_active = true;
        snapshot.hostiles.push(Hostile {
            position: WorldPoint::new(8.0, 5.0),
            hp: 10.0,
            max_hp: 10.0,
            kind: "rat".into(),
        });
        assert_eq!(utility_items(&snapshot, &mut state()), None);

        snapshot.hostiles.clear();
        assert_eq!(
            utility_items(&snapshot, &mut state()),
            Some(Command::UseItem { slot: 0 })
        );
    }

    #[test]
    fn melee_turns_before_attacking() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(5.0, 5.0));
        snapshot.hostiles.push(Hostile {
            position: WorldPoint::new(7.0, 5.0),
            hp: 10.0,
            max_hp: 10.0,
            kind: "rat".into(),
        });
        let mut state = state();

        // Facing +z while the rat is due +x.
        let turn = melee_engagement(&snapshot, &mut state).unwrap();
        let Command::Turn { angle } = turn else {
            panic!("expected a turn, got {turn:?}");
        };
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);

        snapshot.player.facing = angle;
        assert_eq!(melee_engagement(&snapshot, &mut state), Some(Command::Attack));

        snapshot.vitals.mp = 1.0;
        assert_eq!(melee_engagement(&snapshot, &mut state), None);
    }

    #[test]
    fn shrine_retries_are_bounded() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(5.0, 5.0));
        snapshot.shrine = Some(WorldPoint::new(6.0, 5.0));
        let mut state = state();

        for _ in 0..3 {
            assert_eq!(shrine_interaction(&snapshot, &mut state), Some(Command::Interact));
        }
        assert_eq!(shrine_interaction(&snapshot, &mut state), None);
        assert_eq!(state.shrine_attempts, 3);
    }

    #[test]
    fn pickup_radius_shrinks_when_stairs_are_visible() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        snapshot.items.push(WorldItem {
            position: WorldPoint::new(9.0, 3.0),
            kind: ItemKind::Potion,
        });
        let mut state = state();
        assert!(opportunistic_pickup(&snapshot, &mut state).is_some());
        assert_eq!(state.phase, Phase::PickupItem);

        snapshot.stairs = Some(WorldPoint::new(15.0, 7.0));
        let mut state = self::state();
        assert_eq!(opportunistic_pickup(&snapshot, &mut state), None);
    }

    #[test]
    fn keys_are_not_opportunistic_pickups() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        snapshot.items.push(WorldItem {
            position: WorldPoint::new(5.0, 3.0),
            kind: ItemKind::BossKey,
        });
        assert_eq!(opportunistic_pickup(&snapshot, &mut state()), None);
    }

    #[test]
    fn inactive_boss_is_triggered_in_range() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(5.0, 5.0));
        snapshot.flags.has_boss_key = true;
        snapshot.boss = Some(BossState {
            position: WorldPoint::new(13.0, 5.0),
            hp: 100.0,
            max_hp: 100.0,
            ..BossState::default()
        });
        let mut state = state();
        let approach = fight_boss(&snapshot, &mut state).unwrap();
        assert!(approach.is_movement());

        snapshot.player.position = WorldPoint::new(11.0, 5.0);
        assert_eq!(fight_boss(&snapshot, &mut state), Some(Command::Interact));
    }

    #[test]
    fn stairs_are_taken_when_adjacent() {
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(5.0, 5.0));
        snapshot.stairs = Some(WorldPoint::new(6.5, 5.0));
        assert_eq!(ascend(&snapshot, &mut state()), Some(Command::Interact));

        snapshot.stairs = Some(WorldPoint::new(15.0, 5.0));
        let command = ascend(&snapshot, &mut state()).unwrap();
        assert_eq!(
            command,
            Command::TurnAndMove {
                angle: command.heading().unwrap(),
                keys: MoveKeys::FORWARD
            }
        );
    }

    #[test]
    fn abandoned_stairs_fall_back_to_exploring() {
        let grid = room();
        let mut snapshot = WorldSnapshot::new(grid.clone(), WorldPoint::new(5.0, 5.0));
        snapshot.stairs = Some(WorldPoint::new(15.0, 5.0));
        let mut state = state();
        state.nav.observe(&grid, snapshot.position(), false);
        state.nav.blacklist(grid.world_to_grid(WorldPoint::new(15.0, 5.0)));

        let command = ascend(&snapshot, &mut state).unwrap();
        assert!(command.is_movement());
        assert!(state.rationale.starts_with("exploring"));
        assert!(state.nav.exploration_target().is_some());
    }

    #[test]
    fn abandoned_boss_falls_back_to_exploring() {
        let grid = room();
        let mut snapshot = WorldSnapshot::new(grid.clone(), WorldPoint::new(5.0, 5.0));
        snapshot.boss = Some(BossState {
            position: WorldPoint::new(15.0, 5.0),
            hp: 100.0,
            max_hp: 100.0,
            ..BossState::default()
        });
        let mut state = state();
        state.nav.observe(&grid, snapshot.position(), false);
        state.nav.blacklist(grid.world_to_grid(WorldPoint::new(15.0, 5.0)));

        fight_boss(&snapshot, &mut state).unwrap();
        assert!(state.rationale.starts_with("exploring"));
    }
}
