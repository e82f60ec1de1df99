//! Boss fight positioning.
//!
//! Reads only the snapshot plus the navigation path cache. The boss is in
//! one of three stances each tick:
//!
//! - telegraphing: back off to a safe radius, then hold still until the
//!   wind-up resolves
//! - stunned: circle to the point behind the boss and hit it from there
//! - neutral: trade blows while mana lasts, otherwise keep distance

use std::f32::consts::FRAC_PI_4;

use game_core::{AngleConvention, BossState, Command, GridMap, MoveKeys, WorldPoint, WorldSnapshot};

use super::context::AgentState;
use super::rules::strike;

pub fn engage(snapshot: &WorldSnapshot, state: &mut AgentState) -> Option<Command> {
    let boss = *snapshot.living_boss()?;
    let position = snapshot.position();
    let distance = position.distance(boss.position);

    let command = if boss.telegraphing {
        evade(snapshot, state, &boss, distance)
    } else if boss.stunned {
        punish(snapshot, state, &boss)
    } else {
        trade(snapshot, state, &boss, distance)
    };
    Some(command)
}

fn evade(snapshot: &WorldSnapshot, state: &mut AgentState, boss: &BossState, distance: f32) -> Command {
    let safe = state.config.boss.telegraph_safe_radius;
    if distance >= safe {
        state.explain(format!("holding at {distance:.1} while boss telegraphs"));
        return Command::Noop;
    }
    let heading = retreat_heading(
        &snapshot.grid,
        state.config.navigation.angle_convention,
        snapshot.position(),
        boss.position,
    );
    state.explain(format!("evading telegraph ({distance:.1} < {safe:.1})"));
    Command::walk(heading)
}

fn punish(snapshot: &WorldSnapshot, state: &mut AgentState, boss: &BossState) -> Command {
    let convention = state.config.navigation.angle_convention;
    let config = &state.config.boss;
    let position = snapshot.position();
    let behind = boss
        .position
        .offset(convention.forward(boss.facing), -config.behind_offset);

    if position.distance(behind) > config.behind_reach {
        state.explain("flanking stunned boss");
        return state.nav.move_toward(&snapshot.grid, position, behind);
    }
    if snapshot.vitals.mp < state.config.decision.attack_cost {
        state.explain("behind stunned boss, out of mana");
        return Command::Noop;
    }
    state.explain("striking stunned boss from behind");
    strike(
        convention,
        position,
        snapshot.player.facing,
        boss.position,
        state.config.decision.facing_tolerance,
    )
}

fn trade(snapshot: &WorldSnapshot, state: &mut AgentState, boss: &BossState, distance: f32) -> Command {
    let convention = state.config.navigation.angle_convention;
    let config = &state.config.boss;
    let position = snapshot.position();
    let affordable = snapshot.vitals.mp >= state.config.decision.attack_cost;

    if distance <= config.attack_range && affordable {
        let tolerance = state.config.decision.facing_tolerance;
        state.explain(format!("attacking boss at {distance:.1}"));
        return strike(convention, position, snapshot.player.facing, boss.position, tolerance);
    }
    if !affordable && distance < config.danger_range {
        let heading = retreat_heading(&snapshot.grid, convention, position, boss.position);
        state.explain("out of mana, backing off");
        return Command::walk(heading);
    }
    if distance > config.attack_range {
        state.explain(format!("closing on boss at {distance:.1}"));
        return state.nav.move_toward(&snapshot.grid, position, boss.position);
    }
    state.explain("out of mana, strafing");
    Command::Move {
        keys: MoveKeys::LEFT,
    }
}

/// Heading away from `threat`, bent up to 90 degrees if the cell straight
/// behind the player is blocked.
fn retreat_heading(
    grid: &GridMap,
    convention: AngleConvention,
    position: WorldPoint,
    threat: WorldPoint,
) -> f32 {
    let away = convention.heading(threat, position);
    let bends = [0.0, FRAC_PI_4, -FRAC_PI_4, 2.0 * FRAC_PI_4, -2.0 * FRAC_PI_4];
    bends
        .iter()
        .map(|bend| game_core::normalize_angle(away + bend))
        .find(|&heading| {
            let ahead = position.offset(convention.forward(heading), grid.cell_size());
            grid.is_walkable(grid.world_to_grid(ahead))
        })
        .unwrap_or(away)
}
