//! Idle/demo mode input generator
//!
//! Produces a `TickInput` from the current state: confirm through menus,
//! spend coins in the shop, then walk the lane toward the nearest live
//! enemy and fight it.

use super::economy::{UpgradeSlot, upgrade_cost};
use super::state::{Enemy, GamePhase, GameState};
use super::tick::TickInput;
use crate::tuning::AttackProfile;

/// How far a ranged class will fire from
const CAST_RANGE: f32 = 420.0;
/// Vertical slack before the autopilot bothers to line up with a target
const LANE_SLACK: f32 = 6.0;
/// Enemies closer than this that are telegraphing trigger the special
const THREAT_RANGE: f32 = 90.0;

/// Generate this frame's input for `state`
pub fn drive(state: &GameState) -> TickInput {
    let mut input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    match state.phase {
        GamePhase::Menu | GamePhase::Victory | GamePhase::GameOver => input.confirm = true,
        GamePhase::Shop => shop(state, &mut input),
        GamePhase::Playing => {
            if cheapest_affordable(state).is_some() && !under_threat(state) {
                input.shop = true;
            } else {
                fight(state, &mut input);
            }
        }
    }
    input
}

fn affordable(state: &GameState, slot: UpgradeSlot) -> bool {
    let level = state.player.upgrades.level(slot);
    upgrade_cost(&state.tuning.economy, slot, level) <= state.player.coins
}

fn cheapest_affordable(state: &GameState) -> Option<UpgradeSlot> {
    UpgradeSlot::ALL
        .into_iter()
        .filter(|slot| affordable(state, *slot))
        .min_by_key(|slot| {
            upgrade_cost(&state.tuning.economy, *slot, state.player.upgrades.level(*slot))
        })
}

fn shop(state: &GameState, input: &mut TickInput) {
    match cheapest_affordable(state) {
        Some(slot) if slot == state.shop_selection => input.confirm = true,
        Some(_) => input.select_next = true,
        None => input.back = true,
    }
}

fn nearest_enemy(state: &GameState) -> Option<&Enemy> {
    let pos = state.player.pos;
    state
        .enemies
        .iter()
        .filter(|e| e.alive)
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn under_threat(state: &GameState) -> bool {
    let pos = state.player.pos;
    state
        .enemies
        .iter()
        .any(|e| e.alive && e.is_winding_up() && e.pos.distance(pos) < THREAT_RANGE)
}

fn fight(state: &GameState, input: &mut TickInput) {
    let player = &state.player;

    let Some(target) = nearest_enemy(state) else {
        // Nothing to fight: push on along the lane centre
        input.right = true;
        let dy = state.tuning.arena.lane_center() - player.pos.y;
        input.down = dy > LANE_SLACK;
        input.up = dy < -LANE_SLACK;
        return;
    };

    let profile = state.tuning.class(player.class);
    let reach = match &profile.attack {
        AttackProfile::Melee { tiers } => tiers[0].reach + target.size.x * 0.5,
        AttackProfile::Ranged { .. } => CAST_RANGE,
    };

    let dx = target.pos.x - player.pos.x;
    let dy = target.pos.y - player.pos.y;
    let facing_target = (dx >= 0.0) == player.facing_right;

    // Close the distance, or turn around when the target is behind
    if dx.abs() > reach * 0.6 || !facing_target {
        input.right = dx > 0.0;
        input.left = dx < 0.0;
    }
    input.down = dy > LANE_SLACK;
    input.up = dy < -LANE_SLACK;

    input.attack = facing_target && dx.abs() <= reach && dy.abs() < player.size.y * 0.5;
    input.special = under_threat(state) && player.ability.cooldown() <= 0.0;
}
