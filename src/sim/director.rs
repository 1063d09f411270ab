//! Encounter director: timed enemy spawns and the boss trigger

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{EnemyKind, GameEvent, GameState};
use crate::clamp_to_lane;
use crate::tuning::{ArenaTuning, EncounterTuning};

/// Where and what the timed spawner places next
pub fn roll_spawn<R: RandomSource + ?Sized>(
    player_x: f32,
    encounter: &EncounterTuning,
    arena: &ArenaTuning,
    rng: &mut R,
) -> (EnemyKind, Vec2) {
    let pick = rng.range_inclusive(0, EnemyKind::REGULAR.len() as i32 - 1);
    let kind = EnemyKind::REGULAR[pick.clamp(0, 2) as usize];

    let jitter = rng.range_inclusive(encounter.lane_jitter.0, encounter.lane_jitter.1) as f32;
    let y = clamp_to_lane(arena.ground_top + jitter, arena.ground_top, arena.ground_bottom);

    let ahead = rng.range_inclusive(encounter.spawn_ahead.0, encounter.spawn_ahead.1) as f32;
    let max_x = (arena.level_length - encounter.spawn_end_margin).max(encounter.min_spawn_x);
    let x = (player_x + ahead).clamp(encounter.min_spawn_x, max_x);

    (kind, Vec2::new(x, y))
}

/// Director step of the frame pipeline
pub fn update_director(state: &mut GameState, dt: f32) {
    let encounter = &state.tuning.encounter;

    state.spawn_timer += dt;
    if state.spawn_timer > encounter.spawn_interval && !state.boss_spawned {
        state.spawn_timer = 0.0;
        let (kind, pos) = roll_spawn(
            state.player.pos.x,
            encounter,
            &state.tuning.arena,
            &mut state.rng,
        );
        state.spawn_enemy(kind, pos);
        log::debug!("Spawned {kind:?} at ({:.0}, {:.0})", pos.x, pos.y);
    }

    let arena = &state.tuning.arena;
    let trigger_x = arena.level_length - state.tuning.encounter.boss_trigger_margin;
    if !state.boss_spawned && state.player.pos.x > trigger_x {
        let pos = Vec2::new(
            arena.level_length - state.tuning.encounter.boss_margin,
            arena.lane_center(),
        );
        state.boss_spawned = true;
        state.spawn_enemy(EnemyKind::Boss, pos);
        state.events.push(GameEvent::BossSpawned);
        log::info!("Boss spawned at x = {:.0}", pos.x);
    }
}
