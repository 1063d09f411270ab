//! Per-frame simulation step
//!
//! Advances the game state by one rendered frame. The hitstop countdown runs
//! on the real (clamped) delta in every phase; gameplay systems only ever see
//! the simulation delta, which is zero while hitstop holds.

use glam::Vec2;

use super::autopilot;
use super::combat::{collect_coins, resolve_melee, resolve_projectiles};
use super::director::update_director;
use super::enemy::update_enemies;
use super::player::update_player;
use super::state::{GameEvent, GamePhase, GameState};

/// Input for a single frame. Movement flags are held; everything else is
/// pressed-this-frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Attack / cast
    pub attack: bool,
    /// Class special ability
    pub special: bool,
    /// Open or close the shop
    pub shop: bool,
    /// Menu accept / shop buy / restart
    pub confirm: bool,
    /// Leave the shop
    pub back: bool,
    pub select_prev: bool,
    pub select_next: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

impl TickInput {
    /// Raw movement axes; y grows downward
    pub fn move_dir(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Advance the game state by one frame of `raw_dt` real seconds
pub fn tick(state: &mut GameState, input: &TickInput, raw_dt: f32) {
    let dt = state.ctx.advance_frame(raw_dt, state.tuning.arena.max_frame_dt);

    let input = if input.idle_mode {
        autopilot::drive(state)
    } else {
        input.clone()
    };

    match state.phase {
        GamePhase::Menu => {
            if input.select_prev {
                state.selected_class = state.selected_class.prev();
            }
            if input.select_next {
                state.selected_class = state.selected_class.next();
            }
            if input.confirm {
                state.start_run(state.selected_class);
            }
        }
        GamePhase::Shop => {
            if input.select_prev {
                state.shop_selection = state.shop_selection.prev();
            }
            if input.select_next {
                state.shop_selection = state.shop_selection.next();
            }
            if input.confirm {
                // A refused purchase is already logged and changes nothing
                let _ = state.purchase_selected();
            }
            if input.shop || input.back {
                state.phase = GamePhase::Playing;
            }
        }
        GamePhase::Victory | GamePhase::GameOver => {
            if input.confirm {
                state.start_run(state.selected_class);
            }
        }
        GamePhase::Playing => {
            if input.shop {
                state.phase = GamePhase::Shop;
                return;
            }
            step_playing(state, &input, dt);
        }
    }
}

/// The gameplay pipeline for one frame of simulation time
fn step_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    update_player(state, input, dt);

    let level_length = state.tuning.arena.level_length;
    for projectile in &mut state.projectiles {
        projectile.advance(dt, level_length);
    }

    update_enemies(state, dt);
    resolve_melee(state);
    resolve_projectiles(state);
    state.projectiles.retain(|p| p.active);

    update_director(state, dt);
    collect_coins(state);

    state.frames += 1;

    if state.phase == GamePhase::Playing && !state.player.is_alive() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::PlayerDefeated);
        log::info!(
            "Player defeated after {} frames with {} coins",
            state.frames,
            state.player.coins
        );
    }
}
