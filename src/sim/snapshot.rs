//! Read-only per-frame view for the renderer and HUD

use glam::Vec2;
use serde::Serialize;

use super::economy::{UpgradeLevels, UpgradeSlot};
use super::geometry::Rect;
use super::state::{EnemyKind, GamePhase, GameState, PlayerClass};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub class: PlayerClass,
    pub pos: Vec2,
    pub size: Vec2,
    pub facing_right: bool,
    pub anim_row: u32,
    pub anim_frame: u32,
    pub attacking: bool,
    pub blocking: bool,
    pub dodging: bool,
    pub invincible: bool,
    /// Live melee hitbox, for debug overlays
    pub hitbox: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp_ratio: f32,
    pub anim_row: u32,
    pub anim_frame: u32,
    /// Telegraph tint
    pub winding_up: bool,
    pub striking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub radius: f32,
}

/// Scalar state shown on the HUD and end screens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub hp: i32,
    pub max_hp: i32,
    pub hp_ratio: f32,
    pub coins: u32,
    pub combo_step: u8,
    pub upgrades: UpgradeLevels,
    pub shop_selection: UpgradeSlot,
    pub shop_prices: [u32; 3],
    pub boss_alive: bool,
    pub boss_defeated: bool,
    pub game_over: bool,
    pub victory: bool,
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub frame: u64,
    pub selected_class: PlayerClass,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub coins: Vec<Vec2>,
    pub hud: Hud,
}

impl GameState {
    pub fn hud(&self) -> Hud {
        let player = &self.player;
        Hud {
            hp: player.hp,
            max_hp: player.max_hp,
            hp_ratio: player.hp_ratio(),
            coins: player.coins,
            combo_step: player.combo_step,
            upgrades: player.upgrades,
            shop_selection: self.shop_selection,
            shop_prices: self.shop_prices(),
            boss_alive: self.boss_alive(),
            boss_defeated: self.boss_defeated,
            game_over: self.phase == GamePhase::GameOver,
            victory: self.phase == GamePhase::Victory,
        }
    }

    /// Snapshot of live entities and HUD state. Dead enemies, spent
    /// projectiles and collected coins are left out.
    pub fn snapshot(&self) -> FrameSnapshot {
        let p = &self.player;
        let player = PlayerView {
            class: p.class,
            pos: p.pos,
            size: p.size,
            facing_right: p.facing_right,
            anim_row: p.anim.row.player_row(),
            anim_frame: p.anim.frame,
            attacking: p.attack.active,
            blocking: p.is_blocking(),
            dodging: p.is_dodging(),
            invincible: p.invincible,
            hitbox: p.hitbox,
        };

        let enemies = self
            .enemies
            .iter()
            .filter(|e| e.alive)
            .map(|e| EnemyView {
                id: e.id,
                kind: e.kind,
                pos: e.pos,
                size: e.size,
                hp_ratio: e.hp as f32 / e.max_hp.max(1) as f32,
                anim_row: e.anim.row.enemy_row(),
                anim_frame: e.anim.frame,
                winding_up: e.is_winding_up(),
                striking: e.is_striking(),
            })
            .collect();

        let projectiles = self
            .projectiles
            .iter()
            .filter(|pr| pr.active)
            .map(|pr| ProjectileView {
                pos: pr.pos,
                radius: pr.radius,
            })
            .collect();

        let coins = self.coins.iter().filter(|c| !c.collected).map(|c| c.pos).collect();

        FrameSnapshot {
            phase: self.phase,
            frame: self.frames,
            selected_class: self.selected_class,
            player,
            enemies,
            projectiles,
            coins,
            hud: self.hud(),
        }
    }
}
