//! Player movement, special abilities and combo attacks

use glam::Vec2;

use super::geometry::Rect;
use super::state::{AbilityState, AnimRow, GameState, Player, PlayerClass, Projectile, SimContext};
use super::tick::TickInput;
use crate::audio::SoundEffect;
use crate::consts::PLAYER_ANIM_FRAMES;
use crate::tuning::{
    AbilityKind, ArenaTuning, AttackProfile, ClassProfile, PlayerTuning, tier_index,
};
use crate::{clamp_to_lane, clamp_to_level, facing_sign};

/// Result of an accepted attack press
#[derive(Debug, Clone, PartialEq)]
pub enum AttackLaunch {
    /// Melee swing; the hitbox is now live on the player
    Swing { attack_id: u32 },
    /// Ranged cast; the projectile must be added to the world
    Cast(Projectile),
}

/// Swing or cast sound for a class
pub fn attack_sound(class: PlayerClass) -> SoundEffect {
    match class {
        PlayerClass::Knight => SoundEffect::KnightSwing,
        PlayerClass::Rogue => SoundEffect::RogueSwing,
        PlayerClass::Mage => SoundEffect::MageCast,
    }
}

impl Player {
    /// Walk with normalized input, or dash if a dodge is in progress
    pub fn steer(&mut self, input_dir: Vec2, dt: f32, ability: &AbilityKind, arena: &ArenaTuning) {
        let mut dir = input_dir.normalize_or_zero();
        let mut horizontal_speed = self.speed;

        if let (
            AbilityState::Dodge {
                active: true,
                dir: dodge_dir,
                ..
            },
            AbilityKind::Dodge {
                speed_multiplier, ..
            },
        ) = (&self.ability, ability)
        {
            dir = Vec2::new(*dodge_dir, 0.0);
            horizontal_speed = self.speed * speed_multiplier;
        }

        self.pos.x += dir.x * horizontal_speed * dt;
        self.pos.y += dir.y * self.speed * dt;
        self.pos.x = clamp_to_level(self.pos.x, arena.level_length);
        self.pos.y = clamp_to_lane(self.pos.y, arena.ground_top, arena.ground_bottom);

        if !self.is_dodging() {
            if dir.x > 0.0 {
                self.facing_right = true;
            } else if dir.x < 0.0 {
                self.facing_right = false;
            }
        }
        self.moving = dir.x.abs() > 0.01 || dir.y.abs() > 0.01;
    }

    /// Count down ability cooldowns and invincibility
    pub fn tick_timers(&mut self, dt: f32) {
        match &mut self.ability {
            AbilityState::Block { cooldown, .. }
            | AbilityState::Dodge { cooldown, .. }
            | AbilityState::Blink { cooldown } => {
                *cooldown = (*cooldown - dt).max(0.0);
            }
        }

        if self.invincible_timer > 0.0 {
            self.invincible_timer -= dt;
            if self.invincible_timer <= 0.0 {
                self.invincible_timer = 0.0;
                self.invincible = false;
            }
        }
    }

    /// Handle the special-ability press and advance any active window.
    /// Returns the sound to play when the ability fires.
    pub fn update_special(
        &mut self,
        pressed: bool,
        dt: f32,
        kind: &AbilityKind,
        arena: &ArenaTuning,
    ) -> Option<SoundEffect> {
        let facing = facing_sign(self.facing_right);
        let mut fired = None;
        let mut invincible_for = None;

        match (&mut self.ability, kind) {
            (
                AbilityState::Block {
                    active,
                    timer,
                    cooldown,
                },
                AbilityKind::Block {
                    duration,
                    cooldown: base_cooldown,
                },
            ) => {
                if pressed && !*active && *cooldown <= 0.0 {
                    *active = true;
                    *timer = *duration;
                    *cooldown = *base_cooldown;
                    fired = Some(SoundEffect::Block);
                }
                if *active {
                    *timer -= dt;
                    if *timer <= 0.0 {
                        *active = false;
                    }
                }
            }
            (
                AbilityState::Dodge {
                    active,
                    timer,
                    cooldown,
                    dir,
                },
                AbilityKind::Dodge {
                    duration,
                    cooldown: base_cooldown,
                    ..
                },
            ) => {
                if pressed && !*active && *cooldown <= 0.0 {
                    *active = true;
                    *timer = *duration;
                    *cooldown = *base_cooldown;
                    *dir = facing;
                    invincible_for = Some(*duration);
                    fired = Some(SoundEffect::Dodge);
                }
                if *active {
                    *timer -= dt;
                    if *timer <= 0.0 {
                        *active = false;
                    }
                }
            }
            (
                AbilityState::Blink { cooldown },
                AbilityKind::Blink {
                    distance,
                    cooldown: base_cooldown,
                    invincibility,
                },
            ) => {
                if pressed && *cooldown <= 0.0 {
                    self.pos.x = clamp_to_level(self.pos.x + facing * distance, arena.level_length);
                    *cooldown = *base_cooldown;
                    invincible_for = Some(*invincibility);
                    fired = Some(SoundEffect::Blink);
                }
            }
            // State and profile disagree only if the tuning changed under a live run
            _ => {}
        }

        if let Some(duration) = invincible_for {
            self.grant_invincibility(duration);
        }
        fired
    }

    /// Advance the combo window; an idle window drops the combo
    pub fn tick_combo(&mut self, dt: f32, reset_window: f32) {
        self.combo_timer += dt;
        if self.combo_timer > reset_window {
            self.combo_timer = 0.0;
            self.combo_step = 0;
        }
    }

    /// Begin the next combo step if no attack is in flight
    pub fn start_attack(
        &mut self,
        profile: &ClassProfile,
        tuning: &PlayerTuning,
        ctx: &mut SimContext,
    ) -> Option<AttackLaunch> {
        if self.attack.active {
            return None;
        }

        self.combo_timer = 0.0;
        self.combo_step = if self.combo_step >= 3 { 1 } else { self.combo_step + 1 };
        self.attack.active = true;
        self.attack.elapsed = 0.0;

        let dir = facing_sign(self.facing_right);
        let tier = tier_index(self.combo_step);

        match &profile.attack {
            AttackProfile::Melee { tiers } => {
                let t = &tiers[tier];
                let attack_id = ctx.next_attack_id();
                self.attack.duration = t.duration;
                self.current_attack_id = Some(attack_id);

                let offset = dir * t.reach * tuning.hitbox_reach_fraction;
                let center = Vec2::new(self.pos.x + offset, self.pos.y);
                self.hitbox = Some(Rect::from_feet(
                    center,
                    Vec2::new(t.width + tuning.hitbox_margin, t.height),
                ));
                Some(AttackLaunch::Swing { attack_id })
            }
            AttackProfile::Ranged {
                cast_duration,
                projectile_life,
                muzzle_offset,
                tiers,
            } => {
                let t = &tiers[tier];
                self.attack.duration = *cast_duration;
                self.hitbox = None;
                Some(AttackLaunch::Cast(Projectile {
                    id: ctx.next_projectile_id(),
                    pos: self.pos + Vec2::new(dir * muzzle_offset.x, muzzle_offset.y),
                    vel: Vec2::new(dir * t.speed, 0.0),
                    radius: t.radius,
                    life: *projectile_life,
                    active: true,
                    damage: profile.hit_damage(self.base_damage, self.combo_step),
                }))
            }
        }
    }

    /// Advance the in-flight attack; the hitbox dies with the swing
    pub fn tick_attack(&mut self, dt: f32) {
        if self.attack.active {
            self.attack.elapsed += dt;
            if self.attack.elapsed > self.attack.duration {
                self.attack.active = false;
                self.hitbox = None;
            }
        }
    }

    pub fn animate(&mut self, dt: f32, frame_time: f32) {
        let row = if self.attack.active {
            AnimRow::Attack
        } else if self.moving {
            AnimRow::Move
        } else {
            AnimRow::Idle
        };
        self.anim.advance(row, dt, frame_time, PLAYER_ANIM_FRAMES);
    }
}

/// Player step of the frame pipeline
pub fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let GameState {
        tuning,
        player,
        ctx,
        projectiles,
        events,
        ..
    } = state;
    let profile = tuning.class(player.class);

    player.steer(input.move_dir(), dt, &profile.ability, &tuning.arena);
    player.tick_timers(dt);
    if let Some(sound) = player.update_special(input.special, dt, &profile.ability, &tuning.arena) {
        events.push(super::GameEvent::Sound(sound));
    }

    player.tick_combo(dt, tuning.player.combo_reset);
    if input.attack {
        if let Some(launch) = player.start_attack(profile, &tuning.player, ctx) {
            events.push(super::GameEvent::Sound(attack_sound(player.class)));
            if let AttackLaunch::Cast(projectile) = launch {
                projectiles.push(projectile);
            }
        }
    }
    player.tick_attack(dt);
    player.animate(dt, tuning.player.anim_frame_time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn player(class: PlayerClass) -> (Player, Tuning) {
        let tuning = Tuning::default();
        (Player::new(class, &tuning), tuning)
    }

    #[test]
    fn test_diagonal_movement_normalized() {
        let (mut p, tuning) = player(PlayerClass::Knight);
        let start = p.pos;
        p.steer(Vec2::new(1.0, -1.0), 0.1, &tuning.knight.ability, &tuning.arena);
        let moved = p.pos - start;
        assert!((moved.length() - 18.0).abs() < 1e-3);
        assert!(p.facing_right);
        assert!(p.moving);
    }

    #[test]
    fn test_movement_clamped_to_lane_and_level() {
        let (mut p, tuning) = player(PlayerClass::Rogue);
        for _ in 0..100 {
            p.steer(Vec2::new(-1.0, -1.0), 0.05, &tuning.rogue.ability, &tuning.arena);
        }
        assert_eq!(p.pos.x, 0.0);
        assert_eq!(p.pos.y, tuning.arena.ground_top);
        assert!(!p.facing_right);
    }

    #[test]
    fn test_block_window_and_cooldown() {
        let (mut p, tuning) = player(PlayerClass::Knight);
        let kind = tuning.knight.ability;
        assert_eq!(p.update_special(true, DT, &kind, &tuning.arena), Some(SoundEffect::Block));
        assert!(p.is_blocking());
        // Pressing again while active does nothing
        assert_eq!(p.update_special(true, DT, &kind, &tuning.arena), None);

        // The 0.7s guard window ends before the 1.0s cooldown does
        let mut t = 2.0 * DT;
        while t < 0.72 {
            p.tick_timers(DT);
            p.update_special(false, DT, &kind, &tuning.arena);
            t += DT;
        }
        assert!(!p.is_blocking());
        assert!(p.ability.cooldown() > 0.0);
        // Still cooling down
        assert_eq!(p.update_special(true, DT, &kind, &tuning.arena), None);
    }

    #[test]
    fn test_dodge_dash_and_invincibility() {
        let (mut p, tuning) = player(PlayerClass::Rogue);
        let kind = tuning.rogue.ability;
        p.facing_right = false;
        p.pos.x = 1000.0;
        assert_eq!(p.update_special(true, DT, &kind, &tuning.arena), Some(SoundEffect::Dodge));
        assert!(p.is_dodging());
        assert!(p.invincible);
        assert_eq!(p.invincible_timer, 0.25);

        // Input to the right is ignored, dash goes left at 3.5x speed
        let before = p.pos.x;
        p.steer(Vec2::new(1.0, 1.0), 0.1, &kind, &tuning.arena);
        assert!((before - p.pos.x - 270.0 * 3.5 * 0.1).abs() < 1e-3);
        assert!(!p.facing_right);

        for _ in 0..20 {
            p.tick_timers(DT);
            p.update_special(false, DT, &kind, &tuning.arena);
        }
        assert!(!p.is_dodging());
        assert!(!p.invincible);
    }

    #[test]
    fn test_blink_relocates_and_clamps() {
        let (mut p, tuning) = player(PlayerClass::Mage);
        let kind = tuning.mage.ability;
        p.pos.x = 2950.0;
        assert_eq!(p.update_special(true, DT, &kind, &tuning.arena), Some(SoundEffect::Blink));
        assert_eq!(p.pos.x, tuning.arena.level_length);
        assert!(p.invincible);
        assert_eq!(p.invincible_timer, 0.15);
        assert_eq!(p.ability.cooldown(), 1.2);
        assert_eq!(p.update_special(true, DT, &kind, &tuning.arena), None);
    }

    #[test]
    fn test_combo_cycles_and_resets() {
        let (mut p, tuning) = player(PlayerClass::Knight);
        let mut ctx = SimContext::default();
        let mut steps = Vec::new();
        for _ in 0..4 {
            p.start_attack(&tuning.knight, &tuning.player, &mut ctx).unwrap();
            steps.push(p.combo_step);
            // let the swing finish inside the reset window
            p.attack.active = false;
            p.tick_combo(0.5, tuning.player.combo_reset);
        }
        assert_eq!(steps, vec![1, 2, 3, 1]);

        p.tick_combo(0.6, tuning.player.combo_reset);
        assert_eq!(p.combo_step, 0);
    }

    #[test]
    fn test_no_new_attack_mid_swing() {
        let (mut p, tuning) = player(PlayerClass::Knight);
        let mut ctx = SimContext::default();
        assert!(p.start_attack(&tuning.knight, &tuning.player, &mut ctx).is_some());
        assert!(p.start_attack(&tuning.knight, &tuning.player, &mut ctx).is_none());
        assert_eq!(p.combo_step, 1);
    }

    #[test]
    fn test_melee_hitbox_geometry() {
        let (mut p, tuning) = player(PlayerClass::Knight);
        let mut ctx = SimContext::default();
        p.pos = Vec2::new(500.0, 400.0);
        let launch = p.start_attack(&tuning.knight, &tuning.player, &mut ctx).unwrap();
        assert_eq!(launch, AttackLaunch::Swing { attack_id: 1 });
        assert_eq!(p.current_attack_id, Some(1));
        // centre 500 + 55*0.6 = 533, width 60+20
        let hb = p.hitbox.unwrap();
        assert!((hb.x - (533.0 - 40.0)).abs() < 1e-3);
        assert_eq!(hb.w, 80.0);
        assert_eq!(hb.h, 70.0);
        assert_eq!(hb.y, 330.0);
        assert_eq!(p.attack.duration, 0.28);
    }

    #[test]
    fn test_swing_ends_after_duration() {
        let (mut p, tuning) = player(PlayerClass::Rogue);
        let mut ctx = SimContext::default();
        p.start_attack(&tuning.rogue, &tuning.player, &mut ctx);
        p.tick_attack(0.1);
        assert!(p.attack.active && p.hitbox.is_some());
        p.tick_attack(0.05);
        assert!(!p.attack.active);
        assert!(p.hitbox.is_none());
    }

    #[test]
    fn test_cast_spawns_projectile() {
        let (mut p, tuning) = player(PlayerClass::Mage);
        let mut ctx = SimContext::default();
        p.facing_right = false;
        p.pos = Vec2::new(800.0, 400.0);
        let launch = p.start_attack(&tuning.mage, &tuning.player, &mut ctx).unwrap();
        let AttackLaunch::Cast(proj) = launch.clone() else {
            panic!("mage should cast");
        };
        assert_eq!(proj.id, 1);
        assert_eq!(proj.pos, Vec2::new(770.0, 375.0));
        assert_eq!(proj.vel, Vec2::new(-420.0, 0.0));
        assert_eq!(proj.radius, 18.0);
        // round(10 * 0.8)
        assert_eq!(proj.damage, 8);
        assert_eq!(launch, AttackLaunch::Cast(proj));
        assert!(p.hitbox.is_none());
        assert_eq!(p.current_attack_id, None);
    }

    proptest! {
        #[test]
        fn combo_step_stays_in_range(
            presses in proptest::collection::vec((any::<bool>(), 0.0f32..0.6), 1..60),
        ) {
            let (mut p, tuning) = player(PlayerClass::Rogue);
            let mut ctx = SimContext::default();
            for (press, dt) in presses {
                p.tick_combo(dt, tuning.player.combo_reset);
                if press {
                    p.start_attack(&tuning.rogue, &tuning.player, &mut ctx);
                }
                p.tick_attack(dt);
                prop_assert!(p.combo_step <= 3);
            }
        }
    }
}
