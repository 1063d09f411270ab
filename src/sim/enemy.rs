//! Enemy AI: pursue, telegraph, strike, recover

use glam::Vec2;

use super::geometry::Rect;
use super::state::{AnimRow, Enemy, EnemyPhase, GameEvent, GameState, Player};
use super::time::HitStop;
use crate::audio::SoundEffect;
use crate::clamp_to_lane;
use crate::consts::ENEMY_ANIM_FRAMES;
use crate::tuning::{ArenaTuning, EnemyTuning};

/// How an incoming strike was reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mitigation {
    None,
    /// Guard ability active: a third of the damage, rounded down
    Blocked,
    /// Invincible: nothing gets through
    Evaded,
}

/// Apply the mitigation order: invincibility, then guard, then full damage
pub fn mitigate(player: &Player, damage: i32) -> (i32, Mitigation) {
    if player.invincible {
        (0, Mitigation::Evaded)
    } else if player.is_blocking() {
        (damage.max(0) / 3, Mitigation::Blocked)
    } else {
        (damage.max(0), Mitigation::None)
    }
}

/// Land a strike on the player. Returns the damage actually dealt.
pub fn strike_player(
    player: &mut Player,
    damage: i32,
    hitstop: &mut HitStop,
    hitstop_floor: f32,
    events: &mut Vec<GameEvent>,
) -> i32 {
    let (dealt, mitigation) = mitigate(player, damage);
    if mitigation == Mitigation::Blocked {
        events.push(GameEvent::Sound(SoundEffect::Block));
    }
    if dealt > 0 {
        player.hp = (player.hp - dealt).max(0);
        hitstop.request(hitstop_floor);
        events.push(GameEvent::Sound(SoundEffect::EnemySwing));
    }
    dealt
}

impl Enemy {
    /// Walk toward `target`, leading horizontally; no-op unless pursuing
    pub fn pursue(&mut self, target: Vec2, dt: f32, tuning: &EnemyTuning, arena: &ArenaTuning) {
        if self.phase != EnemyPhase::Pursue {
            return;
        }
        let to_target = target - self.pos;
        let dir = if to_target.length() > tuning.stop_distance {
            to_target.normalize()
        } else {
            Vec2::ZERO
        };
        self.pos.x += dir.x * self.speed * dt;
        self.pos.y += dir.y * self.speed * tuning.vertical_speed_factor * dt;
        self.pos.y = clamp_to_lane(self.pos.y, arena.ground_top, arena.ground_bottom);
    }

    /// Advance the attack cycle. Returns raw strike damage on the frame a
    /// windup expires with the player still in contact.
    pub fn advance_attack_cycle(
        &mut self,
        player_body: &Rect,
        dt: f32,
        tuning: &EnemyTuning,
    ) -> Option<i32> {
        let profile = tuning.profile(self.kind);
        let mut strike = None;

        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        if self.phase == EnemyPhase::Pursue
            && self.attack_cooldown <= 0.0
            && self.body().overlaps(player_body)
        {
            self.phase = EnemyPhase::Windup {
                timer: profile.windup,
            };
        }

        if let EnemyPhase::Windup { timer } = &mut self.phase {
            *timer -= dt;
            if *timer <= 0.0 {
                // The player may have stepped away or dodged through
                if self.body().overlaps(player_body) {
                    strike = Some(profile.strike_damage);
                }
                self.phase = EnemyPhase::Strike {
                    timer: tuning.strike_duration,
                };
                self.attack_cooldown = tuning.attack_cooldown;
            }
        }

        if let EnemyPhase::Strike { timer } = &mut self.phase {
            *timer -= dt;
            if *timer <= 0.0 {
                self.phase = EnemyPhase::Pursue;
            }
        }

        strike
    }

    pub fn animate(&mut self, dt: f32, frame_time: f32) {
        let row = match self.phase {
            EnemyPhase::Pursue => AnimRow::Move,
            EnemyPhase::Windup { .. } | EnemyPhase::Strike { .. } => AnimRow::Attack,
        };
        self.anim.advance(row, dt, frame_time, ENEMY_ANIM_FRAMES);
    }
}

/// Enemy step of the frame pipeline
pub fn update_enemies(state: &mut GameState, dt: f32) {
    let GameState {
        tuning,
        player,
        enemies,
        ctx,
        events,
        ..
    } = state;
    let etuning = &tuning.enemies;

    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        enemy.pursue(player.pos, dt, etuning, &tuning.arena);
        if let Some(damage) = enemy.advance_attack_cycle(&player.body(), dt, etuning) {
            strike_player(player, damage, &mut ctx.hitstop, etuning.player_hit_hitstop, events);
        }
        enemy.animate(dt, etuning.anim_frame_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{AbilityState, EnemyKind, PlayerClass};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn setup(kind: EnemyKind, class: PlayerClass) -> (Enemy, Player, Tuning) {
        let tuning = Tuning::default();
        let mut player = Player::new(class, &tuning);
        player.pos = Vec2::new(500.0, 400.0);
        let enemy = Enemy::new(1, kind, Vec2::new(510.0, 400.0), tuning.enemies.profile(kind));
        (enemy, player, tuning)
    }

    /// Step until the enemy's windup resolves, returning the strike damage
    fn run_until_strike(enemy: &mut Enemy, body: &Rect, tuning: &Tuning) -> Option<i32> {
        for _ in 0..120 {
            let was_winding = enemy.is_winding_up();
            let strike = enemy.advance_attack_cycle(body, DT, &tuning.enemies);
            if was_winding && !enemy.is_winding_up() {
                return strike;
            }
        }
        panic!("windup never resolved");
    }

    #[test]
    fn test_pursue_leads_horizontally() {
        let (mut enemy, _, tuning) = setup(EnemyKind::Grunt, PlayerClass::Knight);
        enemy.pos = Vec2::new(800.0, 360.0);
        let target = Vec2::new(400.0, 430.0);
        let before = enemy.pos;
        enemy.pursue(target, 0.1, &tuning.enemies, &tuning.arena);
        let dx = (enemy.pos.x - before.x).abs();
        let dy = (enemy.pos.y - before.y).abs();
        let dir = (target - before).normalize();
        assert!((dx - dir.x.abs() * 80.0 * 0.1).abs() < 1e-3);
        assert!((dy - dir.y.abs() * 80.0 * 0.6 * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_pursue_stops_when_adjacent() {
        let (mut enemy, _, tuning) = setup(EnemyKind::Fast, PlayerClass::Knight);
        let target = enemy.pos + Vec2::new(3.0, 0.0);
        let before = enemy.pos;
        enemy.pursue(target, 0.1, &tuning.enemies, &tuning.arena);
        assert_eq!(enemy.pos, before);
    }

    #[test]
    fn test_stationary_during_windup() {
        let (mut enemy, player, tuning) = setup(EnemyKind::Grunt, PlayerClass::Knight);
        enemy.advance_attack_cycle(&player.body(), DT, &tuning.enemies);
        assert!(enemy.is_winding_up());
        let before = enemy.pos;
        enemy.pursue(Vec2::new(0.0, 430.0), 0.1, &tuning.enemies, &tuning.arena);
        assert_eq!(enemy.pos, before);
    }

    #[test]
    fn test_stationary_during_strike_recovery() {
        let (mut enemy, player, tuning) = setup(EnemyKind::Grunt, PlayerClass::Knight);
        assert_eq!(run_until_strike(&mut enemy, &player.body(), &tuning), Some(6));
        assert!(enemy.is_striking());

        let before = enemy.pos;
        enemy.pursue(Vec2::new(0.0, 350.0), 0.1, &tuning.enemies, &tuning.arena);
        assert_eq!(enemy.pos, before);
    }

    #[test]
    fn test_full_cycle_returns_to_pursue() {
        let (mut enemy, player, tuning) = setup(EnemyKind::Fast, PlayerClass::Knight);
        let body = player.body();
        assert_eq!(run_until_strike(&mut enemy, &body, &tuning), Some(8));
        assert!(enemy.is_striking());
        assert!(enemy.attack_cooldown > 1.0);

        for _ in 0..20 {
            enemy.advance_attack_cycle(&body, DT, &tuning.enemies);
        }
        assert_eq!(enemy.phase, EnemyPhase::Pursue);
        // Cooldown still pending, so no immediate re-telegraph
        assert!(enemy.attack_cooldown > 0.0);
        enemy.advance_attack_cycle(&body, DT, &tuning.enemies);
        assert_eq!(enemy.phase, EnemyPhase::Pursue);
    }

    #[test]
    fn test_windup_whiffs_if_player_leaves() {
        let (mut enemy, mut player, tuning) = setup(EnemyKind::Tank, PlayerClass::Rogue);
        enemy.advance_attack_cycle(&player.body(), DT, &tuning.enemies);
        assert!(enemy.is_winding_up());
        player.pos.x += 300.0;
        assert_eq!(run_until_strike(&mut enemy, &player.body(), &tuning), None);
        assert!(enemy.is_striking());
    }

    #[test]
    fn test_windup_length_by_type() {
        let tuning = Tuning::default();
        let e = &tuning.enemies;
        assert!(e.fast.windup < e.grunt.windup);
        assert!(e.grunt.windup < e.tank.windup);
        assert!(e.tank.windup < e.boss.windup);
    }

    #[test]
    fn test_invincible_takes_nothing() {
        let (_, mut player, _) = setup(EnemyKind::Boss, PlayerClass::Rogue);
        player.invincible = true;
        let mut hs = HitStop::default();
        let mut events = Vec::new();
        assert_eq!(strike_player(&mut player, 20, &mut hs, 0.05, &mut events), 0);
        assert_eq!(player.hp, player.max_hp);
        assert!(!hs.is_active());
        assert!(events.is_empty());
    }

    #[test]
    fn test_guard_takes_a_third() {
        let (_, mut player, _) = setup(EnemyKind::Tank, PlayerClass::Knight);
        player.ability = AbilityState::Block {
            active: true,
            timer: 0.5,
            cooldown: 0.5,
        };
        let mut hs = HitStop::default();
        let mut events = Vec::new();
        assert_eq!(strike_player(&mut player, 13, &mut hs, 0.05, &mut events), 4);
        assert_eq!(player.hp, 170 - 4);
        assert_eq!(
            events,
            vec![
                GameEvent::Sound(SoundEffect::Block),
                GameEvent::Sound(SoundEffect::EnemySwing)
            ]
        );
        assert_eq!(hs.remaining(), 0.05);
    }

    #[test]
    fn test_blocked_to_zero_skips_hitstop() {
        let (_, mut player, _) = setup(EnemyKind::Grunt, PlayerClass::Knight);
        player.ability = AbilityState::Block {
            active: true,
            timer: 0.5,
            cooldown: 0.5,
        };
        let mut hs = HitStop::default();
        let mut events = Vec::new();
        assert_eq!(strike_player(&mut player, 2, &mut hs, 0.05, &mut events), 0);
        assert!(!hs.is_active());
    }

    #[test]
    fn test_hp_floored_at_zero() {
        let (_, mut player, _) = setup(EnemyKind::Boss, PlayerClass::Mage);
        player.hp = 5;
        let mut hs = HitStop::default();
        strike_player(&mut player, 20, &mut hs, 0.05, &mut Vec::new());
        assert_eq!(player.hp, 0);
        assert!(!player.is_alive());
    }

    proptest! {
        #[test]
        fn guard_is_floor_third(damage in 0i32..1000) {
            let tuning = Tuning::default();
            let mut player = Player::new(PlayerClass::Knight, &tuning);
            player.ability = AbilityState::Block { active: true, timer: 0.5, cooldown: 0.0 };
            let (dealt, m) = mitigate(&player, damage);
            prop_assert_eq!(m, Mitigation::Blocked);
            prop_assert_eq!(dealt, damage / 3);
        }

        #[test]
        fn player_hp_stays_in_bounds(hits in proptest::collection::vec(0i32..60, 0..40)) {
            let tuning = Tuning::default();
            let mut player = Player::new(PlayerClass::Rogue, &tuning);
            let mut hs = HitStop::default();
            for dmg in hits {
                strike_player(&mut player, dmg, &mut hs, 0.05, &mut Vec::new());
                prop_assert!(player.hp >= 0 && player.hp <= player.max_hp);
            }
        }
    }
}
