//! Damage resolution: melee swings, piercing projectiles, loot and pickups
//!
//! Hit-gating keeps a single "last id" per enemy for each attack channel.
//! A swing id is compared against `last_hit_attack_id`, so one swing lands
//! at most once per enemy. A projectile id is compared against
//! `last_projectile_hit_id`, so a projectile pierces through a crowd but
//! never hits the same enemy twice.

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{Coin, EnemyKind, GameEvent, GamePhase, GameState};
use crate::audio::SoundEffect;
use crate::clamp_to_level;
use crate::tuning::{AttackProfile, LootTuning, tier_index};

/// Scatter `count` coins around a death position
pub fn scatter_coins<R: RandomSource + ?Sized>(
    pos: Vec2,
    count: u32,
    loot: &LootTuning,
    rng: &mut R,
) -> Vec<Coin> {
    (0..count)
        .map(|_| {
            let dx = rng.range_inclusive(loot.scatter_x.0, loot.scatter_x.1) as f32;
            let up = rng.range_inclusive(loot.scatter_up.0, loot.scatter_up.1) as f32;
            Coin::new(pos + Vec2::new(dx, -up))
        })
        .collect()
}

impl GameState {
    /// Loot, boss bookkeeping and events for an enemy that just died
    pub fn on_enemy_killed(&mut self, kind: EnemyKind, pos: Vec2) {
        let count = self.tuning.enemies.profile(kind).coins;
        let drops = scatter_coins(pos, count, &self.tuning.loot, &mut self.rng);
        self.coins.extend(drops);
        self.events.push(GameEvent::EnemyKilled { kind, pos });
        log::debug!("{kind:?} killed at ({:.0}, {:.0}), dropped {count} coins", pos.x, pos.y);

        if kind.is_boss() {
            self.boss_defeated = true;
            self.phase = GamePhase::Victory;
            self.events.push(GameEvent::BossDefeated);
            log::info!("Boss defeated after {} frames", self.frames);
        }
    }
}

/// Apply the live melee hitbox to every enemy it touches
pub fn resolve_melee(state: &mut GameState) {
    let GameState {
        tuning,
        player,
        enemies,
        ctx,
        events,
        ..
    } = state;

    let (Some(hitbox), Some(attack_id)) = (player.hitbox, player.current_attack_id) else {
        return;
    };
    if !player.attack.active {
        return;
    }
    let profile = tuning.class(player.class);
    let AttackProfile::Melee { tiers } = &profile.attack else {
        return;
    };
    let tier = &tiers[tier_index(player.combo_step)];
    let damage = profile.hit_damage(player.base_damage, player.combo_step);

    let mut kills = Vec::new();
    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        if enemy.last_hit_attack_id == Some(attack_id) || !enemy.body().overlaps(&hitbox) {
            continue;
        }
        enemy.last_hit_attack_id = Some(attack_id);

        let killed = enemy.take_damage(damage);
        ctx.hitstop.request(tier.hitstop);
        events.push(GameEvent::Sound(SoundEffect::Hit));

        let away = if enemy.pos.x < player.pos.x { -1.0 } else { 1.0 };
        let pushed = enemy.pos.x + away * tier.knockback;
        enemy.pos.x = clamp_to_level(pushed, tuning.arena.level_length);

        if killed {
            kills.push((enemy.kind, enemy.pos));
        }
    }

    for (kind, pos) in kills {
        state.on_enemy_killed(kind, pos);
    }
}

/// Test every active projectile against every live enemy
pub fn resolve_projectiles(state: &mut GameState) {
    let GameState {
        projectiles,
        enemies,
        events,
        ..
    } = state;

    let mut kills = Vec::new();
    for projectile in projectiles.iter().filter(|p| p.active) {
        for enemy in enemies.iter_mut().filter(|e| e.alive) {
            if enemy.last_projectile_hit_id == Some(projectile.id)
                || !enemy.body().overlaps_circle(projectile.pos, projectile.radius)
            {
                continue;
            }
            enemy.last_projectile_hit_id = Some(projectile.id);
            // No hitstop here: projectiles keep flying through the crowd
            events.push(GameEvent::Sound(SoundEffect::Hit));
            if enemy.take_damage(projectile.damage) {
                kills.push((enemy.kind, enemy.pos));
            }
        }
    }

    for (kind, pos) in kills {
        state.on_enemy_killed(kind, pos);
    }
}

/// Collect every coin whose pickup box touches the player
pub fn collect_coins(state: &mut GameState) {
    let body = state.player.body();
    let size = state.tuning.loot.pickup_size;
    for coin in state.coins.iter_mut().filter(|c| !c.collected) {
        if coin.pickup_rect(size).overlaps(&body) {
            coin.collected = true;
            state.player.coins += 1;
            state.events.push(GameEvent::CoinCollected {
                total: state.player.coins,
            });
        }
    }
}
