//! Game state and core simulation types
//!
//! The `GameState` exclusively owns every entity collection for one
//! playthrough. Entities are plain records; nothing outside the owning
//! collection holds on to them.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::economy::{UpgradeLevels, UpgradeSlot};
use super::geometry::Rect;
use super::time::{HitStop, clamp_frame_dt};
use crate::audio::SoundEffect;
use crate::tuning::{AbilityKind, EnemyProfile, Tuning};

/// Playable classes. Each one owns exactly one special ability:
/// Knight guards, Rogue evades, Mage blinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Knight,
    Rogue,
    Mage,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 3] = [PlayerClass::Knight, PlayerClass::Rogue, PlayerClass::Mage];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerClass::Knight => "Knight",
            PlayerClass::Rogue => "Rogue",
            PlayerClass::Mage => "Mage",
        }
    }

    /// Next class in menu order (wraps)
    pub fn next(self) -> Self {
        match self {
            PlayerClass::Knight => PlayerClass::Rogue,
            PlayerClass::Rogue => PlayerClass::Mage,
            PlayerClass::Mage => PlayerClass::Knight,
        }
    }

    /// Previous class in menu order (wraps)
    pub fn prev(self) -> Self {
        match self {
            PlayerClass::Knight => PlayerClass::Mage,
            PlayerClass::Rogue => PlayerClass::Knight,
            PlayerClass::Mage => PlayerClass::Rogue,
        }
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class name that matches no playable class
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown class '{0}' (knight, rogue, mage)")]
pub struct UnknownClass(pub String);

impl FromStr for PlayerClass {
    type Err = UnknownClass;

    /// Case-insensitive class name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "knight" => Ok(PlayerClass::Knight),
            "rogue" => Ok(PlayerClass::Rogue),
            "mage" => Ok(PlayerClass::Mage),
            _ => Err(UnknownClass(s.to_string())),
        }
    }
}

/// Enemy tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Fast,
    Tank,
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Grunt,
        EnemyKind::Fast,
        EnemyKind::Tank,
        EnemyKind::Boss,
    ];

    /// Kinds the timed spawner picks from
    pub const REGULAR: [EnemyKind; 3] = [EnemyKind::Grunt, EnemyKind::Fast, EnemyKind::Tank];

    pub fn is_boss(&self) -> bool {
        *self == EnemyKind::Boss
    }
}

/// Sprite sheet row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimRow {
    #[default]
    Idle,
    Move,
    Attack,
}

impl AnimRow {
    /// Row index for the renderer. Enemy sheets have no idle row, so
    /// `Idle` and `Move` share row 0 there.
    pub fn player_row(&self) -> u32 {
        match self {
            AnimRow::Idle => 0,
            AnimRow::Move => 1,
            AnimRow::Attack => 2,
        }
    }

    pub fn enemy_row(&self) -> u32 {
        match self {
            AnimRow::Idle | AnimRow::Move => 0,
            AnimRow::Attack => 1,
        }
    }
}

/// Frame counter for a sprite animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub row: AnimRow,
    pub frame: u32,
    timer: f32,
}

impl Animation {
    pub fn advance(&mut self, row: AnimRow, dt: f32, frame_time: f32, frames: u32) {
        self.row = row;
        self.timer += dt;
        if self.timer >= frame_time {
            self.timer = 0.0;
            self.frame = (self.frame + 1) % frames.max(1);
        }
    }
}

/// Per-class special ability state. The variant is fixed by class, so a
/// player can never block and dodge at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityState {
    Block {
        active: bool,
        timer: f32,
        cooldown: f32,
    },
    Dodge {
        active: bool,
        timer: f32,
        cooldown: f32,
        dir: f32,
    },
    Blink {
        cooldown: f32,
    },
}

impl AbilityState {
    pub fn idle(kind: &AbilityKind) -> Self {
        match kind {
            AbilityKind::Block { .. } => AbilityState::Block {
                active: false,
                timer: 0.0,
                cooldown: 0.0,
            },
            AbilityKind::Dodge { .. } => AbilityState::Dodge {
                active: false,
                timer: 0.0,
                cooldown: 0.0,
                dir: 0.0,
            },
            AbilityKind::Blink { .. } => AbilityState::Blink { cooldown: 0.0 },
        }
    }

    /// Remaining cooldown, regardless of ability
    pub fn cooldown(&self) -> f32 {
        match self {
            AbilityState::Block { cooldown, .. }
            | AbilityState::Dodge { cooldown, .. }
            | AbilityState::Blink { cooldown } => *cooldown,
        }
    }
}

/// In-flight attack (melee swing or cast)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackState {
    pub active: bool,
    pub elapsed: f32,
    pub duration: f32,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub class: PlayerClass,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub base_damage: i32,
    pub facing_right: bool,
    pub attack: AttackState,
    /// 0 = no combo, otherwise 1..=3
    pub combo_step: u8,
    pub combo_timer: f32,
    /// Live melee hitbox, present only while a swing is in flight
    pub hitbox: Option<Rect>,
    /// Id of the most recent melee swing
    pub current_attack_id: Option<u32>,
    pub ability: AbilityState,
    pub invincible: bool,
    pub invincible_timer: f32,
    pub coins: u32,
    pub upgrades: UpgradeLevels,
    /// Whether the last movement step had non-zero input
    pub moving: bool,
    pub anim: Animation,
}

impl Player {
    pub fn new(class: PlayerClass, tuning: &Tuning) -> Self {
        let profile = tuning.class(class);
        Self {
            class,
            pos: Vec2::new(tuning.player.start_x, tuning.arena.lane_center()),
            size: tuning.player.size,
            hp: profile.max_hp,
            max_hp: profile.max_hp,
            speed: profile.speed,
            base_damage: profile.base_damage,
            facing_right: true,
            attack: AttackState::default(),
            combo_step: 0,
            combo_timer: 0.0,
            hitbox: None,
            current_attack_id: None,
            ability: AbilityState::idle(&profile.ability),
            invincible: false,
            invincible_timer: 0.0,
            coins: 0,
            upgrades: UpgradeLevels::default(),
            moving: false,
            anim: Animation::default(),
        }
    }

    pub fn body(&self) -> Rect {
        Rect::from_feet(self.pos, self.size)
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self.ability, AbilityState::Block { active: true, .. })
    }

    pub fn is_dodging(&self) -> bool {
        matches!(self.ability, AbilityState::Dodge { active: true, .. })
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }

    /// Grant invincibility for at least `duration`
    pub fn grant_invincibility(&mut self, duration: f32) {
        self.invincible = true;
        self.invincible_timer = self.invincible_timer.max(duration);
    }
}

/// Enemy attack cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EnemyPhase {
    /// Walking toward the player
    #[default]
    Pursue,
    /// Telegraphing, stationary
    Windup { timer: f32 },
    /// Strike resolved, stationary recovery
    Strike { timer: f32 },
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub alive: bool,
    pub attack_cooldown: f32,
    pub phase: EnemyPhase,
    /// Last melee swing that damaged this enemy
    pub last_hit_attack_id: Option<u32>,
    /// Last projectile that damaged this enemy
    pub last_projectile_hit_id: Option<u32>,
    pub anim: Animation,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, profile: &EnemyProfile) -> Self {
        Self {
            id,
            kind,
            pos,
            size: profile.size,
            hp: profile.max_hp,
            max_hp: profile.max_hp,
            speed: profile.speed,
            alive: true,
            attack_cooldown: 0.0,
            phase: EnemyPhase::Pursue,
            last_hit_attack_id: None,
            last_projectile_hit_id: None,
            anim: Animation::default(),
        }
    }

    pub fn body(&self) -> Rect {
        Rect::from_feet(self.pos, self.size)
    }

    pub fn is_winding_up(&self) -> bool {
        matches!(self.phase, EnemyPhase::Windup { .. })
    }

    pub fn is_striking(&self) -> bool {
        matches!(self.phase, EnemyPhase::Strike { .. })
    }

    /// Subtract damage, keeping hp in `[0, max_hp]`. Returns true only on the
    /// hit that kills.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.hp = (self.hp - damage).clamp(0, self.max_hp);
        if self.hp == 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

/// A piercing projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub life: f32,
    pub active: bool,
    pub damage: i32,
}

impl Projectile {
    /// Move and age; deactivates on expiry or when far outside the level
    pub fn advance(&mut self, dt: f32, level_length: f32) {
        if !self.active {
            return;
        }
        self.pos += self.vel * dt;
        self.life -= dt;
        if self.life <= 0.0 || self.pos.x < -200.0 || self.pos.x > level_length + 200.0 {
            self.active = false;
        }
    }
}

/// A dropped coin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub collected: bool,
}

impl Coin {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            collected: false,
        }
    }

    pub fn pickup_rect(&self, size: f32) -> Rect {
        Rect::centered(self.pos, Vec2::splat(size))
    }
}

/// Per-playthrough counters and the hitstop timer, reset on every run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimContext {
    pub hitstop: HitStop,
    attack_seq: u32,
    projectile_seq: u32,
    entity_seq: u32,
}

impl SimContext {
    /// Fresh id for a melee swing (monotonically increasing, starts at 1)
    pub fn next_attack_id(&mut self) -> u32 {
        self.attack_seq += 1;
        self.attack_seq
    }

    /// Fresh id for a projectile (monotonically increasing, starts at 1)
    pub fn next_projectile_id(&mut self) -> u32 {
        self.projectile_seq += 1;
        self.projectile_seq
    }

    pub fn next_entity_id(&mut self) -> u32 {
        self.entity_seq += 1;
        self.entity_seq
    }

    /// Clamp the raw delta and drain hitstop with it. Returns the delta that
    /// drives movement, timers and AI this frame.
    pub fn advance_frame(&mut self, raw_dt: f32, max_dt: f32) -> f32 {
        self.hitstop.advance(clamp_frame_dt(raw_dt, max_dt))
    }
}

/// Things that happened during a frame, drained by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    EnemySpawned { id: u32, kind: EnemyKind, pos: Vec2 },
    EnemyKilled { kind: EnemyKind, pos: Vec2 },
    BossSpawned,
    BossDefeated,
    PlayerDefeated,
    CoinCollected { total: u32 },
    UpgradePurchased { slot: UpgradeSlot, level: u32, cost: u32 },
}

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Class selection
    Menu,
    /// Active gameplay
    Playing,
    /// Upgrade shop, world paused
    Shop,
    /// Boss defeated
    Victory,
    /// Player defeated
    GameOver,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Class highlighted in the menu and used by the next reset
    pub selected_class: PlayerClass,
    pub shop_selection: UpgradeSlot,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub coins: Vec<Coin>,
    pub boss_spawned: bool,
    pub boss_defeated: bool,
    pub spawn_timer: f32,
    pub ctx: SimContext,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    /// Frames stepped while playing
    pub frames: u64,
}

impl GameState {
    /// New state sitting in the class-selection menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let selected_class = PlayerClass::Knight;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(selected_class, &tuning),
            tuning,
            phase: GamePhase::Menu,
            selected_class,
            shop_selection: UpgradeSlot::Damage,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            coins: Vec::new(),
            boss_spawned: false,
            boss_defeated: false,
            spawn_timer: 0.0,
            ctx: SimContext::default(),
            events: Vec::new(),
            frames: 0,
        }
    }

    /// Replace every collection and counter and rebuild the player from the
    /// selected class. Undrained events are dropped. Does not touch the phase.
    pub fn reset(&mut self) {
        self.player = Player::new(self.selected_class, &self.tuning);
        self.shop_selection = UpgradeSlot::Damage;
        self.events.clear();
        self.enemies = Vec::new();
        self.projectiles = Vec::new();
        self.coins = Vec::new();
        self.boss_spawned = false;
        self.boss_defeated = false;
        self.spawn_timer = 0.0;
        self.ctx = SimContext::default();
        self.frames = 0;
    }

    /// Reset with `class` and enter play
    pub fn start_run(&mut self, class: PlayerClass) {
        self.selected_class = class;
        self.reset();
        self.phase = GamePhase::Playing;
        log::info!("Run started as {} (seed {})", class, self.seed);
    }

    /// Spawn an enemy of `kind` standing at `pos`
    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.ctx.next_entity_id();
        let profile = self.tuning.enemies.profile(kind);
        self.enemies.push(Enemy::new(id, kind, pos, profile));
        self.events.push(GameEvent::EnemySpawned { id, kind, pos });
        id
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn boss_alive(&self) -> bool {
        self.enemies.iter().any(|e| e.alive && e.kind.is_boss())
    }

    /// Take every event emitted since the previous drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
