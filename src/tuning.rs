//! Data-driven game balance
//!
//! Every number the simulation reads lives here. `Tuning::default()` holds
//! the shipped balance; a JSON document can override any subset of it.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::*;
use crate::sim::state::{EnemyKind, PlayerClass};

/// Errors raised while loading or validating a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("lane band is empty (top {top} >= bottom {bottom})")]
    EmptyLane { top: f32, bottom: f32 },
    #[error("level length must be positive, got {0}")]
    LevelLength(f32),
    #[error("{class} combo multipliers decrease between tiers")]
    DecreasingTiers { class: PlayerClass },
    #[error("{class} tier {tier} has a non-positive attack duration")]
    AttackDuration { class: PlayerClass, tier: usize },
    #[error("{kind:?} enemy profile needs positive max hp")]
    EnemyHp { kind: EnemyKind },
}

/// Level geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub ground_top: f32,
    pub ground_bottom: f32,
    pub level_length: f32,
    /// Upper bound on the real frame delta
    pub max_frame_dt: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            ground_top: GROUND_TOP,
            ground_bottom: GROUND_BOTTOM,
            level_length: LEVEL_LENGTH,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl ArenaTuning {
    /// Vertical centre of the lane band
    pub fn lane_center(&self) -> f32 {
        (self.ground_top + self.ground_bottom) * 0.5
    }
}

/// Class-independent player tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub size: Vec2,
    pub start_x: f32,
    /// Combo resets to step 0 after this long without an attack
    pub combo_reset: f32,
    /// Extra hitbox width so enemies hugging the player still get struck
    pub hitbox_margin: f32,
    /// Hitbox centre offset as a fraction of reach
    pub hitbox_reach_fraction: f32,
    pub anim_frame_time: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(40.0, 75.0),
            start_x: 100.0,
            combo_reset: 1.0,
            hitbox_margin: 20.0,
            hitbox_reach_fraction: 0.6,
            anim_frame_time: 0.12,
        }
    }
}

/// Special ability, one per class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityKind {
    /// Guard: mitigates strikes to a third while active
    Block { duration: f32, cooldown: f32 },
    /// Evasive: fixed-direction dash with full invincibility
    Dodge {
        duration: f32,
        cooldown: f32,
        speed_multiplier: f32,
    },
    /// Caster: instant relocation with a short invincibility window
    Blink {
        distance: f32,
        cooldown: f32,
        invincibility: f32,
    },
}

/// One step of a melee combo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeTier {
    pub duration: f32,
    pub reach: f32,
    pub width: f32,
    pub height: f32,
    pub multiplier: f32,
    pub knockback: f32,
    pub hitstop: f32,
}

impl MeleeTier {
    const fn new(
        duration: f32,
        reach: f32,
        width: f32,
        height: f32,
        multiplier: f32,
        knockback: f32,
        hitstop: f32,
    ) -> Self {
        Self {
            duration,
            reach,
            width,
            height,
            multiplier,
            knockback,
            hitstop,
        }
    }
}

/// One step of a ranged combo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedTier {
    pub multiplier: f32,
    pub radius: f32,
    pub speed: f32,
}

/// How a class turns an attack press into damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum AttackProfile {
    Melee {
        tiers: [MeleeTier; 3],
    },
    Ranged {
        cast_duration: f32,
        projectile_life: f32,
        /// Spawn offset from the player's feet (x is mirrored by facing)
        muzzle_offset: Vec2,
        tiers: [RangedTier; 3],
    },
}

/// Read-only per-class profile, applied on every run reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassProfile {
    pub name: String,
    pub max_hp: i32,
    pub speed: f32,
    pub base_damage: i32,
    pub ability: AbilityKind,
    pub attack: AttackProfile,
}

/// Map a combo step to a tier index, clamping into 1..=3
#[inline]
pub fn tier_index(step: u8) -> usize {
    step.clamp(1, 3) as usize - 1
}

impl ClassProfile {
    pub fn knight() -> Self {
        Self {
            name: "Knight".to_string(),
            max_hp: 170,
            speed: 180.0,
            base_damage: 20,
            ability: AbilityKind::Block {
                duration: 0.7,
                cooldown: 1.0,
            },
            attack: AttackProfile::Melee {
                tiers: [
                    MeleeTier::new(0.28, 55.0, 60.0, 70.0, 1.0, 35.0, 0.03),
                    MeleeTier::new(0.32, 65.0, 70.0, 75.0, 1.3, 35.0, 0.03),
                    // Finisher
                    MeleeTier::new(0.40, 80.0, 85.0, 80.0, 2.0, 90.0, 0.06),
                ],
            },
        }
    }

    pub fn rogue() -> Self {
        Self {
            name: "Rogue".to_string(),
            max_hp: 110,
            speed: 270.0,
            base_damage: 14,
            ability: AbilityKind::Dodge {
                duration: 0.25,
                cooldown: 0.9,
                speed_multiplier: 3.5,
            },
            attack: AttackProfile::Melee {
                tiers: [
                    MeleeTier::new(0.12, 45.0, 35.0, 55.0, 0.7, 22.0, 0.03),
                    MeleeTier::new(0.14, 55.0, 40.0, 55.0, 0.9, 22.0, 0.03),
                    MeleeTier::new(0.16, 60.0, 45.0, 55.0, 1.1, 22.0, 0.03),
                ],
            },
        }
    }

    pub fn mage() -> Self {
        Self {
            name: "Mage".to_string(),
            max_hp: 90,
            speed: 190.0,
            base_damage: 10,
            ability: AbilityKind::Blink {
                distance: 150.0,
                cooldown: 1.2,
                invincibility: 0.15,
            },
            attack: AttackProfile::Ranged {
                cast_duration: 0.22,
                projectile_life: 1.2,
                muzzle_offset: Vec2::new(30.0, -25.0),
                tiers: [
                    RangedTier {
                        multiplier: 0.8,
                        radius: 18.0,
                        speed: 420.0,
                    },
                    RangedTier {
                        multiplier: 1.0,
                        radius: 22.0,
                        speed: 460.0,
                    },
                    RangedTier {
                        multiplier: 1.2,
                        radius: 26.0,
                        speed: 520.0,
                    },
                ],
            },
        }
    }

    /// Damage multiplier for a combo step
    pub fn combo_multiplier(&self, step: u8) -> f32 {
        let i = tier_index(step);
        match &self.attack {
            AttackProfile::Melee { tiers } => tiers[i].multiplier,
            AttackProfile::Ranged { tiers, .. } => tiers[i].multiplier,
        }
    }

    /// Damage of one hit at `step` for the given base damage
    pub fn hit_damage(&self, base_damage: i32, step: u8) -> i32 {
        (base_damage as f32 * self.combo_multiplier(step)).round() as i32
    }

    fn validate(&self, class: PlayerClass) -> Result<(), TuningError> {
        let multipliers: Vec<f32> = (1..=3).map(|s| self.combo_multiplier(s)).collect();
        if multipliers.windows(2).any(|w| w[1] < w[0]) {
            return Err(TuningError::DecreasingTiers { class });
        }
        let durations: Vec<f32> = match &self.attack {
            AttackProfile::Melee { tiers } => tiers.iter().map(|t| t.duration).collect(),
            AttackProfile::Ranged { cast_duration, .. } => vec![*cast_duration; 3],
        };
        if let Some(tier) = durations.iter().position(|d| *d <= 0.0) {
            return Err(TuningError::AttackDuration {
                class,
                tier: tier + 1,
            });
        }
        Ok(())
    }
}

/// Per-type enemy stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    pub size: Vec2,
    pub max_hp: i32,
    pub speed: f32,
    /// Telegraph length before the strike resolves
    pub windup: f32,
    pub strike_damage: i32,
    /// Coins dropped on death
    pub coins: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub grunt: EnemyProfile,
    pub fast: EnemyProfile,
    pub tank: EnemyProfile,
    pub boss: EnemyProfile,
    /// Stationary recovery after a strike
    pub strike_duration: f32,
    /// Cooldown armed when a strike resolves
    pub attack_cooldown: f32,
    /// Vertical speed relative to horizontal while pursuing
    pub vertical_speed_factor: f32,
    /// Enemies stop steering when this close to the player
    pub stop_distance: f32,
    /// Minimum hitstop when a strike damages the player
    pub player_hit_hitstop: f32,
    pub anim_frame_time: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            grunt: EnemyProfile {
                size: Vec2::new(40.0, 70.0),
                max_hp: 90,
                speed: 80.0,
                windup: 0.35,
                strike_damage: 6,
                coins: 1,
            },
            fast: EnemyProfile {
                size: Vec2::new(32.0, 60.0),
                max_hp: 80,
                speed: 135.0,
                windup: 0.25,
                strike_damage: 8,
                coins: 1,
            },
            tank: EnemyProfile {
                size: Vec2::new(60.0, 90.0),
                max_hp: 150,
                speed: 55.0,
                windup: 0.45,
                strike_damage: 13,
                coins: 3,
            },
            boss: EnemyProfile {
                size: Vec2::new(100.0, 140.0),
                max_hp: 450,
                speed: 70.0,
                windup: 0.6,
                strike_damage: 20,
                coins: 10,
            },
            strike_duration: 0.22,
            attack_cooldown: 1.1,
            vertical_speed_factor: 0.6,
            stop_distance: 5.0,
            player_hit_hitstop: 0.05,
            anim_frame_time: 0.15,
        }
    }
}

impl EnemyTuning {
    pub fn profile(&self, kind: EnemyKind) -> &EnemyProfile {
        match kind {
            EnemyKind::Grunt => &self.grunt,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Boss => &self.boss,
        }
    }
}

/// Spawn director tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterTuning {
    pub spawn_interval: f32,
    /// Inclusive random offset below the lane top
    pub lane_jitter: (i32, i32),
    /// Inclusive random distance ahead of the player
    pub spawn_ahead: (i32, i32),
    pub min_spawn_x: f32,
    /// Spawns stay at least this far from the level end
    pub spawn_end_margin: f32,
    /// Boss appears once the player passes `level_length - boss_trigger_margin`
    pub boss_trigger_margin: f32,
    /// Boss stands at `level_length - boss_margin`
    pub boss_margin: f32,
}

impl Default for EncounterTuning {
    fn default() -> Self {
        Self {
            spawn_interval: 3.0,
            lane_jitter: (0, 100),
            spawn_ahead: (250, 450),
            min_spawn_x: 400.0,
            spawn_end_margin: 300.0,
            boss_trigger_margin: 600.0,
            boss_margin: 200.0,
        }
    }
}

/// Coin drop and pickup tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTuning {
    pub scatter_x: (i32, i32),
    /// Coins rise up to this far above the death position
    pub scatter_up: (i32, i32),
    /// Side of the square pickup box centred on a coin
    pub pickup_size: f32,
}

impl Default for LootTuning {
    fn default() -> Self {
        Self {
            scatter_x: (-10, 10),
            scatter_up: (0, 20),
            pickup_size: 12.0,
        }
    }
}

/// Shop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Base cost per slot, in `UpgradeSlot` order (damage, health, speed)
    pub base_cost: [u32; 3],
    pub damage_bonus: i32,
    pub health_bonus: i32,
    pub speed_bonus: f32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            base_cost: [5, 5, 5],
            damage_bonus: 3,
            health_bonus: 15,
            speed_bonus: 20.0,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub knight: ClassProfile,
    pub rogue: ClassProfile,
    pub mage: ClassProfile,
    pub enemies: EnemyTuning,
    pub encounter: EncounterTuning,
    pub loot: LootTuning,
    pub economy: EconomyTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena: ArenaTuning::default(),
            player: PlayerTuning::default(),
            knight: ClassProfile::knight(),
            rogue: ClassProfile::rogue(),
            mage: ClassProfile::mage(),
            enemies: EnemyTuning::default(),
            encounter: EncounterTuning::default(),
            loot: LootTuning::default(),
            economy: EconomyTuning::default(),
        }
    }
}

/// Overlay `patch` onto `base`, recursing through objects. Arrays and
/// scalars in the patch replace the base value whole.
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it. The
    /// document is merged field by field onto the defaults, so a single
    /// class or enemy stat can be overridden on its own.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let patch: Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(Tuning::default())?;
        merge_json(&mut merged, patch);
        let tuning: Tuning = serde_json::from_value(merged)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn class(&self, class: PlayerClass) -> &ClassProfile {
        match class {
            PlayerClass::Knight => &self.knight,
            PlayerClass::Rogue => &self.rogue,
            PlayerClass::Mage => &self.mage,
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let arena = &self.arena;
        if arena.ground_top >= arena.ground_bottom {
            return Err(TuningError::EmptyLane {
                top: arena.ground_top,
                bottom: arena.ground_bottom,
            });
        }
        if arena.level_length <= 0.0 {
            return Err(TuningError::LevelLength(arena.level_length));
        }
        for class in PlayerClass::ALL {
            self.class(class).validate(class)?;
        }
        for kind in EnemyKind::ALL {
            if self.enemies.profile(kind).max_hp <= 0 {
                return Err(TuningError::EnemyHp { kind });
            }
        }
        Ok(())
    }
}
