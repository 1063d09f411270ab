//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame deltas in, no wall clock reads
//! - Seeded RNG only
//! - Stable iteration order (collection order, ids assigned monotonically)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod combat;
pub mod director;
pub mod economy;
pub mod enemy;
pub mod geometry;
pub mod player;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod time;

pub use economy::{PurchaseError, UpgradeLevels, UpgradeSlot, upgrade_cost};
pub use geometry::Rect;
pub use rng::RandomSource;
pub use snapshot::{FrameSnapshot, Hud};
pub use state::{
    AbilityState, Coin, Enemy, EnemyKind, EnemyPhase, GameEvent, GamePhase, GameState, Player,
    PlayerClass, Projectile, SimContext, UnknownClass,
};
pub use tick::{TickInput, tick};
pub use time::HitStop;
