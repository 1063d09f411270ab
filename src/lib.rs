//! Lane Brawler - combat simulation core for a side-scrolling beat 'em up
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (player, enemies, projectiles, loot)
//! - `tuning`: Data-driven game balance
//! - `audio`: Sound trigger ids handed to the presentation layer

pub mod audio;
pub mod sim;
pub mod tuning;

pub use audio::{AudioSink, SoundEffect};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Longest real frame delta the simulation accepts (prevents spiral of death)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Nominal frame delta used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Walkable lane band (screen y grows downward)
    pub const GROUND_TOP: f32 = 350.0;
    pub const GROUND_BOTTOM: f32 = 430.0;
    /// Horizontal extent of the level corridor
    pub const LEVEL_LENGTH: f32 = 3000.0;

    /// Sprite sheet layout shared with the renderer
    pub const PLAYER_ANIM_FRAMES: u32 = 4;
    pub const ENEMY_ANIM_FRAMES: u32 = 4;
}

/// Clamp a vertical position into the lane band `[top, bottom]`
#[inline]
pub fn clamp_to_lane(y: f32, top: f32, bottom: f32) -> f32 {
    y.clamp(top, bottom)
}

/// Clamp a horizontal position into the level corridor `[0, length]`
#[inline]
pub fn clamp_to_level(x: f32, length: f32) -> f32 {
    x.clamp(0.0, length)
}

/// +1.0 when facing right, -1.0 otherwise
#[inline]
pub fn facing_sign(facing_right: bool) -> f32 {
    if facing_right { 1.0 } else { -1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_clamp() {
        assert_eq!(clamp_to_lane(10.0, 350.0, 430.0), 350.0);
        assert_eq!(clamp_to_lane(500.0, 350.0, 430.0), 430.0);
        assert_eq!(clamp_to_lane(400.0, 350.0, 430.0), 400.0);
    }

    #[test]
    fn test_level_clamp() {
        assert_eq!(clamp_to_level(-5.0, 3000.0), 0.0);
        assert_eq!(clamp_to_level(3100.0, 3000.0), 3000.0);
    }

    #[test]
    fn test_facing_sign() {
        assert_eq!(facing_sign(true), 1.0);
        assert_eq!(facing_sign(false), -1.0);
    }
}
