//! Sound triggers
//!
//! The simulation never plays audio itself. It emits `SoundEffect` ids as
//! events; the presentation layer forwards them to whatever backend it owns.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Knight melee swing
    KnightSwing,
    /// Rogue melee swing
    RogueSwing,
    /// Mage projectile cast
    MageCast,
    /// Player attack connects with an enemy
    Hit,
    /// Enemy strike lands on the player
    EnemySwing,
    /// Knight raises the guard, or a strike is blocked
    Block,
    /// Rogue dash
    Dodge,
    /// Mage teleport
    Blink,
}

impl SoundEffect {
    /// Asset-style identifier for the presentation layer
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::KnightSwing => "sfx_knight_swing",
            SoundEffect::RogueSwing => "sfx_rogue_swing",
            SoundEffect::MageCast => "sfx_mage_cast",
            SoundEffect::Hit => "sfx_hit",
            SoundEffect::EnemySwing => "sfx_enemy_swing",
            SoundEffect::Block => "sfx_block",
            SoundEffect::Dodge => "sfx_dodge",
            SoundEffect::Blink => "sfx_blink",
        }
    }
}

/// Fire-and-forget playback implemented by the presentation layer
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Recording sink
impl AudioSink for Vec<SoundEffect> {
    fn play(&mut self, effect: SoundEffect) {
        self.push(effect);
    }
}

/// Sink that only logs, used by the headless runner
#[derive(Debug, Default)]
pub struct LogSink {
    pub played: u64,
}

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect) {
        self.played += 1;
        log::trace!("play {}", effect.as_str());
    }
}

/// Forward every sound trigger in a frame's events to `sink`, once each
pub fn dispatch_sounds<S: AudioSink + ?Sized>(events: &[GameEvent], sink: &mut S) {
    for event in events {
        if let GameEvent::Sound(effect) = event {
            sink.play(*effect);
        }
    }
}
