//! Frame timing and hitstop
//!
//! Real time always drains the hitstop countdown. Simulation time is zero
//! while hitstop is active, so impacts freeze the world without ever
//! extending their own freeze.

use serde::{Deserialize, Serialize};

/// Freeze-frame countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStop {
    remaining: f32,
}

impl HitStop {
    /// Raise the countdown to at least `duration` (never additive)
    pub fn request(&mut self, duration: f32) {
        self.remaining = self.remaining.max(duration);
    }

    /// Drain by a real delta and return the simulation delta for this frame
    pub fn advance(&mut self, real_dt: f32) -> f32 {
        self.remaining = (self.remaining - real_dt).max(0.0);
        if self.remaining > 0.0 { 0.0 } else { real_dt }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }
}

/// Clamp a raw delta into `[0, max_dt]`
#[inline]
pub fn clamp_frame_dt(raw_dt: f32, max_dt: f32) -> f32 {
    if raw_dt.is_finite() {
        raw_dt.clamp(0.0, max_dt)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sim_delta_frozen_while_active() {
        let mut hs = HitStop::default();
        assert_eq!(hs.advance(0.016), 0.016);

        hs.request(0.05);
        assert_eq!(hs.advance(0.016), 0.0);
        assert_eq!(hs.advance(0.016), 0.0);
        assert_eq!(hs.advance(0.016), 0.0);
        // 0.05 - 0.048 = 0.002 left, drained by this frame
        assert_eq!(hs.advance(0.016), 0.016);
        assert!(!hs.is_active());
    }

    #[test]
    fn test_request_is_max_not_add() {
        let mut hs = HitStop::default();
        hs.request(0.06);
        hs.request(0.03);
        assert_eq!(hs.remaining(), 0.06);
        hs.request(0.08);
        assert_eq!(hs.remaining(), 0.08);
    }

    #[test]
    fn test_countdown_uses_real_delta() {
        let mut hs = HitStop::default();
        hs.request(0.03);
        // sim delta is zero but the countdown still drains
        hs.advance(0.02);
        assert!((hs.remaining() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_frame_dt() {
        assert_eq!(clamp_frame_dt(0.2, 0.05), 0.05);
        assert_eq!(clamp_frame_dt(-1.0, 0.05), 0.0);
        assert_eq!(clamp_frame_dt(f32::NAN, 0.05), 0.0);
        assert_eq!(clamp_frame_dt(0.01, 0.05), 0.01);
    }

    proptest! {
        #[test]
        fn double_request_keeps_max(a in 0.0f32..1.0, b in 0.0f32..1.0) {
            let mut hs = HitStop::default();
            hs.request(a);
            hs.request(b);
            prop_assert_eq!(hs.remaining(), a.max(b));
        }

        #[test]
        fn sim_delta_is_zero_or_real(pending in 0.0f32..0.2, dt in 0.0f32..0.05) {
            let mut hs = HitStop::default();
            hs.request(pending);
            let sim = hs.advance(dt);
            prop_assert!(sim == 0.0 || sim == dt);
            prop_assert!(hs.remaining() >= 0.0);
        }
    }
}
