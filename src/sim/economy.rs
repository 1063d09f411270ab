//! Shop upgrades and their cost curve

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{GameEvent, GameState, Player};
use crate::tuning::EconomyTuning;

/// Shop purchase failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("upgrade costs {cost} coins but only {balance} available")]
    InsufficientCoins { cost: u32, balance: u32 },
}

/// The three independent upgrade tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeSlot {
    Damage,
    Health,
    Speed,
}

impl UpgradeSlot {
    pub const ALL: [UpgradeSlot; 3] = [
        UpgradeSlot::Damage,
        UpgradeSlot::Health,
        UpgradeSlot::Speed,
    ];

    pub fn index(self) -> usize {
        match self {
            UpgradeSlot::Damage => 0,
            UpgradeSlot::Health => 1,
            UpgradeSlot::Speed => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Purchased levels per slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub damage: u32,
    pub health: u32,
    pub speed: u32,
}

impl UpgradeLevels {
    pub fn level(&self, slot: UpgradeSlot) -> u32 {
        match slot {
            UpgradeSlot::Damage => self.damage,
            UpgradeSlot::Health => self.health,
            UpgradeSlot::Speed => self.speed,
        }
    }

    fn level_mut(&mut self, slot: UpgradeSlot) -> &mut u32 {
        match slot {
            UpgradeSlot::Damage => &mut self.damage,
            UpgradeSlot::Health => &mut self.health,
            UpgradeSlot::Speed => &mut self.speed,
        }
    }
}

/// Price of the next level: base cost scaled by one plus the current level
pub fn upgrade_cost(economy: &EconomyTuning, slot: UpgradeSlot, level: u32) -> u32 {
    economy.base_cost[slot.index()].saturating_mul(level.saturating_add(1))
}

impl Player {
    /// Buy the next level of `slot`. Returns the price paid; a rejected
    /// purchase leaves the player untouched.
    pub fn purchase(
        &mut self,
        slot: UpgradeSlot,
        economy: &EconomyTuning,
    ) -> Result<u32, PurchaseError> {
        let cost = upgrade_cost(economy, slot, self.upgrades.level(slot));
        if self.coins < cost {
            return Err(PurchaseError::InsufficientCoins {
                cost,
                balance: self.coins,
            });
        }

        self.coins -= cost;
        *self.upgrades.level_mut(slot) += 1;
        match slot {
            UpgradeSlot::Damage => self.base_damage += economy.damage_bonus,
            UpgradeSlot::Health => {
                self.max_hp += economy.health_bonus;
                self.hp = self.max_hp;
            }
            UpgradeSlot::Speed => self.speed += economy.speed_bonus,
        }
        Ok(cost)
    }
}

impl GameState {
    /// Shop confirm: buy the highlighted slot, logging a refusal
    pub fn purchase_selected(&mut self) -> Result<u32, PurchaseError> {
        let slot = self.shop_selection;
        match self.player.purchase(slot, &self.tuning.economy) {
            Ok(cost) => {
                let level = self.player.upgrades.level(slot);
                log::info!("Bought {slot:?} level {level} for {cost} coins");
                self.events.push(GameEvent::UpgradePurchased { slot, level, cost });
                Ok(cost)
            }
            Err(err) => {
                log::debug!("Purchase refused: {err}");
                Err(err)
            }
        }
    }

    /// Cost of the next level for each slot, in slot order
    pub fn shop_prices(&self) -> [u32; 3] {
        UpgradeSlot::ALL.map(|slot| {
            upgrade_cost(&self.tuning.economy, slot, self.player.upgrades.level(slot))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PlayerClass;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn knight_with(coins: u32) -> (Player, Tuning) {
        let tuning = Tuning::default();
        let mut player = Player::new(PlayerClass::Knight, &tuning);
        player.coins = coins;
        (player, tuning)
    }

    #[test]
    fn test_cost_curve() {
        let economy = EconomyTuning::default();
        assert_eq!(upgrade_cost(&economy, UpgradeSlot::Damage, 0), 5);
        assert_eq!(upgrade_cost(&economy, UpgradeSlot::Damage, 1), 10);
        assert_eq!(upgrade_cost(&economy, UpgradeSlot::Speed, 4), 25);
    }

    #[test]
    fn test_damage_upgrade() {
        let (mut p, tuning) = knight_with(12);
        assert_eq!(p.purchase(UpgradeSlot::Damage, &tuning.economy), Ok(5));
        assert_eq!(p.coins, 7);
        assert_eq!(p.base_damage, 23);
        assert_eq!(p.upgrades.damage, 1);
        // Second level costs 10
        assert_eq!(
            p.purchase(UpgradeSlot::Damage, &tuning.economy),
            Err(PurchaseError::InsufficientCoins { cost: 10, balance: 7 })
        );
    }

    #[test]
    fn test_health_upgrade_full_heals() {
        let (mut p, tuning) = knight_with(5);
        p.hp = 40;
        p.purchase(UpgradeSlot::Health, &tuning.economy).unwrap();
        assert_eq!(p.max_hp, 185);
        assert_eq!(p.hp, 185);
    }

    #[test]
    fn test_speed_upgrade() {
        let (mut p, tuning) = knight_with(5);
        p.purchase(UpgradeSlot::Speed, &tuning.economy).unwrap();
        assert_eq!(p.speed, 200.0);
        assert_eq!(p.coins, 0);
    }

    #[test]
    fn test_rejected_purchase_leaves_state() {
        let (mut p, tuning) = knight_with(4);
        let before = p.clone();
        assert!(p.purchase(UpgradeSlot::Health, &tuning.economy).is_err());
        assert_eq!(p.coins, before.coins);
        assert_eq!(p.max_hp, before.max_hp);
        assert_eq!(p.upgrades, before.upgrades);
    }

    #[test]
    fn test_slot_cycle_wraps() {
        assert_eq!(UpgradeSlot::Speed.next(), UpgradeSlot::Damage);
        assert_eq!(UpgradeSlot::Damage.prev(), UpgradeSlot::Speed);
    }

    #[test]
    fn test_purchase_selected_emits_event() {
        let mut state = GameState::new(1, Tuning::default());
        state.start_run(PlayerClass::Mage);
        state.player.coins = 5;
        state.shop_selection = UpgradeSlot::Speed;
        assert_eq!(state.purchase_selected(), Ok(5));
        assert_eq!(
            state.events.last(),
            Some(&GameEvent::UpgradePurchased {
                slot: UpgradeSlot::Speed,
                level: 1,
                cost: 5
            })
        );
        assert_eq!(state.shop_prices(), [5, 5, 10]);
    }

    proptest! {
        #[test]
        fn cost_grows_with_level(level in 0u32..1000) {
            let economy = EconomyTuning::default();
            for slot in UpgradeSlot::ALL {
                let next = upgrade_cost(&economy, slot, level + 1);
                prop_assert!(next > upgrade_cost(&economy, slot, level));
            }
        }

        #[test]
        fn coins_never_go_negative(
            coins in 0u32..200,
            buys in proptest::collection::vec(0usize..3, 0..20),
        ) {
            let (mut p, tuning) = knight_with(coins);
            let mut spent = 0;
            for i in buys {
                if let Ok(cost) = p.purchase(UpgradeSlot::ALL[i], &tuning.economy) {
                    spent += cost;
                }
            }
            prop_assert_eq!(p.coins + spent, coins);
        }
    }
}
