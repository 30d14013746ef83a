//! Weapon system: definitions, traits and synergies, behaviors, and firing.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`registry`] | `WeaponDef`, `StatBlock`, the built-in `WeaponRegistry` |
//! | [`traits`] | `Trait`, `TraitFlags`, synergy pairs, effective-stat resolution |
//! | [`behavior`] | `Behavior` variants and `compute_emission` |
//! | [`fire`] | Per-tick cooldowns and emission spawning |

pub mod behavior;
pub mod fire;
pub mod registry;
pub mod traits;

pub use behavior::{Behavior, CountRule, EmitContext, Emission, SpreadRule};
pub use fire::weapon_fire_system;
pub use registry::{load_weapon_registry, StatBlock, WeaponDef, WeaponId, WeaponRegistry};
pub use traits::{
    cooldown_after_fire, effective_stats, EffectiveStats, SynergyBook, SynergyPair, Trait,
    TraitFlags,
};

use crate::state::TickSet;
use bevy::prelude::*;

/// A weapon the player owns.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedWeapon {
    pub id: WeaponId,
    pub level: u32,
    /// Ticks until the next fire.  Fires when this drops to zero or below.
    pub cooldown: f32,
    /// Ring rotation for orbit behaviors.
    pub phase: f32,
}

/// Owned weapons and unlocked synergies.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Arsenal {
    pub weapons: Vec<OwnedWeapon>,
    pub synergies: SynergyBook,
}

impl Arsenal {
    /// A fresh arsenal holding only `id` at level 1.
    pub fn starting(id: WeaponId) -> Self {
        let mut arsenal = Self::default();
        arsenal.grant(id);
        arsenal
    }

    /// 0 when not owned.
    pub fn level_of(&self, id: WeaponId) -> u32 {
        self.weapons
            .iter()
            .find(|w| w.id == id)
            .map_or(0, |w| w.level)
    }

    /// Unlock `id` at level 1 or raise its level.  Returns the new level.
    pub fn grant(&mut self, id: WeaponId) -> u32 {
        if let Some(owned) = self.weapons.iter_mut().find(|w| w.id == id) {
            owned.level += 1;
            return owned.level;
        }
        self.weapons.push(OwnedWeapon {
            id,
            level: 1,
            cooldown: 0.0,
            phase: 0.0,
        });
        1
    }

    pub fn owned_ids(&self) -> impl Iterator<Item = WeaponId> + '_ {
        self.weapons.iter().filter(|w| w.level > 0).map(|w| w.id)
    }

    /// `Σ level × magnet bonus` over owned weapons.
    pub fn magnet_bonus(&self, registry: &WeaponRegistry) -> f32 {
        self.weapons
            .iter()
            .filter_map(|w| {
                registry
                    .get(w.id)
                    .map(|def| w.level as f32 * def.magnet_bonus_per_level)
            })
            .sum()
    }

    pub fn clear(&mut self) {
        self.weapons.clear();
        self.synergies.clear();
    }
}

pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WeaponRegistry>()
            .init_resource::<Arsenal>()
            .add_systems(Update, weapon_fire_system.in_set(TickSet::Weapons));
    }
}
