//! Static weapon definitions.
//!
//! A [`WeaponRegistry`] is a flat list of [`WeaponDef`]s; a [`WeaponId`] is an
//! index into it.  The built-in registry carries the ten default weapons and
//! can be replaced wholesale by a `[[weapons]]` TOML document.

use super::behavior::{Behavior, CountRule, SpreadRule};
use super::traits::Trait;
use crate::error::{ArenaError, ArenaResult};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Index of a definition inside the [`WeaponRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WeaponId(pub usize);

/// Base numbers of a weapon.  Every field is optional in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    /// Ticks between fires at level 0 with neutral multipliers.
    pub cooldown: f32,
    pub damage: f32,
    pub speed: f32,
    /// Ticks an emitted entity lives.
    pub lifetime: u32,
    /// Base count; every point above 1 adds one emission.
    pub count: u32,
    pub spread: f32,
    pub area: f32,
    /// Emission radius; bolt behaviors fall back to their own default.
    pub radius: Option<f32>,
    pub pierce: u32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            cooldown: 60.0,
            damage: 0.0,
            speed: 0.0,
            lifetime: 60,
            count: 1,
            spread: 0.0,
            area: 0.0,
            radius: None,
            pierce: 0,
        }
    }
}

/// One weapon as it appears in the registry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeaponDef {
    /// Stable identifier used in configs and events.
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    /// Presentation colour tag.
    #[serde(default)]
    pub color: String,
    #[serde(rename = "trait")]
    pub base_trait: Trait,
    #[serde(default)]
    pub stats: StatBlock,
    pub behavior: Behavior,
    /// Magnet radius bonus per owned level, as a fraction of the base radius.
    #[serde(default)]
    pub magnet_bonus_per_level: f32,
    #[serde(default)]
    pub max_level: Option<u32>,
}

impl WeaponDef {
    /// `true` when a weapon at `level` may still be offered.
    pub fn can_level_past(&self, level: u32) -> bool {
        self.max_level.map_or(true, |max| level < max)
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    weapons: Vec<WeaponDef>,
}

/// Every weapon the run can offer.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WeaponRegistry {
    weapons: Vec<WeaponDef>,
}

impl Default for WeaponRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WeaponRegistry {
    pub fn new(weapons: Vec<WeaponDef>) -> Self {
        Self { weapons }
    }

    pub fn get(&self, id: WeaponId) -> Option<&WeaponDef> {
        self.weapons.get(id.0)
    }

    pub fn find(&self, key: &str) -> Option<WeaponId> {
        self.weapons.iter().position(|w| w.key == key).map(WeaponId)
    }

    /// Like [`find`](Self::find) but reports a missing key as an error.
    pub fn require(&self, key: &str) -> ArenaResult<WeaponId> {
        self.find(key).ok_or_else(|| ArenaError::UnknownWeapon {
            key: key.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeaponId, &WeaponDef)> {
        self.weapons
            .iter()
            .enumerate()
            .map(|(i, def)| (WeaponId(i), def))
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Parse a `[[weapons]]` TOML document.
    pub fn from_toml_str(contents: &str, origin: &str) -> ArenaResult<Self> {
        let file: RegistryFile = toml::from_str(contents).map_err(|e| ArenaError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        let registry = Self::new(file.weapons);
        registry.validate()?;
        Ok(registry)
    }

    /// Reject count rules that would divide by zero.
    pub fn validate(&self) -> ArenaResult<()> {
        for def in &self.weapons {
            if let Some(rule) = def.behavior.count_rule() {
                if rule.per_levels == 0 {
                    return Err(ArenaError::UnsafeTunable {
                        name: "per_levels",
                        value: 0.0,
                        safe_range: "[1, ∞)",
                    });
                }
            }
        }
        Ok(())
    }

    /// The ten default weapons.
    pub fn builtin() -> Self {
        let volley = |base, per_levels, spread, homing, pierce| Behavior::Volley {
            count: CountRule::new(base, per_levels),
            spread,
            homing,
            pierce,
        };

        Self::new(vec![
            WeaponDef {
                key: "content".into(),
                name: "Content Marketing".into(),
                icon: "📄".into(),
                description: "Fires documents at the nearest hostile. More documents and damage per level.".into(),
                color: "#facc15".into(),
                base_trait: Trait::Rapid,
                stats: StatBlock {
                    cooldown: 40.0,
                    damage: 10.0,
                    speed: 6.0,
                    lifetime: 60,
                    count: 1,
                    spread: 0.2,
                    ..Default::default()
                },
                behavior: volley(0, 1, SpreadRule::Additive(0.2), false, None),
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "viral".into(),
                name: "Viral Spread".into(),
                icon: "💣".into(),
                description: "Lobs a viral bomb that bursts where it lands.".into(),
                color: "#a855f7".into(),
                base_trait: Trait::Explosive,
                stats: StatBlock {
                    cooldown: 120.0,
                    damage: 40.0,
                    speed: 4.0,
                    lifetime: 60,
                    area: 150.0,
                    radius: Some(15.0),
                    ..Default::default()
                },
                behavior: Behavior::Throw {
                    count: CountRule::new(0, 1),
                },
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "funnel".into(),
                name: "Sales Funnel".into(),
                icon: "🌪️".into(),
                description: "Drops burning vortices near the player. Also widens the pickup magnet.".into(),
                color: "#ef4444".into(),
                base_trait: Trait::Zone,
                stats: StatBlock {
                    cooldown: 180.0,
                    damage: 5.0,
                    lifetime: 180,
                    area: 60.0,
                    ..Default::default()
                },
                behavior: Behavior::Field {
                    count: CountRule::new(1, 2),
                },
                magnet_bonus_per_level: 0.1,
                max_level: None,
            },
            WeaponDef {
                key: "newsletter".into(),
                name: "Newsletter Blast".into(),
                icon: "✉️".into(),
                description: "Sprays a fan of e-mails forward. More e-mails per level.".into(),
                color: "#10b981".into(),
                base_trait: Trait::Spread,
                stats: StatBlock {
                    cooldown: 60.0,
                    damage: 8.0,
                    speed: 5.0,
                    lifetime: 50,
                    count: 3,
                    spread: 0.8,
                    ..Default::default()
                },
                behavior: volley(3, 1, SpreadRule::Additive(0.8), false, None),
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "seo".into(),
                name: "SEO Crawler".into(),
                icon: "🕷️".into(),
                description: "Summons crawlers that hunt and bite hostiles.".into(),
                color: "#22d3ee".into(),
                base_trait: Trait::Minion,
                stats: StatBlock {
                    cooldown: 300.0,
                    damage: 5.0,
                    speed: 3.0,
                    lifetime: 600,
                    count: 2,
                    ..Default::default()
                },
                behavior: Behavior::Summon {
                    count: CountRule::new(2, 1),
                },
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "cold_call".into(),
                name: "Cold Call".into(),
                icon: "📞".into(),
                description: "Locks a beam onto the nearest hostiles. More targets per level.".into(),
                color: "#fca5a5".into(),
                base_trait: Trait::Lockon,
                stats: StatBlock {
                    cooldown: 120.0,
                    damage: 8.0,
                    lifetime: 30,
                    ..Default::default()
                },
                behavior: Behavior::Beam {
                    count: CountRule::new(0, 1),
                },
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "hashtag".into(),
                name: "Trending Hashtag".into(),
                icon: "#️⃣".into(),
                description: "Hashtags circle the player as a shield.".into(),
                color: "#f0abfc".into(),
                base_trait: Trait::Orbit,
                stats: StatBlock {
                    cooldown: 1.0,
                    damage: 5.0,
                    speed: 1.0,
                    lifetime: 2,
                    area: 90.0,
                    ..Default::default()
                },
                behavior: Behavior::Orbit {
                    count: CountRule::new(1, 1),
                },
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "blog_post".into(),
                name: "Long-form Post".into(),
                icon: "📖".into(),
                description: "Launches a giant book that plows through every hostile in its path.".into(),
                color: "#3b82f6".into(),
                base_trait: Trait::Heavy,
                stats: StatBlock {
                    cooldown: 100.0,
                    damage: 30.0,
                    speed: 3.0,
                    lifetime: 90,
                    radius: Some(20.0),
                    ..Default::default()
                },
                behavior: volley(1, 5, SpreadRule::Fixed(0.1), false, Some(999)),
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "pixel".into(),
                name: "Tracking Pixel".into(),
                icon: "👁️".into(),
                description: "Fires eyes that curve toward hostiles.".into(),
                color: "#4ade80".into(),
                base_trait: Trait::Homing,
                stats: StatBlock {
                    cooldown: 60.0,
                    damage: 5.0,
                    speed: 7.0,
                    lifetime: 120,
                    count: 2,
                    ..Default::default()
                },
                behavior: volley(2, 1, SpreadRule::Fixed(0.3), true, None),
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
            WeaponDef {
                key: "kol".into(),
                name: "Influencer Aura".into(),
                icon: "✨".into(),
                description: "A damaging aura that follows the player. Grows with each level.".into(),
                color: "#ec4899".into(),
                base_trait: Trait::Aura,
                stats: StatBlock {
                    cooldown: 1.0,
                    damage: 0.5,
                    lifetime: 1,
                    area: 60.0,
                    ..Default::default()
                },
                behavior: Behavior::Aura,
                magnet_bonus_per_level: 0.0,
                max_level: None,
            },
        ])
    }
}

/// Load a registry file, falling back to the built-in weapons.
pub fn load_weapon_registry(path: &str) -> WeaponRegistry {
    if !std::path::Path::new(path).exists() {
        return WeaponRegistry::builtin();
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| ArenaError::ConfigRead {
            path: path.to_string(),
            message: e.to_string(),
        })
        .and_then(|contents| WeaponRegistry::from_toml_str(&contents, path));
    match parsed {
        Ok(registry) => {
            info!("Loaded {} weapons from {path}", registry.len());
            registry
        }
        Err(e) => {
            warn!("{e}; using built-in weapons");
            WeaponRegistry::builtin()
        }
    }
}
