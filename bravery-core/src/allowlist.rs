use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::Result;

#[derive(Copy, Clone, Debug)]
pub(crate) struct AllowedItem {
    pub name: &'static str,
    pub cost: Option<u32>,
}

const fn item(name: &'static str, cost: u32) -> AllowedItem {
    AllowedItem {
        name,
        cost: Some(cost),
    }
}

pub(crate) const ITEM_ALLOWLIST: &[AllowedItem] = &[
    // Weapon
    item("Close Quarters", 800),
    item("Extended Magazine", 800),
    item("Headshot Booster", 800),
    item("High-Velocity Rounds", 800),
    item("Monster Rounds", 800),
    item("Rapid Rounds", 800),
    item("Restorative Shot", 800),
    item("Active Reload", 1600),
    item("Berserker", 1600),
    item("Fleetfoot", 1600),
    item("Intensifying Magazine", 1600),
    item("Kinetic Dash", 1600),
    item("Long Range", 1600),
    item("Melee Charge", 1600),
    item("Mystic Shot", 1600),
    item("Opening Rounds", 1600),
    item("Slowing Bullets", 1600),
    item("Split Shot", 1600),
    item("Swift Striker", 1600),
    item("Titanic Magazine", 1600),
    item("Weakening Headshot", 1600),
    item("Alchemical Fire", 3200),
    item("Blood Tribute", 3200),
    item("Burst Fire", 3200),
    item("Escalating Resilience", 3200),
    item("Headhunter", 3200),
    item("Heroic Aura", 3200),
    item("Hunter's Aura", 3200),
    item("Point Blank", 3200),
    item("Pristine Emblem", 3200),
    item("Sharpshooter", 3200),
    item("Tesla Bullets", 3200),
    item("Toxic Bullets", 3200),
    item("Crippling Headshot", 6400),
    item("Frenzy", 6400),
    item("Glass Cannon", 6400),
    item("Lucky Shot", 6400),
    item("Ricochet", 6400),
    item("Shadow Weave", 6400),
    item("Silencer", 6400),
    item("Spiritual Overflow", 6400),
    item("Vampiric Burst", 6400),
    // Vitality
    item("Extra Health", 800),
    item("Extra Regen", 800),
    item("Extra Stamina", 800),
    item("Healbane", 800),
    item("Healing Rite", 800),
    item("Melee Lifesteal", 800),
    item("Sprint Boots", 800),
    item("Battle Vest", 1600),
    item("Bullet Lifesteal", 1600),
    item("Combat Barrier", 1600),
    item("Debuff Reducer", 1600),
    item("Enchanter's Emblem", 1600),
    item("Enduring Speed", 1600),
    item("Guardian Ward", 1600),
    item("Healing Booster", 1600),
    item("Reactive Barrier", 1600),
    item("Restorative Locket", 1600),
    item("Return Fire", 1600),
    item("Spirit Lifesteal", 1600),
    item("Spirit Shielding", 1600),
    item("Weapon Shielding", 1600),
    item("Bullet Resilience", 3200),
    item("Counterspell", 3200),
    item("Dispel Magic", 3200),
    item("Fortitude", 3200),
    item("Fury Trance", 3200),
    item("Lifestrike", 3200),
    item("Majestic Leap", 3200),
    item("Metal Skin", 3200),
    item("Rescue Beam", 3200),
    item("Spirit Resilience", 3200),
    item("Stamina Mastery", 3200),
    item("Veil Walker", 3200),
    item("Colossus", 6400),
    item("Diviner's Kevlar", 6400),
    item("Inhibitor", 6400),
    item("Juggernaut", 6400),
    item("Leech", 6400),
    item("Phantom Strike", 6400),
    item("Siphon Bullets", 6400),
    item("Soul Rebirth", 6400),
    item("Unstoppable", 6400),
    // Spirit
    item("Extra Charge", 800),
    item("Extra Spirit", 800),
    item("Infuser", 800),
    item("Mystic Burst", 800),
    item("Mystic Reach", 800),
    item("Mystic Regeneration", 800),
    item("Spirit Strike", 800),
    item("Bullet Resist Shredder", 1600),
    item("Cold Front", 1600),
    item("Compress Cooldown", 1600),
    item("Decay", 1600),
    item("Duration Extender", 1600),
    item("Improved Spirit", 1600),
    item("Mystic Slow", 1600),
    item("Mystic Vulnerability", 1600),
    item("Quicksilver Reload", 1600),
    item("Slowing Hex", 1600),
    item("Spirit Snatch", 1600),
    item("Suppressor", 1600),
    item("Ethereal Shift", 3200),
    item("Improved Burst", 3200),
    item("Improved Cooldown", 3200),
    item("Improved Reach", 3200),
    item("Knockdown", 3200),
    item("Rapid Recharge", 3200),
    item("Silence Glyph", 3200),
    item("Superior Duration", 3200),
    item("Surge of Power", 3200),
    item("Tankbuster", 3200),
    item("Torment Pulse", 3200),
    item("Arctic Blast", 6400),
    item("Boundless Spirit", 6400),
    item("Curse", 6400),
    item("Echo Shard", 6400),
    item("Escalating Exposure", 6400),
    item("Magic Carpet", 6400),
    item("Mystic Reverb", 6400),
    item("Refresher", 6400),
    item("Spellslinger", 6400),
    item("Transcendent Cooldown", 6400),
];

pub(crate) const HERO_ALLOWLIST: &[&str] = &[
    "Abrams",
    "Apollo",
    "Bebop",
    "Billy",
    "Calico",
    "Celeste",
    "The Doorman",
    "Drifter",
    "Dynamo",
    "Graves",
    "Grey Talon",
    "Haze",
    "Holliday",
    "Infernus",
    "Ivy",
    "Kelvin",
    "Lady Geist",
    "Lash",
    "McGinnis",
    "Mina",
    "Mirage",
    "Mo & Krill",
    "Paige",
    "Paradox",
    "Pocket",
    "Rem",
    "Seven",
    "Shiv",
    "Silver",
    "Sinclair",
    "Venator",
    "Victor",
    "Vindicta",
    "Viscous",
    "Vyper",
    "Warden",
    "Wraith",
];

/// One row of an item allow-list file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowListRow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
}

/// Item name to cost table. Names match exactly; a listed name without a cost
/// costs 0.
#[derive(Debug, Clone, Default)]
pub struct ItemAllowList {
    costs: HashMap<String, Option<u32>>,
}

impl ItemAllowList {
    pub fn builtin() -> Self {
        ITEM_ALLOWLIST
            .iter()
            .map(|w| (w.name.to_string(), w.cost))
            .collect()
    }

    /// Load a replacement table from a JSON array of `{"name", "cost"}` rows.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let rows: Vec<AllowListRow> = serde_json::from_str(data)?;
        Ok(rows.into_iter().map(|r| (r.name, r.cost)).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.costs.contains_key(name)
    }

    /// `None` when the name is not allowed at all.
    pub fn cost_of(&self, name: &str) -> Option<u32> {
        self.costs.get(name).map(|cost| cost.unwrap_or(0))
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

impl FromIterator<(String, Option<u32>)> for ItemAllowList {
    fn from_iter<I: IntoIterator<Item = (String, Option<u32>)>>(iter: I) -> Self {
        Self {
            costs: iter.into_iter().collect(),
        }
    }
}

/// Approved hero names.
#[derive(Debug, Clone, Default)]
pub struct HeroAllowList {
    names: HashSet<String>,
}

impl HeroAllowList {
    pub fn builtin() -> Self {
        HERO_ALLOWLIST.iter().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for HeroAllowList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_have_no_duplicate_names() {
        assert_eq!(ItemAllowList::builtin().len(), ITEM_ALLOWLIST.len());
        assert_eq!(HeroAllowList::builtin().len(), HERO_ALLOWLIST.len());
    }

    #[test]
    fn missing_cost_reads_as_zero() {
        let list = ItemAllowList::from_json_str(
            r#"[{"name": "Extra Health", "cost": 800}, {"name": "Mystery Box"}]"#,
        )
        .unwrap();
        assert_eq!(list.cost_of("Extra Health"), Some(800));
        assert_eq!(list.cost_of("Mystery Box"), Some(0));
        assert_eq!(list.cost_of("Unknown"), None);
    }

    #[test]
    fn names_match_exactly() {
        let list = ItemAllowList::builtin();
        assert!(list.contains("Spellslinger"));
        assert!(!list.contains("spellslinger"));
        assert!(!list.contains("Spellslinger "));

        let heroes = HeroAllowList::builtin();
        assert!(heroes.contains("Mo & Krill"));
        assert!(!heroes.contains("abrams"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(ItemAllowList::from_json_str(r#"{"name": "Extra Health"}"#).is_err());
    }
}
