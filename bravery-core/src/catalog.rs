use serde::{Deserialize, Serialize};
use std::fmt;

use crate::allowlist::{HeroAllowList, ItemAllowList};
use crate::images::item_image_url;
use crate::raw::{first_non_empty, RawHero, RawId, RawItem};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Weapon,
    Spirit,
    Vitality,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Weapon, Slot::Spirit, Slot::Vitality];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Weapon => "weapon",
            Slot::Spirit => "spirit",
            Slot::Vitality => "vitality",
        }
    }

    /// Card tint as straight RGBA; every slot uses alpha 0.22.
    pub fn tint_rgba(self) -> [u8; 4] {
        const ALPHA: u8 = 56;
        match self {
            Slot::Weapon => [245, 158, 11, ALPHA],
            Slot::Vitality => [16, 185, 129, ALPHA],
            Slot::Spirit => [59, 130, 246, ALPHA],
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    /// The allow-listed name this entry was matched on.
    pub name: String,
    /// Upstream presentation name, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub slot: Slot,
    pub cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CatalogEntry {
    /// Name to show the user.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// The provided image, or the URL derived from slot and name.
    pub fn image_url(&self) -> Option<String> {
        match &self.image {
            Some(provided) => Some(provided.clone()),
            None => item_image_url(self.slot, &self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Hero {
    /// Single glyph shown in place of a missing icon.
    pub fn placeholder(&self) -> String {
        self.name
            .chars()
            .next()
            .or_else(|| self.id.chars().next())
            .map(String::from)
            .unwrap_or_default()
    }
}

/// The raw item records of one slot category, as returned by one upstream
/// endpoint.
#[derive(Debug, Clone)]
pub struct SlotRecords {
    pub slot: Slot,
    pub records: Vec<RawItem>,
}

/// Merge the per-slot raw records into allow-listed, costed catalog entries.
pub fn build_catalog(sources: Vec<SlotRecords>, allow: &ItemAllowList) -> Vec<CatalogEntry> {
    // Slot is not reliably present on upstream records, so stamp it from the
    // endpoint each record came from before merging.
    let tagged = sources
        .into_iter()
        .flat_map(|source| source.records.into_iter().map(move |raw| (source.slot, raw)));

    tagged
        .filter_map(|(slot, raw)| validate_item(slot, raw, allow))
        .collect()
}

fn validate_item(slot: Slot, raw: RawItem, allow: &ItemAllowList) -> Option<CatalogEntry> {
    let lookup = raw.lookup_name()?.to_string();
    let cost = allow.cost_of(&lookup)?;

    let display_name = first_non_empty(&[&raw.display_name, &raw.title])
        .filter(|label| *label != lookup)
        .map(str::to_string);
    let id = raw
        .id
        .map(RawId::into_string)
        .or_else(|| raw.class_name.clone().filter(|c| !c.is_empty()))
        .unwrap_or_else(|| lookup.clone());
    let description = raw
        .description
        .as_ref()
        .and_then(|d| d.text())
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let image = first_non_empty(&[&raw.image_webp, &raw.image]).map(str::to_string);

    Some(CatalogEntry {
        id,
        name: lookup,
        display_name,
        slot,
        cost,
        description,
        image,
    })
}

/// Heroes that passed the allow-list, in upstream order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    heroes: Vec<Hero>,
}

impl Roster {
    pub fn new(heroes: Vec<Hero>) -> Self {
        Self { heroes }
    }

    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn first(&self) -> Option<&Hero> {
        self.heroes.first()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.heroes.iter().map(|h| h.id.as_str())
    }

    /// Resolve a hero by id, or by name when no id matches.
    pub fn find(&self, key: &str) -> Option<&Hero> {
        self.heroes
            .iter()
            .find(|h| h.id == key)
            .or_else(|| self.heroes.iter().find(|h| h.name == key))
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}

pub fn build_roster(records: Vec<RawHero>, allow: &HeroAllowList) -> Roster {
    let mut heroes: Vec<Hero> = Vec::new();

    for raw in records {
        let Some(name) = raw.name.filter(|n| allow.contains(n)) else {
            continue;
        };
        let id = raw
            .id
            .map(RawId::into_string)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| name.clone());
        if heroes.iter().any(|h| h.id == id) {
            continue;
        }
        let icon = raw.images.as_ref().and_then(|images| {
            first_non_empty(&[&images.icon_hero_card_webp, &images.icon_hero_card])
                .map(str::to_string)
        });

        heroes.push(Hero { id, name, icon });
    }

    Roster::new(heroes)
}

/// Render a cost with thousands separators, e.g. `6,400`.
pub fn format_cost(cost: impl Into<u64>) -> String {
    let digits = cost.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
