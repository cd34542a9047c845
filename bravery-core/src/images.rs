use crate::catalog::Slot;

pub const ITEM_IMAGE_BASE: &str =
    "https://assets-bucket.deadlock-api.com/assets-api-res/images/items";

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Normalise an item name into the asset bucket's file stem:
/// lowercase, possessive `'s` dropped, other apostrophes dropped, every run of
/// characters outside `[a-z0-9]` collapsed to `_`, and no leading or trailing
/// `_`.
pub fn slugify(name: &str) -> String {
    let chars: Vec<char> = name
        .to_lowercase()
        .chars()
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect();

    let mut stripped = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            let possessive = chars.get(i + 1) == Some(&'s')
                && !chars.get(i + 2).copied().is_some_and(is_word_char);
            i += if possessive { 2 } else { 1 };
            continue;
        }
        stripped.push(c);
        i += 1;
    }

    let mut slug = String::with_capacity(stripped.len());
    let mut in_gap = false;
    for c in stripped.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }

    slug.trim_matches('_').to_string()
}

/// Derive the small icon URL for an item that came without one. Returns `None`
/// for an empty name.
pub fn item_image_url(slot: Slot, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    let mut slug = slugify(name);
    // The bucket stores this one under a different spelling.
    if slug == "spellslinger" {
        slug = "spell_slinger".to_string();
    }

    Some(format!("{ITEM_IMAGE_BASE}/{}/{slug}_sm.png", slot.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_handles_punctuation_and_possessives() {
        assert_eq!(slugify("Extra Health"), "extra_health");
        assert_eq!(slugify("High-Velocity Rounds"), "high_velocity_rounds");
        assert_eq!(slugify("Hunter's Aura"), "hunter_aura");
        assert_eq!(slugify("Diviner\u{2019}s Kevlar"), "diviner_kevlar");
        assert_eq!(slugify("Mo & Krill"), "mo_krill");
        assert_eq!(slugify("  Rock'n'Roll!  "), "rocknroll");
        assert_eq!(slugify("It'sy"), "itsy");
    }

    #[test]
    fn derived_urls_are_stable() {
        assert_eq!(
            item_image_url(Slot::Vitality, "Enchanter's Emblem").as_deref(),
            Some("https://assets-bucket.deadlock-api.com/assets-api-res/images/items/vitality/enchanter_emblem_sm.png")
        );
        assert_eq!(
            item_image_url(Slot::Spirit, "Spellslinger").as_deref(),
            Some("https://assets-bucket.deadlock-api.com/assets-api-res/images/items/spirit/spell_slinger_sm.png")
        );
        assert_eq!(item_image_url(Slot::Weapon, ""), None);
    }
}
