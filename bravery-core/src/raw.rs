use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Upstream ids arrive as numbers for most records but as strings for some.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// Read an id without failing the record: negative integers keep their
/// decimal form, anything else that is not a string or an integer reads as
/// missing so the usual fallbacks apply.
fn lenient_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<RawId>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(n), _) => Some(RawId::Number(n)),
            (None, Some(n)) => Some(RawId::Text(n.to_string())),
            _ => None,
        },
        Value::String(s) => Some(RawId::Text(s)),
        _ => None,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDescription {
    Text(String),
    Detailed { desc: Option<String> },
}

impl RawDescription {
    pub fn text(&self) -> Option<&str> {
        match self {
            RawDescription::Text(s) => Some(s.as_str()),
            RawDescription::Detailed { desc } => desc.as_deref(),
        }
    }
}

/// An item record as served by the asset provider. Every field is optional;
/// validation into a [`crate::CatalogEntry`] happens in the catalog builder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<RawId>,
    pub class_name: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<RawDescription>,
    pub image: Option<String>,
    pub image_webp: Option<String>,
}

impl RawItem {
    /// The name used for allow-list matching: `name`, or `displayName` when
    /// `name` is missing or empty.
    pub fn lookup_name(&self) -> Option<&str> {
        first_non_empty(&[&self.name, &self.display_name])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHeroImages {
    pub icon_hero_card_webp: Option<String>,
    pub icon_hero_card: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHero {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub images: Option<RawHeroImages>,
}

pub(crate) fn first_non_empty<'a>(fields: &[&'a Option<String>]) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|f| f.as_deref())
        .find(|s| !s.is_empty())
}

/// Decode a response body that is either a bare array of records or an object
/// carrying the array under `field`. Records that do not decode are skipped;
/// any other body shape yields no records.
pub fn decode_records<T: DeserializeOwned>(body: Value, field: &str) -> Vec<T> {
    let list = match body {
        Value::Array(list) => list,
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let total = list.len();
    let records: Vec<T> = list
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    if records.len() != total {
        tracing::debug!(
            skipped = total - records.len(),
            field,
            "skipped undecodable upstream records"
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_array_and_wrapped_object() {
        let bare: Vec<RawItem> = decode_records(json!([{ "name": "Extra Health" }]), "items");
        let wrapped: Vec<RawItem> =
            decode_records(json!({ "items": [{ "name": "Extra Health" }] }), "items");
        assert_eq!(bare.len(), 1);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].name.as_deref(), Some("Extra Health"));
    }

    #[test]
    fn unexpected_shapes_decode_to_nothing() {
        let wrong_field: Vec<RawItem> = decode_records(json!({ "heroes": [{}] }), "items");
        let scalar: Vec<RawItem> = decode_records(json!("oops"), "items");
        assert!(wrong_field.is_empty());
        assert!(scalar.is_empty());
    }

    #[test]
    fn bad_records_are_skipped_individually() {
        let items: Vec<RawItem> = decode_records(
            json!([{ "name": "Extra Health" }, { "name": 42 }, "junk", { "displayName": "Decay" }]),
            "items",
        );
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn ids_may_be_numbers_or_strings() {
        let heroes: Vec<RawHero> =
            decode_records(json!([{ "id": 6, "name": "Abrams" }, { "id": "ivy", "name": "Ivy" }]), "heroes");
        assert_eq!(heroes[0].id.clone().map(RawId::into_string).as_deref(), Some("6"));
        assert_eq!(heroes[1].id.clone().map(RawId::into_string).as_deref(), Some("ivy"));
    }

    #[test]
    fn odd_ids_do_not_drop_the_record() {
        let items: Vec<RawItem> = decode_records(
            json!([
                { "id": -3, "name": "Extra Health" },
                { "id": 1.5, "class_name": "upgrade_decay", "name": "Decay" },
                { "id": null, "name": "Free Sample" },
                { "id": { "nested": true }, "name": "Mystic Reach" }
            ]),
            "items",
        );
        let ids: Vec<_> = items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(
            ids,
            vec![Some(RawId::Text("-3".to_string())), None, None, None]
        );
        assert_eq!(items[1].class_name.as_deref(), Some("upgrade_decay"));
    }

    #[test]
    fn lookup_name_skips_empty_name() {
        let item = RawItem {
            name: Some(String::new()),
            display_name: Some("Decay".to_string()),
            ..RawItem::default()
        };
        assert_eq!(item.lookup_name(), Some("Decay"));
    }

    #[test]
    fn description_accepts_both_forms() {
        let items: Vec<RawItem> = decode_records(
            json!([
                { "name": "A", "description": { "desc": "burns" } },
                { "name": "B", "description": "plain" }
            ]),
            "items",
        );
        assert_eq!(items[0].description.as_ref().and_then(|d| d.text()), Some("burns"));
        assert_eq!(items[1].description.as_ref().and_then(|d| d.text()), Some("plain"));
    }
}
