use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

use crate::catalog::{Slot, SlotRecords};
use crate::raw::{decode_records, RawHero, RawItem};
use crate::{BraveryError, Result};

pub const DEFAULT_API_BASE: &str = "https://assets.deadlock-api.com";

/// Number of independent upstream requests made per load.
pub const SOURCE_COUNT: usize = Slot::ALL.len() + 1;

/// Failure of a single upstream request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// Anything that can serve the raw item and hero records.
pub trait AssetSource {
    fn fetch_items(
        &self,
        slot: Slot,
    ) -> impl Future<Output = std::result::Result<Vec<RawItem>, FetchError>>;

    fn fetch_heroes(&self) -> impl Future<Output = std::result::Result<Vec<RawHero>, FetchError>>;
}

/// HTTP client for the public Deadlock asset API.
pub struct AssetClient {
    client: Client,
    base_url: String,
}

impl AssetClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn items_url(&self, slot: Slot) -> String {
        format!("{}/v2/items/by-slot-type/{}", self.base_url, slot.as_str())
    }

    pub fn heroes_url(&self) -> String {
        format!("{}/v2/heroes", self.base_url)
    }

    async fn get_json(&self, url: String) -> std::result::Result<Value, FetchError> {
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status(),
            });
        }

        Ok(response.json().await?)
    }
}

impl AssetSource for AssetClient {
    async fn fetch_items(&self, slot: Slot) -> std::result::Result<Vec<RawItem>, FetchError> {
        let body = self.get_json(self.items_url(slot)).await?;
        Ok(decode_records(body, "items"))
    }

    async fn fetch_heroes(&self) -> std::result::Result<Vec<RawHero>, FetchError> {
        let body = self.get_json(self.heroes_url()).await?;
        Ok(decode_records(body, "heroes"))
    }
}

/// Raw records from one load. Failed sources are present but empty.
#[derive(Debug, Clone, Default)]
pub struct Upstream {
    pub items: Vec<SlotRecords>,
    pub heroes: Vec<RawHero>,
    pub failures: usize,
}

/// Run the four requests concurrently and join them. A failed source is
/// logged and contributes nothing; only when every source fails is the load
/// an error.
pub async fn fetch_upstream<S: AssetSource>(source: &S) -> Result<Upstream> {
    let (weapon, spirit, vitality, heroes) = tokio::join!(
        source.fetch_items(Slot::Weapon),
        source.fetch_items(Slot::Spirit),
        source.fetch_items(Slot::Vitality),
        source.fetch_heroes(),
    );

    let mut upstream = Upstream::default();
    let mut last_error = None;

    for (slot, result) in [
        (Slot::Weapon, weapon),
        (Slot::Spirit, spirit),
        (Slot::Vitality, vitality),
    ] {
        let records = match result {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(slot = %slot, error = %err, "item source failed");
                upstream.failures += 1;
                last_error = Some(err.to_string());
                Vec::new()
            }
        };
        upstream.items.push(SlotRecords { slot, records });
    }

    match heroes {
        Ok(heroes) => upstream.heroes = heroes,
        Err(err) => {
            tracing::warn!(error = %err, "hero source failed");
            upstream.failures += 1;
            last_error = Some(err.to_string());
        }
    }

    if upstream.failures == SOURCE_COUNT {
        return Err(BraveryError::AllSourcesFailed {
            total: SOURCE_COUNT,
            last: last_error.unwrap_or_default(),
        });
    }

    Ok(upstream)
}
