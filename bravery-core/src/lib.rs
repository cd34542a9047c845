use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub mod allowlist;
pub mod catalog;
pub mod draw;
pub mod fetch;
pub mod images;
pub mod link;
pub mod pool;
pub mod raw;
mod session;

pub use allowlist::{HeroAllowList, ItemAllowList};
pub use catalog::{build_catalog, build_roster, format_cost, CatalogEntry, Hero, Roster, Slot};
pub use draw::{Draw, DrawError, DrawResult, DRAW_SIZE, UNLOCKED_SLOTS};
pub use fetch::{AssetClient, AssetSource, DEFAULT_API_BASE};
pub use link::{Clipboard, ClipboardUnavailable, CopyOutcome, LinkState, NoClipboard};
pub use pool::HeroPool;
pub use session::{Assets, Session};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BraverySettings {
    /// Fixed seed for reproducible draws; entropy when unset.
    pub seed: Option<u64>,
    pub api_base_url: String,
    /// Address share links are built on.
    pub share_base_url: String,
    /// Replaces the built-in item cost table when set.
    pub item_allowlist_path: Option<PathBuf>,
    /// Link the session opens at, e.g. one somebody shared.
    pub link: Option<String>,
}

impl Default for BraverySettings {
    fn default() -> Self {
        Self {
            seed: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
            share_base_url: link::DEFAULT_SHARE_BASE.to_string(),
            item_allowlist_path: None,
            link: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BraveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("all {total} asset sources failed (last error: {last})")]
    AllSourcesFailed { total: usize, last: String },
    #[error("invalid link '{link}': {source}")]
    InvalidLink {
        link: String,
        #[source]
        source: url::ParseError,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BraveryError>;

pub fn load_item_allowlist(settings: &BraverySettings) -> Result<ItemAllowList> {
    match &settings.item_allowlist_path {
        Some(path) => {
            let list = ItemAllowList::from_json_file(path)?;
            if list.is_empty() {
                return Err(BraveryError::Config(format!(
                    "Item allow-list is empty: {}",
                    path.display()
                )));
            }
            tracing::info!(path = %path.display(), items = list.len(), "loaded item allow-list");
            Ok(list)
        }
        None => Ok(ItemAllowList::builtin()),
    }
}

/// The link a session starts at. A shared link that does not parse is ignored
/// in favour of the share base, which must parse.
pub fn initial_link(settings: &BraverySettings) -> Result<LinkState> {
    if let Some(text) = &settings.link {
        match LinkState::parse(text) {
            Ok(link) => return Ok(link),
            Err(err) => tracing::warn!(%err, "ignoring shared link"),
        }
    }

    LinkState::parse(&settings.share_base_url).map_err(|_| {
        BraveryError::Config(format!(
            "Share base is not an absolute URL: {}",
            settings.share_base_url
        ))
    })
}

/// Fetch everything upstream and build the catalog and roster.
pub async fn load_assets(settings: &BraverySettings) -> Result<Assets> {
    let items_allow = load_item_allowlist(settings)?;
    let heroes_allow = HeroAllowList::builtin();

    let client = AssetClient::new(&settings.api_base_url);
    let upstream = fetch::fetch_upstream(&client).await?;
    if upstream.failures > 0 {
        tracing::warn!(
            failed = upstream.failures,
            total = fetch::SOURCE_COUNT,
            "continuing with partial assets"
        );
    }

    let catalog = build_catalog(upstream.items, &items_allow);
    let roster = build_roster(upstream.heroes, &heroes_allow);
    Ok(Assets { catalog, roster })
}

/// Start a session at the configured link and install freshly loaded assets.
pub async fn load_session(settings: &BraverySettings) -> Result<Session> {
    let mut session = Session::start(initial_link(settings)?, settings.seed);
    let assets = load_assets(settings).await?;
    session.install(assets);
    Ok(session)
}
