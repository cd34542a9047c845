use thiserror::Error;
use url::Url;

use crate::{BraveryError, Result};

/// Query parameter carrying the active hero id.
pub const HERO_PARAM: &str = "hero";
pub const DEFAULT_SHARE_BASE: &str = "https://deadlock-bravery.app/";

pub fn parse_link(text: &str) -> Result<Url> {
    Url::parse(text.trim()).map_err(|source| BraveryError::InvalidLink {
        link: text.to_string(),
        source,
    })
}

/// The `hero` value of a link, if present and non-empty.
pub fn read_hero(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == HERO_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Same as [`read_hero`] on raw text; anything unparseable reads as no hero.
pub fn read_hero_from_str(text: &str) -> Option<String> {
    parse_link(text).ok().as_ref().and_then(read_hero)
}

/// Copy of `url` with `hero` set (first occurrence kept in place, duplicates
/// dropped) or removed. Other parameters keep their order.
pub fn with_hero(url: &Url, hero: Option<&str>) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut placed = false;

    for (key, value) in url.query_pairs() {
        if key == HERO_PARAM {
            if let (Some(hero), false) = (hero, placed) {
                pairs.push((HERO_PARAM.to_string(), hero.to_string()));
                placed = true;
            }
            continue;
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }
    if let (Some(hero), false) = (hero, placed) {
        pairs.push((HERO_PARAM.to_string(), hero.to_string()));
    }

    let mut out = url.clone();
    if pairs.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(pairs);
    }
    out
}

/// The session's current address. There is exactly one; every update replaces
/// it rather than stacking a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkState {
    current: Url,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_SHARE_BASE).expect("built-in share base is a valid URL"))
    }
}

impl LinkState {
    pub fn new(url: Url) -> Self {
        Self { current: url }
    }

    pub fn parse(text: &str) -> Result<Self> {
        parse_link(text).map(Self::new)
    }

    pub fn url(&self) -> &Url {
        &self.current
    }

    pub fn hero(&self) -> Option<String> {
        read_hero(&self.current)
    }

    /// Mirror the active hero into the address.
    pub fn sync(&mut self, hero: Option<&str>) {
        let next = with_hero(&self.current, hero);
        if next != self.current {
            tracing::debug!(link = %next, "rewrote share link");
            self.current = next;
        }
    }

    /// Absolute link for `hero`, leaving the current address alone.
    pub fn share_url(&self, hero: Option<&str>) -> Url {
        with_hero(&self.current, hero)
    }
}

#[derive(Debug, Clone, Copy, Error)]
#[error("clipboard is not available")]
pub struct ClipboardUnavailable;

/// Somewhere a link can be copied to.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> std::result::Result<(), ClipboardUnavailable>;
}

/// A clipboard that never works, for front ends without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn set_text(&mut self, _text: &str) -> std::result::Result<(), ClipboardUnavailable> {
        Err(ClipboardUnavailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The link is on the clipboard.
    Copied(String),
    /// Copying failed; show this text for the user to copy by hand.
    Manual(String),
}

impl CopyOutcome {
    pub fn link(&self) -> &str {
        match self {
            CopyOutcome::Copied(link) | CopyOutcome::Manual(link) => link,
        }
    }
}

pub fn copy_link(url: &Url, clipboard: &mut dyn Clipboard) -> CopyOutcome {
    let text = url.to_string();
    match clipboard.set_text(&text) {
        Ok(()) => CopyOutcome::Copied(text),
        Err(err) => {
            tracing::debug!(%err, "falling back to manual copy");
            CopyOutcome::Manual(text)
        }
    }
}
