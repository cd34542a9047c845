use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::{CatalogEntry, Hero, Roster};
use crate::draw::{draw, draw_items, Draw, DrawError, DrawResult};
use crate::link::{copy_link, Clipboard, CopyOutcome, LinkState};
use crate::pool::HeroPool;

/// Catalog and roster produced by one load. Immutable once installed.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    pub catalog: Vec<CatalogEntry>,
    pub roster: Roster,
}

/// Everything one user session holds: the loaded assets, the hero pool, the
/// active hero, the latest draw and the share link.
///
/// The active hero and the link never disagree: every change to the active
/// hero goes through [`Session::set_active_hero`], which rewrites the link.
pub struct Session {
    assets: Assets,
    roster_seen: bool,
    pool: HeroPool,
    active: Option<String>,
    last_draw: Option<DrawResult>,
    link: LinkState,
    rng: StdRng,
}

impl Session {
    /// Begin a session at `link`. The `hero` parameter is read here and only
    /// here; whether it names a real hero is not checked until display.
    pub fn start(link: LinkState, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let active = link.hero();

        let mut session = Self {
            assets: Assets::default(),
            roster_seen: false,
            pool: HeroPool::new(),
            active: None,
            last_draw: None,
            link,
            rng,
        };
        session.set_active_hero(active);
        session
    }

    /// Install freshly loaded assets. The first time a roster arrives an empty
    /// pool is filled with every hero, and the first hero becomes active if
    /// none is.
    pub fn install(&mut self, assets: Assets) {
        tracing::info!(
            items = assets.catalog.len(),
            heroes = assets.roster.len(),
            "installed assets"
        );
        self.assets = assets;

        if self.roster_seen {
            return;
        }
        self.roster_seen = true;

        if self.pool.is_empty() {
            self.pool.select_all(&self.assets.roster);
            if self.active.is_none() {
                let first = self.assets.roster.first().map(|h| h.id.clone());
                self.set_active_hero(first);
            }
        }
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.assets.catalog
    }

    pub fn roster(&self) -> &Roster {
        &self.assets.roster
    }

    pub fn pool(&self) -> &HeroPool {
        &self.pool
    }

    pub fn select_all(&mut self) {
        self.pool.select_all(&self.assets.roster);
    }

    pub fn deselect_all(&mut self) {
        self.pool.deselect_all();
    }

    pub fn toggle(&mut self, id: &str) {
        self.pool.toggle(id);
    }

    pub fn active_hero_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active hero's roster record, if the active id resolves to one.
    pub fn active_hero(&self) -> Option<&Hero> {
        self.active
            .as_deref()
            .and_then(|key| self.assets.roster.find(key))
    }

    pub fn set_active_hero(&mut self, hero: Option<String>) {
        self.link.sync(hero.as_deref());
        self.active = hero;
    }

    /// Pick the displayed hero directly instead of drawing one.
    pub fn choose_hero(&mut self, id: &str) {
        self.set_active_hero(Some(id.to_string()));
    }

    /// Draw a hero from the pool and a fresh set of items. On error nothing
    /// changes.
    pub fn randomize(&mut self) -> Result<&DrawResult, DrawError> {
        let Draw { hero, items } = draw(&self.assets.catalog, &self.pool, &mut self.rng)?;
        self.set_active_hero(Some(hero));
        Ok(&*self.last_draw.insert(items))
    }

    /// Draw a fresh set of items for the active hero without touching the
    /// hero or the link. On error nothing changes.
    pub fn reroll_items(&mut self) -> Result<&DrawResult, DrawError> {
        if self.assets.catalog.is_empty() {
            return Err(DrawError::EmptyCatalog);
        }
        let items = draw_items(&self.assets.catalog, &mut self.rng);
        tracing::debug!(hero = ?self.active, items = items.len(), "rerolled items");
        Ok(&*self.last_draw.insert(items))
    }

    pub fn last_draw(&self) -> Option<&DrawResult> {
        self.last_draw.as_ref()
    }

    pub fn link(&self) -> &LinkState {
        &self.link
    }

    /// Treat `link` like a fresh load on top of the already fetched assets:
    /// the pool resets to every hero and the active hero comes from the link,
    /// or the first hero when the link has none.
    pub fn open_link(&mut self, link: LinkState) {
        let hero = link.hero();
        self.link = link;
        self.last_draw = None;
        self.pool.deselect_all();
        self.active = None;
        self.set_active_hero(hero);

        self.roster_seen = false;
        let assets = std::mem::take(&mut self.assets);
        self.install(assets);
    }

    pub fn copy_link(&self, clipboard: &mut dyn Clipboard) -> CopyOutcome {
        let url = self.link.share_url(self.active.as_deref());
        copy_link(&url, clipboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Slot;
    use crate::link::NoClipboard;

    fn hero(name: &str) -> Hero {
        Hero {
            id: name.to_string(),
            name: name.to_string(),
            icon: None,
        }
    }

    fn assets() -> Assets {
        Assets {
            catalog: (0..15)
                .map(|i| CatalogEntry {
                    id: i.to_string(),
                    name: format!("Item {i}"),
                    display_name: None,
                    slot: Slot::ALL[i % 3],
                    cost: 800,
                    description: None,
                    image: None,
                })
                .collect(),
            roster: Roster::new(vec![hero("Abrams"), hero("Ivy"), hero("Wraith")]),
        }
    }

    fn base_link() -> LinkState {
        LinkState::parse("https://deadlock-bravery.app/").unwrap()
    }

    #[test]
    fn first_roster_fills_pool_and_picks_first_hero() {
        let mut session = Session::start(base_link(), Some(1));
        assert_eq!(session.active_hero_id(), None);

        session.install(assets());
        assert_eq!(session.pool().len(), 3);
        assert_eq!(session.active_hero_id(), Some("Abrams"));
        assert_eq!(session.link().hero().as_deref(), Some("Abrams"));
    }

    #[test]
    fn link_hero_survives_bootstrap() {
        let link = LinkState::parse("https://deadlock-bravery.app/?hero=Ivy").unwrap();
        let mut session = Session::start(link, Some(1));
        assert_eq!(session.active_hero_id(), Some("Ivy"));

        session.install(assets());
        assert_eq!(session.active_hero_id(), Some("Ivy"));
        assert_eq!(session.active_hero().map(|h| h.name.as_str()), Some("Ivy"));
    }

    #[test]
    fn unknown_link_hero_is_tolerated() {
        let link = LinkState::parse("https://deadlock-bravery.app/?hero=Nobody").unwrap();
        let mut session = Session::start(link, Some(1));
        session.install(assets());
        assert_eq!(session.active_hero_id(), Some("Nobody"));
        assert!(session.active_hero().is_none());
    }

    #[test]
    fn bootstrap_happens_once() {
        let mut session = Session::start(base_link(), Some(1));
        session.install(assets());
        session.deselect_all();
        session.install(assets());
        assert!(session.pool().is_empty());
    }

    #[test]
    fn randomize_updates_hero_and_link() {
        let mut session = Session::start(base_link(), Some(42));
        session.install(assets());
        session.deselect_all();
        session.toggle("Wraith");

        let drawn = session.randomize().unwrap().len();
        assert_eq!(drawn, 12);
        assert_eq!(session.active_hero_id(), Some("Wraith"));
        assert_eq!(
            session.link().url().as_str(),
            "https://deadlock-bravery.app/?hero=Wraith"
        );
    }

    #[test]
    fn empty_pool_leaves_everything_alone() {
        let mut session = Session::start(base_link(), Some(42));
        session.install(assets());
        session.randomize().unwrap();
        let before_hero = session.active_hero_id().map(str::to_string);
        let before_draw = session.last_draw().cloned();

        session.deselect_all();
        assert_eq!(session.randomize(), Err(DrawError::EmptyPool));
        assert_eq!(session.active_hero_id(), before_hero.as_deref());
        assert_eq!(session.last_draw().cloned(), before_draw);
    }

    #[test]
    fn empty_catalog_is_reported() {
        let mut session = Session::start(base_link(), Some(42));
        session.install(Assets {
            catalog: Vec::new(),
            roster: Roster::new(vec![hero("Abrams")]),
        });
        assert_eq!(session.randomize(), Err(DrawError::EmptyCatalog));
        assert!(session.last_draw().is_none());
    }

    #[test]
    fn choosing_a_hero_rewrites_the_link() {
        let mut session = Session::start(base_link(), Some(1));
        session.install(assets());
        session.choose_hero("Ivy");
        assert_eq!(session.link().hero().as_deref(), Some("Ivy"));

        session.set_active_hero(None);
        assert_eq!(session.link().url().as_str(), "https://deadlock-bravery.app/");
    }

    #[test]
    fn chosen_hero_keeps_a_fresh_item_draw() {
        let mut session = Session::start(base_link(), Some(3));
        session.install(assets());
        session.choose_hero("Ivy");

        let items = session.reroll_items().unwrap().clone();
        assert_eq!(items.len(), 12);
        assert_eq!(items.locked().len(), 3);
        assert_eq!(session.active_hero_id(), Some("Ivy"));
        assert_eq!(session.link().hero().as_deref(), Some("Ivy"));
        assert_eq!(session.last_draw(), Some(&items));
    }

    #[test]
    fn item_reroll_ignores_an_empty_pool() {
        let mut session = Session::start(base_link(), Some(3));
        session.install(assets());
        session.deselect_all();
        assert_eq!(session.reroll_items().map(|d| d.len()), Ok(12));
    }

    #[test]
    fn item_reroll_reports_an_empty_catalog() {
        let mut session = Session::start(base_link(), Some(3));
        session.install(Assets {
            catalog: Vec::new(),
            roster: Roster::new(vec![hero("Abrams")]),
        });
        assert_eq!(session.reroll_items(), Err(DrawError::EmptyCatalog));
        assert!(session.last_draw().is_none());
    }

    #[test]
    fn opening_a_link_acts_like_a_reload() {
        let mut session = Session::start(base_link(), Some(1));
        session.install(assets());
        session.deselect_all();
        session.randomize().unwrap_err();

        session.open_link(LinkState::parse("https://deadlock-bravery.app/?hero=Wraith").unwrap());
        assert_eq!(session.active_hero_id(), Some("Wraith"));
        assert_eq!(session.pool().len(), 3);
        assert_eq!(session.catalog().len(), 15);
    }

    #[test]
    fn copy_link_embeds_active_hero() {
        let mut session = Session::start(base_link(), Some(1));
        session.install(assets());
        session.choose_hero("Ivy");
        let outcome = session.copy_link(&mut NoClipboard);
        assert_eq!(
            outcome,
            CopyOutcome::Manual("https://deadlock-bravery.app/?hero=Ivy".to_string())
        );
    }
}
