use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogEntry;
use crate::pool::HeroPool;

/// Items in a full draw.
pub const DRAW_SIZE: usize = 12;
/// Leading positions that are unlocked; everything after is a locked bonus slot.
pub const UNLOCKED_SLOTS: usize = 9;

/// Recoverable draw failures, worded for display to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("Please select at least one hero from the pool!")]
    EmptyPool,
    #[error("No items are available to randomize.")]
    EmptyCatalog,
}

/// Up to [`DRAW_SIZE`] distinct catalog entries. A new draw replaces the whole
/// value; it is never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    entries: Vec<CatalogEntry>,
}

impl DrawResult {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unlocked(&self) -> &[CatalogEntry] {
        &self.entries[..self.entries.len().min(UNLOCKED_SLOTS)]
    }

    pub fn locked(&self) -> &[CatalogEntry] {
        &self.entries[self.entries.len().min(UNLOCKED_SLOTS)..]
    }

    pub fn is_locked(index: usize) -> bool {
        index >= UNLOCKED_SLOTS
    }

    /// Entries in draw order, each paired with its locked flag.
    pub fn slots(&self) -> impl Iterator<Item = (&CatalogEntry, bool)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry, Self::is_locked(i)))
    }

    pub fn total_cost(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.cost)).sum()
    }
}

/// The outcome of one randomization: the drawn hero and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub hero: String,
    pub items: DrawResult,
}

/// In-place Fisher-Yates: walk from the last index down to 1, swapping each
/// position with a uniformly chosen index at or before it.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let mut i = items.len();
    while i > 1 {
        i -= 1;
        let j = rng.gen_range(0..=i);
        if j != i {
            items.swap(i, j);
        }
    }
}

pub fn draw_items<R: Rng + ?Sized>(catalog: &[CatalogEntry], rng: &mut R) -> DrawResult {
    let mut pool = catalog.to_vec();
    shuffle(&mut pool, rng);
    pool.truncate(DRAW_SIZE);
    DrawResult { entries: pool }
}

/// Uniform pick from the pool's sorted snapshot, so a seeded rng always picks
/// the same hero for the same pool.
pub fn draw_hero<R: Rng + ?Sized>(pool: &HeroPool, rng: &mut R) -> Option<String> {
    let ids = pool.snapshot();
    if ids.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..ids.len());
    Some(ids[index].to_string())
}

pub fn draw<R: Rng + ?Sized>(
    catalog: &[CatalogEntry],
    pool: &HeroPool,
    rng: &mut R,
) -> Result<Draw, DrawError> {
    if catalog.is_empty() {
        return Err(DrawError::EmptyCatalog);
    }
    let hero = draw_hero(pool, rng).ok_or(DrawError::EmptyPool)?;
    let items = draw_items(catalog, rng);

    tracing::debug!(hero = %hero, items = items.len(), "drew loadout");
    Ok(Draw { hero, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Slot;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn catalog(n: usize) -> Vec<CatalogEntry> {
        (0..n)
            .map(|i| CatalogEntry {
                id: format!("item-{i}"),
                name: format!("Item {i}"),
                display_name: None,
                slot: Slot::ALL[i % 3],
                cost: 800,
                description: None,
                image: None,
            })
            .collect()
    }

    fn chi_square(observed: &[u32], expected: f64) -> f64 {
        observed
            .iter()
            .map(|&o| {
                let d = f64::from(o) - expected;
                d * d / expected
            })
            .sum()
    }

    #[test]
    fn full_draw_has_twelve_distinct_entries() {
        let items = catalog(40);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let result = draw_items(&items, &mut rng);
            assert_eq!(result.len(), DRAW_SIZE);
            let ids: HashSet<_> = result.entries().iter().map(|e| &e.id).collect();
            assert_eq!(ids.len(), DRAW_SIZE);
        }
    }

    #[test]
    fn locked_split_holds_for_every_size() {
        let mut rng = StdRng::seed_from_u64(1);
        for m in 0..=DRAW_SIZE {
            let result = draw_items(&catalog(m), &mut rng);
            assert_eq!(result.len(), m);
            assert_eq!(result.unlocked().len(), m.min(9));
            assert_eq!(result.locked().len(), m.saturating_sub(9));
            let locked_flags = result.slots().filter(|(_, locked)| *locked).count();
            assert_eq!(locked_flags, m.saturating_sub(9));
            for (i, (_, locked)) in result.slots().enumerate() {
                assert_eq!(locked, i >= 9);
            }
        }
    }

    #[test]
    fn oversized_catalog_still_locks_only_last_three() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = draw_items(&catalog(100), &mut rng);
        assert_eq!(result.unlocked().len(), 9);
        assert_eq!(result.locked().len(), 3);
        assert_eq!(&result.entries()[9..], result.locked());
    }

    #[test]
    fn item_draw_is_uniform() {
        const N: usize = 20;
        const TRIALS: u32 = 20_000;
        // Well past the 0.001 critical value for 19 degrees of freedom (43.8).
        const CRITICAL: f64 = 55.0;

        let items = catalog(N);
        let index_of = |id: &str| -> usize {
            id.trim_start_matches("item-").parse().unwrap()
        };
        let mut rng = StdRng::seed_from_u64(0xB2A7_E11E);
        let mut picked = [0u32; N];
        let mut by_position = [[0u32; N]; DRAW_SIZE];

        for _ in 0..TRIALS {
            let result = draw_items(&items, &mut rng);
            for (pos, entry) in result.entries().iter().enumerate() {
                let idx = index_of(&entry.id);
                picked[idx] += 1;
                by_position[pos][idx] += 1;
            }
        }

        let expected_picks = f64::from(TRIALS) * DRAW_SIZE as f64 / N as f64;
        let stat = chi_square(&picked, expected_picks);
        assert!(stat < CRITICAL, "selection frequency chi-square {stat}");

        let expected_at_position = f64::from(TRIALS) / N as f64;
        for (pos, counts) in by_position.iter().enumerate() {
            let stat = chi_square(counts, expected_at_position);
            assert!(stat < CRITICAL, "position {pos} chi-square {stat}");
        }
    }

    #[test]
    fn shuffle_keeps_every_element() {
        let mut values: Vec<u32> = (0..50).collect();
        shuffle(&mut values, &mut StdRng::seed_from_u64(3));
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn hero_is_always_from_the_pool() {
        let pool: HeroPool = ["Abrams", "Ivy", "Wraith"].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = HashSet::new();
        for _ in 0..300 {
            let hero = draw_hero(&pool, &mut rng).unwrap();
            assert!(pool.contains(&hero));
            seen.insert(hero);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn same_seed_same_draw() {
        let items = catalog(30);
        let pool: HeroPool = ["Abrams", "Ivy", "Wraith"].into_iter().collect();
        let a = draw(&items, &pool, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = draw(&items, &pool, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_inputs_are_reported() {
        let pool: HeroPool = ["Abrams"].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(draw(&[], &pool, &mut rng), Err(DrawError::EmptyCatalog));
        assert_eq!(
            draw(&catalog(15), &HeroPool::new(), &mut rng),
            Err(DrawError::EmptyPool)
        );
    }
}
