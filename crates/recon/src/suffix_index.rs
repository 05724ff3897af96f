//! Length-bucketed suffix dictionaries.
//!
//! Bucket `L` maps the last `L` bytes of every catalog code with length `>= L`
//! to catalog entries. Buckets share nothing, so each one is built as its own
//! rayon task. Because catalogs are sorted ascending by length and scanned
//! forward, the first entry to claim a suffix is the shortest code carrying it.

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::catalog::{CatalogEntry, SortedCatalog};
use crate::normalize::{MAX_LEN, MIN_LEN};

pub type Bucket<'a, V> = FxHashMap<&'a [u8], V>;

/// Master-oriented index: suffix to the original index of the first master carrying it.
pub type MasterSuffixIndex<'a> = SuffixIndex<'a, u32>;

/// Part-oriented index: suffix to every part carrying it, in ascending catalog order.
pub type PartSuffixIndex<'a> = SuffixIndex<'a, Vec<&'a CatalogEntry>>;

#[derive(Debug)]
pub struct SuffixIndex<'a, V> {
    /// Indexed by suffix length; `None` below `MIN_LEN` and past the longest code.
    buckets: Vec<Option<Bucket<'a, V>>>,
}

impl<'a, V> SuffixIndex<'a, V> {
    /// Look up a full key in the bucket matching its length.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.bucket(key.len())?.get(key)
    }

    pub fn bucket(&self, len: usize) -> Option<&Bucket<'a, V>> {
        self.buckets.get(len)?.as_ref()
    }

    /// Number of populated buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.iter().flatten().count()
    }

    /// Total number of suffix keys across buckets.
    pub fn key_count(&self) -> usize {
        self.buckets.iter().flatten().map(|b| b.len()).sum()
    }
}

/// First catalog position whose code length is `>= L`, for every `L`.
///
/// Filled with the first position of each exact length, then back-filled from
/// the next longer length.
pub fn start_positions(entries: &[CatalogEntry]) -> [Option<usize>; MAX_LEN] {
    let mut starts = [None; MAX_LEN];
    for (pos, entry) in entries.iter().enumerate() {
        debug_assert!(entry.code.len() < MAX_LEN);
        let slot = &mut starts[entry.code.len()];
        if slot.is_none() {
            *slot = Some(pos);
        }
    }

    let mut next = None;
    for slot in starts.iter_mut().rev() {
        match slot {
            Some(_) => next = *slot,
            None => *slot = next,
        }
    }
    starts
}

fn build<'a, V, F>(catalog: &'a SortedCatalog, fill: F) -> SuffixIndex<'a, V>
where
    V: Send,
    F: Fn(&mut Bucket<'a, V>, &'a [u8], &'a CatalogEntry) + Sync,
{
    let entries = catalog.entries();
    let starts = start_positions(entries);

    let built: Vec<Option<Bucket<'a, V>>> = (MIN_LEN..MAX_LEN)
        .into_par_iter()
        .map(|len| {
            let tail = &entries[starts[len]?..];
            let mut bucket = Bucket::with_capacity_and_hasher(tail.len(), Default::default());
            for entry in tail {
                let suffix = &entry.code[entry.code.len() - len..];
                fill(&mut bucket, suffix, entry);
            }
            Some(bucket)
        })
        .collect();

    let mut buckets = Vec::with_capacity(MAX_LEN);
    buckets.resize_with(MIN_LEN, || None);
    buckets.extend(built);
    SuffixIndex { buckets }
}

/// First write wins: the shortest (then earliest) master keeps each suffix.
pub fn build_master_index(catalog: &SortedCatalog) -> MasterSuffixIndex<'_> {
    build::<u32, _>(catalog, |bucket, suffix, entry| {
        bucket.entry(suffix).or_insert(entry.original_index);
    })
}

pub fn build_part_index(catalog: &SortedCatalog) -> PartSuffixIndex<'_> {
    build::<Vec<&CatalogEntry>, _>(catalog, |bucket, suffix, entry| {
        bucket.entry(suffix).or_default().push(entry);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MasterCatalog, PartCatalog};

    #[test]
    fn start_positions_back_fill() {
        let parts = PartCatalog::from_records(&["abc", "abcd", "xyz", "abcdefg"]).unwrap();
        let starts = start_positions(parts.sorted().entries());
        // sorted: ABC, XYZ, ABCD, ABCDEFG
        assert_eq!(starts[0], Some(0));
        assert_eq!(starts[3], Some(0));
        assert_eq!(starts[4], Some(2));
        assert_eq!(starts[5], Some(3));
        assert_eq!(starts[6], Some(3));
        assert_eq!(starts[7], Some(3));
        assert_eq!(starts[8], None);
        assert_eq!(starts[MAX_LEN - 1], None);
    }

    #[test]
    fn master_index_prefers_shortest_code() {
        let masters = MasterCatalog::from_records(&["ZZ12345", "AB12345", "12345"]).unwrap();
        let index = build_master_index(masters.sorted());

        // "12345" is its own exact master (index 2), beating both longer ones
        assert_eq!(index.get(b"12345"), Some(&2));
        // equal lengths: the earlier record wins
        assert_eq!(index.get(b"2345"), Some(&2));
        assert_eq!(index.get(b"Z12345"), Some(&0));
        assert_eq!(index.get(b"B12345"), Some(&1));
        assert_eq!(index.get(b"X12345"), None);
        assert_eq!(index.bucket_count(), 5); // lengths 3..=7
    }

    #[test]
    fn short_and_out_of_range_keys_miss() {
        let masters = MasterCatalog::from_records(&["AB", "ABC"]).unwrap();
        let index = build_master_index(masters.sorted());
        assert_eq!(index.get(b"AB"), None);
        assert_eq!(index.get(b"ABC"), Some(&1));
        assert_eq!(index.get(&[b'A'; MAX_LEN + 10]), None);
        assert!(index.bucket(2).is_none());
        assert!(index.bucket(4).is_none());
    }

    #[test]
    fn part_index_collects_all_in_catalog_order() {
        let parts = PartCatalog::from_records(&["x9876", "9876", "ab9876", "y9876"]).unwrap();
        let index = build_part_index(parts.sorted());

        let hits: Vec<u32> = index
            .get(b"9876")
            .unwrap()
            .iter()
            .map(|e| e.original_index)
            .collect();
        assert_eq!(hits, vec![1, 0, 3, 2]);

        let hits: Vec<u32> = index
            .get(b"876")
            .unwrap()
            .iter()
            .map(|e| e.original_index)
            .collect();
        assert_eq!(hits.len(), 4);
        assert_eq!(index.key_count(), 1 + 1 + 3 + 1);
    }

    #[test]
    fn empty_catalog_has_no_buckets() {
        let parts = PartCatalog::from_records::<&str>(&[]).unwrap();
        let index = build_part_index(parts.sorted());
        assert_eq!(index.bucket_count(), 0);
        assert_eq!(index.get(b"ABC"), None);
    }
}
