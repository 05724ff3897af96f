//! Batch reconciliation: builds the match table once, then answers queries
//! against it without locking.
//!
//! Precedence, highest first:
//! 1. the part code equals a master code or its trailing suffix (shortest master wins),
//! 2. same against hyphen-stripped master codes,
//! 3. a master code is a trailing suffix of the part code (longest master wins).
//!
//! Every tie-break comes from traversal order plus first-write-wins inserts.

use std::time::Instant;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::catalog::{MasterCatalog, PartCatalog, SortedCatalog};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::lookup::MasterLookup;
use crate::model::{MatchRow, MatchTier, ReconInput, ReconMeta, ReconResult, Resolution};
use crate::normalize::{fold_into, MAX_LEN, MIN_LEN};
use crate::suffix_index::{build_part_index, PartSuffixIndex};
use crate::summary::compute_summary;

// ---------------------------------------------------------------------------
// Match table
// ---------------------------------------------------------------------------

/// Folded part code to resolved master. Keys are only ever inserted once.
#[derive(Debug, Default)]
pub struct MatchTable {
    entries: FxHashMap<Box<[u8]>, Resolution>,
}

impl MatchTable {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Insert unless the code is already resolved. Returns whether it was inserted.
    fn insert_if_absent(&mut self, code: &[u8], resolution: Resolution) -> bool {
        if self.entries.contains_key(code) {
            return false;
        }
        self.entries.insert(Box::from(code), resolution);
        true
    }

    pub fn get(&self, code: &[u8]) -> Option<Resolution> {
        self.entries.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the match table for a part batch against a master batch.
pub fn build_match_table(parts: &PartCatalog, masters: &MasterCatalog) -> MatchTable {
    let (lookup, part_index) = rayon::join(
        || MasterLookup::new(masters),
        || build_part_index(parts.sorted()),
    );
    tracing::debug!(
        buckets = part_index.bucket_count(),
        keys = part_index.key_count(),
        "part suffix index built"
    );

    let mut table = MatchTable::with_capacity(parts.sorted().len());
    let forward = forward_pass(&mut table, parts.sorted(), &lookup);
    let reverse = reverse_pass(&mut table, masters.sorted(), &part_index);
    tracing::debug!(forward, reverse, codes = table.len(), "match table built");
    table
}

/// Tier 1 then tier 2 for every indexable part, ascending by length.
fn forward_pass(table: &mut MatchTable, parts: &SortedCatalog, lookup: &MasterLookup<'_>) -> usize {
    let mut resolved = 0;
    for part in parts.entries() {
        if let Some(resolution) = lookup.resolve_folded(&part.code) {
            if table.insert_if_absent(&part.code, resolution) {
                resolved += 1;
            }
        }
    }
    resolved
}

/// Tier 3: masters longest first, so the longest master suffix claims a part.
///
/// The length-sorted catalog is walked from its end, so among equal-length
/// masters the one latest in the file inserts first and wins ties.
fn reverse_pass(
    table: &mut MatchTable,
    masters: &SortedCatalog,
    part_index: &PartSuffixIndex<'_>,
) -> usize {
    let mut resolved = 0;
    for master in masters.entries().iter().rev() {
        let Some(parts) = part_index.get(&master.code) else {
            continue;
        };
        let resolution = Resolution {
            master_index: master.original_index,
            tier: MatchTier::ReverseSuffix,
        };
        for part in parts.iter().rev() {
            if table.insert_if_absent(&part.code, resolution) {
                resolved += 1;
            }
        }
    }
    resolved
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// A resolved match, borrowing the original master record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRef<'r> {
    pub master_index: u32,
    pub master: &'r [u8],
    pub tier: MatchTier,
}

/// Immutable reconciliation state for one batch.
///
/// Built once by [`Reconciler::build`]; afterwards it only answers queries and
/// can be shared across threads freely.
#[derive(Debug)]
pub struct Reconciler {
    masters: MasterCatalog,
    table: MatchTable,
}

impl Reconciler {
    /// Normalize both batches concurrently and build the match table.
    pub fn build<P, M>(parts: &[P], masters: &[M]) -> Result<Self, ReconError>
    where
        P: AsRef<[u8]> + Sync,
        M: AsRef<[u8]> + Sync,
    {
        let (parts, masters) = load_catalogs(parts, masters)?;
        Ok(Self::from_catalogs(&parts, masters))
    }

    pub fn from_catalogs(parts: &PartCatalog, masters: MasterCatalog) -> Self {
        let table = build_match_table(parts, &masters);
        Self { masters, table }
    }

    /// Original master record for a part code, or `None`.
    pub fn find_match(&self, query: &[u8]) -> Option<&[u8]> {
        self.resolve(query).map(|m| m.master)
    }

    pub fn resolve(&self, query: &[u8]) -> Option<MatchRef<'_>> {
        if query.len() < MIN_LEN || query.len() >= MAX_LEN {
            return None;
        }
        let mut scratch = [0u8; MAX_LEN];
        let code = fold_into(query, &mut scratch);
        let Resolution { master_index, tier } = self.table.get(code)?;
        Some(MatchRef {
            master_index,
            master: self.masters.record(master_index),
            tier,
        })
    }

    pub fn match_table(&self) -> &MatchTable {
        &self.table
    }

    pub fn masters(&self) -> &MasterCatalog {
        &self.masters
    }
}

fn load_catalogs<P, M>(parts: &[P], masters: &[M]) -> Result<(PartCatalog, MasterCatalog), ReconError>
where
    P: AsRef<[u8]> + Sync,
    M: AsRef<[u8]> + Sync,
{
    let (parts, masters) = rayon::join(
        || PartCatalog::from_records(parts),
        || MasterCatalog::from_records(masters),
    );
    Ok((parts?, masters?))
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run reconciliation per config. Returns one row per part, in input order.
pub fn run(config: &ReconConfig, input: &ReconInput<'_>) -> Result<ReconResult, ReconError> {
    match config.engine.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| ReconError::ThreadPool(e.to_string()))?;
            pool.install(|| run_in_pool(config, input))
        }
        None => run_in_pool(config, input),
    }
}

fn run_in_pool(config: &ReconConfig, input: &ReconInput<'_>) -> Result<ReconResult, ReconError> {
    let started = Instant::now();

    let (parts, masters) = load_catalogs(&input.parts, &input.masters)?;
    tracing::info!(
        parts = parts.len(),
        indexable_parts = parts.sorted().len(),
        masters = masters.len(),
        no_hyphen_masters = masters.no_hyphen().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "catalogs loaded"
    );

    let reconciler = Reconciler::from_catalogs(&parts, masters);
    tracing::info!(
        codes = reconciler.match_table().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "match table built"
    );

    let rows: Vec<MatchRow> = parts
        .records()
        .par_iter()
        .map(|record| match reconciler.resolve(record) {
            Some(m) => MatchRow {
                part: String::from_utf8_lossy(record).into_owned(),
                master: Some(String::from_utf8_lossy(m.master).into_owned()),
                master_index: Some(m.master_index),
                tier: Some(m.tier),
            },
            None => MatchRow {
                part: String::from_utf8_lossy(record).into_owned(),
                master: None,
                master_index: None,
                tier: None,
            },
        })
        .collect();

    let summary = compute_summary(&rows);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    tracing::info!(matched = summary.matched, total = summary.total_parts, elapsed_ms, "reconciled");

    Ok(ReconResult {
        meta: ReconMeta {
            name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            part_count: parts.len(),
            master_count: reconciler.masters().len(),
            threads: rayon::current_num_threads(),
            elapsed_ms,
        },
        summary,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconcile(parts: &[&str], masters: &[&str]) -> Reconciler {
        Reconciler::build(parts, masters).unwrap()
    }

    fn matched<'r>(r: &'r Reconciler, part: &str) -> Option<&'r str> {
        r.find_match(part.as_bytes())
            .map(|m| std::str::from_utf8(m).unwrap())
    }

    #[test]
    fn hyphen_stripped_master_matches_via_tier_two() {
        let r = reconcile(&["X100200"], &["X-100200", "100200"]);
        assert_eq!(matched(&r, "X100200"), Some("X-100200"));
        assert_eq!(r.resolve(b"X100200").unwrap().tier, MatchTier::HyphenInsensitive);
    }

    #[test]
    fn part_suffix_of_longer_master() {
        let r = reconcile(&["12345"], &["AB12345"]);
        assert_eq!(matched(&r, "12345"), Some("AB12345"));
    }

    #[test]
    fn exact_master_beats_longer_master() {
        let r = reconcile(&["12345"], &["12345", "AB12345"]);
        assert_eq!(matched(&r, "12345"), Some("12345"));

        let r = reconcile(&["12345"], &["AB12345", "12345"]);
        assert_eq!(matched(&r, "12345"), Some("12345"));
    }

    #[test]
    fn two_char_part_never_matches() {
        let r = reconcile(&["AB"], &["AB", "XAB"]);
        assert_eq!(matched(&r, "AB"), None);
        assert!(r.match_table().is_empty());
    }

    #[test]
    fn case_insensitive_and_original_casing_returned() {
        let r = reconcile(&["abc123", "ABC123"], &["Abc123"]);
        assert_eq!(matched(&r, "abc123"), Some("Abc123"));
        assert_eq!(matched(&r, "ABC123"), Some("Abc123"));
        assert_eq!(r.match_table().len(), 1);
    }

    #[test]
    fn reverse_pass_picks_longest_master_suffix() {
        let r = reconcile(&["XYZ-12345"], &["345", "12345", "2345"]);
        let m = r.resolve(b"xyz-12345").unwrap();
        assert_eq!(m.master, b"12345");
        assert_eq!(m.master_index, 1);
        assert_eq!(m.tier, MatchTier::ReverseSuffix);
    }

    #[test]
    fn reverse_pass_ties_go_to_last_master() {
        let r = reconcile(&["QQ12345"], &["x12345", "a12345", "12345"]);
        // "x12345" / "a12345" are not suffixes of QQ12345; only "12345" is
        assert_eq!(matched(&r, "QQ12345"), Some("12345"));

        let r = reconcile(&["QQ12345"], &["12345", "12345 "]);
        assert_eq!(r.resolve(b"QQ12345").unwrap().master_index, 1);

        let r = reconcile(&["QQ12345"], &["abcde", "AbCdE"]);
        assert_eq!(matched(&r, "QQABCDE"), None);

        let r = reconcile(&["QQABCDE"], &["abcde", "AbCdE"]);
        let m = r.resolve(b"QQABCDE").unwrap();
        assert_eq!(m.master, b"AbCdE");
        assert_eq!(m.master_index, 1);
        assert_eq!(m.tier, MatchTier::ReverseSuffix);
    }

    #[test]
    fn reverse_pass_longer_master_beats_later_shorter_one() {
        let r = reconcile(&["ZZ-9876"], &["-9876", "x-9876", "9876"]);
        // "-9876" is earlier in the file than "9876" but longer
        let m = r.resolve(b"zz-9876").unwrap();
        assert_eq!(m.master, b"-9876");
        assert_eq!(m.master_index, 0);
        assert_eq!(m.tier, MatchTier::ReverseSuffix);
    }

    #[test]
    fn tier_two_outranks_reverse_pass() {
        // "X100200" is the stripped form of "X-100200" and also ends with "00200"
        let r = reconcile(&["X100200"], &["X-100200", "00200"]);
        let m = r.resolve(b"X100200").unwrap();
        assert_eq!(m.master, b"X-100200");
        assert_eq!(m.tier, MatchTier::HyphenInsensitive);
    }

    #[test]
    fn tier_one_outranks_tier_two() {
        let r = reconcile(&["AB100"], &["A-B100", "ZAB100"]);
        let m = r.resolve(b"AB100").unwrap();
        assert_eq!(m.master, b"ZAB100");
        assert_eq!(m.tier, MatchTier::Suffix);
    }

    #[test]
    fn queries_outside_the_batch_miss() {
        let r = reconcile(&["ABC"], &["ABC", "DEF"]);
        assert_eq!(matched(&r, "ABC"), Some("ABC"));
        // "DEF" is a master but was never a part in this batch
        assert_eq!(matched(&r, "DEF"), None);
        assert_eq!(r.find_match("A".repeat(MAX_LEN).as_bytes()), None);
    }

    #[test]
    fn empty_catalogs() {
        let r = reconcile(&[], &[]);
        assert!(r.match_table().is_empty());
        assert_eq!(matched(&r, "ABC"), None);

        let r = reconcile(&["ABC"], &[]);
        assert_eq!(matched(&r, "ABC"), None);
    }

    #[test]
    fn too_long_record_aborts_build() {
        let long = "Z".repeat(MAX_LEN + 1);
        let err = Reconciler::build(&[long.as_str()], &["ABC"]).unwrap_err();
        assert!(matches!(err, ReconError::CodeTooLong { .. }));
    }

    #[test]
    fn run_produces_rows_in_input_order() {
        let input = ReconInput::from_buffers(
            b" x100200 \nAB\n12345\r\nnothing\n",
            b"X-100200\n12345\nAB12345\n",
        );
        let result = run(&ReconConfig::default(), &input).unwrap();

        let rows: Vec<(&str, Option<&str>)> = result
            .rows
            .iter()
            .map(|r| (r.part.as_str(), r.master.as_deref()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("x100200", Some("X-100200")),
                ("AB", None),
                ("12345", Some("12345")),
                ("nothing", None),
            ]
        );
        assert_eq!(result.summary.matched, 2);
        assert_eq!(result.summary.too_short, 1);
        assert_eq!(result.meta.part_count, 4);
        assert_eq!(result.meta.master_count, 3);
    }

    #[test]
    fn run_with_dedicated_pool() {
        let mut config = ReconConfig::default();
        config.engine.threads = Some(2);
        let input = ReconInput::from_buffers(b"ZZ9876\n", b"9876\n876\n");
        let result = run(&config, &input).unwrap();
        assert_eq!(result.meta.threads, 2);
        assert_eq!(result.rows[0].master.as_deref(), Some("9876"));
        assert_eq!(result.rows[0].tier, Some(MatchTier::ReverseSuffix));
    }
}
