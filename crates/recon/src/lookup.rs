use crate::catalog::MasterCatalog;
use crate::model::{MatchTier, Resolution};
use crate::normalize::{fold_into, MAX_LEN, MIN_LEN};
use crate::suffix_index::{build_master_index, MasterSuffixIndex};

/// Tier 1 and tier 2 lookups against the master catalog.
///
/// This is the forward pass of batch reconciliation, and can also be used on
/// its own to answer ad-hoc queries without a precomputed match table. The
/// reverse (tier 3) search needs the part batch and is not available here.
#[derive(Debug)]
pub struct MasterLookup<'a> {
    suffixes: MasterSuffixIndex<'a>,
    no_hyphen: MasterSuffixIndex<'a>,
}

impl<'a> MasterLookup<'a> {
    /// Build both master suffix indices concurrently.
    pub fn new(masters: &'a MasterCatalog) -> Self {
        let (suffixes, no_hyphen) = rayon::join(
            || build_master_index(masters.sorted()),
            || build_master_index(masters.no_hyphen()),
        );
        tracing::debug!(
            buckets = suffixes.bucket_count(),
            keys = suffixes.key_count(),
            no_hyphen_keys = no_hyphen.key_count(),
            "master suffix indices built"
        );
        Self { suffixes, no_hyphen }
    }

    /// Resolve an already folded code.
    pub fn resolve_folded(&self, code: &[u8]) -> Option<Resolution> {
        if let Some(&master_index) = self.suffixes.get(code) {
            return Some(Resolution {
                master_index,
                tier: MatchTier::Suffix,
            });
        }
        self.no_hyphen.get(code).map(|&master_index| Resolution {
            master_index,
            tier: MatchTier::HyphenInsensitive,
        })
    }

    /// Fold an arbitrary query and resolve it. Never fails: codes outside
    /// `MIN_LEN..MAX_LEN` simply do not match.
    pub fn find_match(&self, query: &[u8]) -> Option<Resolution> {
        if query.len() < MIN_LEN || query.len() >= MAX_LEN {
            return None;
        }
        let mut scratch = [0u8; MAX_LEN];
        self.resolve_folded(fold_into(query, &mut scratch))
    }
}
