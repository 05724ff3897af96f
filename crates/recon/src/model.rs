use serde::Serialize;

use crate::source::split_records;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The two record batches of one run, in original file order.
#[derive(Debug, Clone, Default)]
pub struct ReconInput<'a> {
    pub parts: Vec<&'a [u8]>,
    pub masters: Vec<&'a [u8]>,
}

impl<'a> ReconInput<'a> {
    /// Split raw parts / master parts buffers into line records.
    pub fn from_buffers(parts: &'a [u8], masters: &'a [u8]) -> Self {
        Self {
            parts: split_records(parts),
            masters: split_records(masters),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Precedence level that produced a match. Lower tiers always win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Part code equals a master code or its trailing suffix.
    Suffix,
    /// Same, against the hyphen-stripped master code.
    HyphenInsensitive,
    /// A master code is a trailing suffix of the part code; longest master wins.
    ReverseSuffix,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suffix => write!(f, "suffix"),
            Self::HyphenInsensitive => write!(f, "hyphen_insensitive"),
            Self::ReverseSuffix => write!(f, "reverse_suffix"),
        }
    }
}

/// A resolved master, by original index into the master batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub master_index: u32,
    pub tier: MatchTier,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One output line: a part record and the master it resolved to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRow {
    pub part: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<MatchTier>,
}

impl MatchRow {
    pub fn is_match(&self) -> bool {
        self.master.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub suffix: usize,
    pub hyphen_insensitive: usize,
    pub reverse_suffix: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_parts: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Parts below the minimum code length, never matchable.
    pub too_short: usize,
    pub tiers: TierCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub engine_version: String,
    pub run_at: String,
    pub part_count: usize,
    pub master_count: usize,
    pub threads: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<MatchRow>,
}
