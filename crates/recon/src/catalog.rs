//! Normalized, length-sorted views over the part and master batches.
//!
//! Each catalog keeps the trimmed original records (for output) next to the
//! folded entries used for indexing. Entries point back at their record through
//! `original_index`, which is also the tie-break when sorting by length.

use serde::Serialize;

use crate::error::ReconError;
use crate::normalize::{fold, strip_hyphens, trim_spaces, MAX_LEN, MIN_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Part,
    Master,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Part => write!(f, "part"),
            Self::Master => write!(f, "master"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: Box<[u8]>,
    pub original_index: u32,
}

/// Entries ordered ascending by `(code.len(), original_index)`.
#[derive(Debug, Default)]
pub struct SortedCatalog {
    entries: Vec<CatalogEntry>,
}

impl SortedCatalog {
    fn from_unsorted(mut entries: Vec<CatalogEntry>) -> Self {
        // Keys are unique per catalog, so an unstable sort is still deterministic.
        entries.sort_unstable_by_key(|e| (e.code.len(), e.original_index));
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PartCatalog {
    records: Vec<Box<[u8]>>,
    sorted: SortedCatalog,
}

impl PartCatalog {
    /// Trim, fold and sort a batch of part records.
    ///
    /// Parts shorter than `MIN_LEN` keep their record but get no entry.
    pub fn from_records<R: AsRef<[u8]>>(records: &[R]) -> Result<Self, ReconError> {
        let records = trimmed_records(CatalogKind::Part, records)?;
        let entries = records
            .iter()
            .enumerate()
            .filter(|(_, rec)| rec.len() >= MIN_LEN)
            .map(|(i, rec)| CatalogEntry {
                code: fold(rec),
                original_index: i as u32,
            })
            .collect();

        Ok(Self {
            sorted: SortedCatalog::from_unsorted(entries),
            records,
        })
    }

    pub fn records(&self) -> &[Box<[u8]>] {
        &self.records
    }

    pub fn sorted(&self) -> &SortedCatalog {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Master parts
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MasterCatalog {
    records: Vec<Box<[u8]>>,
    sorted: SortedCatalog,
    no_hyphen: SortedCatalog,
}

impl MasterCatalog {
    /// Trim, fold and sort a batch of master records, plus the hyphen-stripped
    /// view of every indexable master that contains a hyphen.
    pub fn from_records<R: AsRef<[u8]>>(records: &[R]) -> Result<Self, ReconError> {
        let records = trimmed_records(CatalogKind::Master, records)?;

        let mut entries = Vec::with_capacity(records.len());
        let mut stripped = Vec::new();
        for (i, rec) in records.iter().enumerate() {
            let code = fold(rec);
            if code.len() >= MIN_LEN {
                if let Some(nh) = strip_hyphens(&code) {
                    stripped.push(CatalogEntry {
                        code: nh,
                        original_index: i as u32,
                    });
                }
            }
            entries.push(CatalogEntry {
                code,
                original_index: i as u32,
            });
        }

        Ok(Self {
            sorted: SortedCatalog::from_unsorted(entries),
            no_hyphen: SortedCatalog::from_unsorted(stripped),
            records,
        })
    }

    pub fn records(&self) -> &[Box<[u8]>] {
        &self.records
    }

    /// Original trimmed record of a master entry.
    pub fn record(&self, original_index: u32) -> &[u8] {
        &self.records[original_index as usize]
    }

    pub fn sorted(&self) -> &SortedCatalog {
        &self.sorted
    }

    pub fn no_hyphen(&self) -> &SortedCatalog {
        &self.no_hyphen
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn trimmed_records<R: AsRef<[u8]>>(
    catalog: CatalogKind,
    records: &[R],
) -> Result<Vec<Box<[u8]>>, ReconError> {
    if records.len() > u32::MAX as usize {
        return Err(ReconError::CatalogTooLarge {
            catalog,
            count: records.len(),
        });
    }

    records
        .iter()
        .enumerate()
        .map(|(index, rec)| {
            let trimmed = trim_spaces(rec.as_ref());
            if trimmed.len() >= MAX_LEN {
                return Err(ReconError::CodeTooLong {
                    catalog,
                    index,
                    len: trimmed.len(),
                });
            }
            Ok(Box::from(trimmed))
        })
        .collect()
}
