use std::fmt;

use crate::catalog::CatalogKind;
use crate::normalize::MAX_LEN;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad delimiter, zero threads, etc.).
    ConfigValidation(String),
    /// A trimmed record does not fit the suffix index bound.
    CodeTooLong { catalog: CatalogKind, index: usize, len: usize },
    /// More records than an original index can address.
    CatalogTooLarge { catalog: CatalogKind, count: usize },
    /// Worker pool could not be created.
    ThreadPool(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::CodeTooLong { catalog, index, len } => write!(
                f,
                "{catalog} record {}: code is {len} bytes, maximum is {}",
                index + 1,
                MAX_LEN - 1
            ),
            Self::CatalogTooLarge { catalog, count } => {
                write!(f, "{catalog} catalog has {count} records, maximum is {}", u32::MAX)
            }
            Self::ThreadPool(msg) => write!(f, "worker pool error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_too_long_reports_one_based_record() {
        let err = ReconError::CodeTooLong { catalog: CatalogKind::Master, index: 4, len: 61 };
        assert_eq!(err.to_string(), "master record 5: code is 61 bytes, maximum is 49");
    }
}
