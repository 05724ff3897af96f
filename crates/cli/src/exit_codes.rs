//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts branch on them, so a code never changes meaning once shipped.
//!
//! | Code | Description                                  |
//! |------|----------------------------------------------|
//! | 0    | Success                                      |
//! | 1    | General error (unspecified)                  |
//! | 2    | CLI usage error (bad args)                   |
//! | 3    | I/O error reading inputs or writing results  |
//! | 4    | Invalid config file                          |
//! | 5    | Invalid input data (record too long, etc.)   |
//!
//! Clap reports its own argument errors with exit code 2 as well.

use partmatch_recon::ReconError;

/// Success - command completed without errors.
/// A run with unmatched parts still succeeds; no match is a normal outcome.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input file or write an output file.
pub const EXIT_IO: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Input records violate engine limits (code too long, too many records).
pub const EXIT_INVALID_INPUT: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::CodeTooLong { .. } | ReconError::CatalogTooLarge { .. } => EXIT_INVALID_INPUT,
        ReconError::ThreadPool(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partmatch_recon::catalog::CatalogKind;

    #[test]
    fn engine_errors_map_to_stable_codes() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), 4);
        assert_eq!(recon_exit_code(&ReconError::ConfigValidation("x".into())), 4);
        assert_eq!(
            recon_exit_code(&ReconError::CodeTooLong { catalog: CatalogKind::Part, index: 0, len: 60 }),
            5
        );
        assert_eq!(
            recon_exit_code(&ReconError::CatalogTooLarge { catalog: CatalogKind::Master, count: 0 }),
            5
        );
        assert_eq!(recon_exit_code(&ReconError::ThreadPool("x".into())), 1);
    }
}
