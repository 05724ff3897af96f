//! `partmatch-recon`: suffix-indexed part code reconciliation engine.
//!
//! Pure engine crate: receives pre-split records, returns resolved matches.
//! No CLI or IO dependencies.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod source;
pub mod suffix_index;
pub mod summary;

pub use config::ReconConfig;
pub use engine::{run, MatchRef, Reconciler};
pub use error::ReconError;
pub use lookup::MasterLookup;
pub use model::{MatchRow, MatchTier, ReconInput, ReconResult, ReconSummary, Resolution};
pub use normalize::{MAX_LEN, MIN_LEN};
