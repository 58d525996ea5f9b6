//! Offline ingestion: CSV parsing and link manifests.

pub mod csv;
pub mod links;

pub use self::csv::{parse_family_csv, parse_pairs_csv, PairRow, ParsedPairs, SkipReason, SkippedRow};
pub use links::{
    member_link, token_link, LinkEntry, LinkManifest, WrittenManifests, CSV_MANIFEST_FILE,
    TEXT_MANIFEST_FILE,
};
