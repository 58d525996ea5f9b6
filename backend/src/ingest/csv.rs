//! Row-oriented pairing files.
//!
//! Two layouts are accepted:
//!
//! * a header table whose columns include `giver` and `receiver`
//!   (case-insensitive, `reciever` accepted), used by the token import;
//! * a family file whose first line is the family slug, second line a header,
//!   and remaining lines positional `giver,receiver` pairs.
//!
//! Structural problems abort with [`IngestError::Format`]. A bad data row is
//! skipped, logged and reported in [`ParsedPairs::skipped`].

use crate::error::IngestError;
use crate::slug::is_valid_slug;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

const GIVER_COLUMN: &str = "giver";
const RECEIVER_COLUMNS: [&str; 2] = ["receiver", "reciever"];

/// One accepted `giver -> receiver` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRow {
    pub giver: String,
    pub receiver: String,
    /// 1-based line number in the source text
    pub line: usize,
}

/// Why a data row was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer comma-separated fields than the layout needs
    MissingFields,
    /// Giver or receiver is blank after trimming
    EmptyName,
    /// Giver already has an accepted row earlier in the file
    DuplicateGiver,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingFields => "expected \"giver,receiver\"",
            SkipReason::EmptyName => "empty giver or receiver name",
            SkipReason::DuplicateGiver => "giver already has a receiver",
        };
        f.write_str(text)
    }
}

/// A data row that was skipped without aborting the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub content: String,
    pub reason: SkipReason,
}

/// Output of either parser
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedPairs {
    /// Only set by the family layout
    pub family_slug: Option<String>,
    pub pairs: Vec<PairRow>,
    /// Distinct names from accepted rows, first-seen order, giver before receiver
    pub names: Vec<String>,
    pub skipped: Vec<SkippedRow>,
}

impl ParsedPairs {
    fn new(family_slug: Option<String>) -> Self {
        Self {
            family_slug,
            ..Self::default()
        }
    }

    fn accept(&mut self, row: PairRow, seen_names: &mut HashSet<String>) {
        for name in [&row.giver, &row.receiver] {
            if seen_names.insert(name.clone()) {
                self.names.push(name.clone());
            }
        }
        self.pairs.push(row);
    }

    fn skip(&mut self, line: usize, content: &str, reason: SkipReason) {
        warn!(line, row = content, %reason, "Skipping CSV row");
        self.skipped.push(SkippedRow {
            line,
            content: content.to_string(),
            reason,
        });
    }
}

/// Split on `\r?\n`, trim, drop blank lines. Keeps 1-based source line numbers.
/// A leading UTF-8 byte-order mark is ignored.
fn significant_lines(raw: &str) -> Vec<(usize, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    raw.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect()
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Parse a header table with `giver` / `receiver` columns.
pub fn parse_pairs_csv(raw: &str) -> Result<ParsedPairs, IngestError> {
    let lines = significant_lines(raw);
    if lines.len() < 2 {
        return Err(IngestError::Format(
            "CSV seems empty or missing data rows".to_string(),
        ));
    }

    let (_, header_line) = lines[0];
    let header: Vec<String> = split_fields(header_line)
        .into_iter()
        .map(str::to_lowercase)
        .collect();

    let giver_idx = header.iter().position(|h| h == GIVER_COLUMN);
    let receiver_idx = RECEIVER_COLUMNS
        .iter()
        .find_map(|name| header.iter().position(|h| h == name));

    let (giver_idx, receiver_idx) = match (giver_idx, receiver_idx) {
        (Some(g), Some(r)) => (g, r),
        _ => {
            return Err(IngestError::Format(
                "CSV must have headers \"giver\" and \"receiver\"/\"reciever\"".to_string(),
            ))
        }
    };
    let needed = giver_idx.max(receiver_idx) + 1;

    let mut parsed = ParsedPairs::new(None);
    let mut seen_names = HashSet::new();
    let mut seen_givers = HashSet::new();

    for &(line_no, line) in &lines[1..] {
        let fields = split_fields(line);
        if fields.len() < needed {
            parsed.skip(line_no, line, SkipReason::MissingFields);
            continue;
        }
        accept_fields(
            &mut parsed,
            &mut seen_names,
            &mut seen_givers,
            line_no,
            line,
            fields[giver_idx],
            fields[receiver_idx],
        );
    }

    finish(parsed)
}

/// Parse the family layout: slug line, header line, positional pairs.
pub fn parse_family_csv(raw: &str) -> Result<ParsedPairs, IngestError> {
    let lines = significant_lines(raw);
    if lines.len() < 3 {
        return Err(IngestError::Format(
            "CSV must have at least 3 lines: slug, header, and one pairing".to_string(),
        ));
    }

    let (_, family_slug) = lines[0];
    if !is_valid_slug(family_slug) {
        return Err(IngestError::Format(format!(
            "First line must be a family slug ([a-z0-9-]), got {:?}",
            family_slug
        )));
    }

    let (_, header_line) = lines[1];
    debug!(header = header_line, "Family CSV header");

    let mut parsed = ParsedPairs::new(Some(family_slug.to_string()));
    let mut seen_names = HashSet::new();
    let mut seen_givers = HashSet::new();

    for &(line_no, line) in &lines[2..] {
        let fields = split_fields(line);
        if fields.len() < 2 {
            parsed.skip(line_no, line, SkipReason::MissingFields);
            continue;
        }
        accept_fields(
            &mut parsed,
            &mut seen_names,
            &mut seen_givers,
            line_no,
            line,
            fields[0],
            fields[1],
        );
    }

    finish(parsed)
}

fn accept_fields(
    parsed: &mut ParsedPairs,
    seen_names: &mut HashSet<String>,
    seen_givers: &mut HashSet<String>,
    line_no: usize,
    line: &str,
    giver: &str,
    receiver: &str,
) {
    if giver.is_empty() || receiver.is_empty() {
        parsed.skip(line_no, line, SkipReason::EmptyName);
        return;
    }
    if !seen_givers.insert(giver.to_string()) {
        parsed.skip(line_no, line, SkipReason::DuplicateGiver);
        return;
    }
    parsed.accept(
        PairRow {
            giver: giver.to_string(),
            receiver: receiver.to_string(),
            line: line_no,
        },
        seen_names,
    );
}

fn finish(parsed: ParsedPairs) -> Result<ParsedPairs, IngestError> {
    if parsed.pairs.is_empty() {
        return Err(IngestError::Format(
            "No valid giver/receiver pairs found in CSV".to_string(),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(parsed: &ParsedPairs) -> Vec<(&str, &str)> {
        parsed
            .pairs
            .iter()
            .map(|p| (p.giver.as_str(), p.receiver.as_str()))
            .collect()
    }

    #[test]
    fn test_header_table_three_cycle() {
        let parsed = parse_pairs_csv("giver,receiver\nalice,bob\nbob,carol\ncarol,alice").unwrap();
        assert_eq!(
            edges(&parsed),
            vec![("alice", "bob"), ("bob", "carol"), ("carol", "alice")]
        );
        assert_eq!(parsed.names, vec!["alice", "bob", "carol"]);
        assert!(parsed.skipped.is_empty());
        assert!(parsed.family_slug.is_none());
    }

    #[test]
    fn test_header_is_case_insensitive_and_column_order_free() {
        let parsed = parse_pairs_csv("Reciever , GIVER\r\nBob, Alice\r\n").unwrap();
        assert_eq!(edges(&parsed), vec![("Alice", "Bob")]);
        assert_eq!(parsed.names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let parsed = parse_pairs_csv("id,giver,receiver,notes\n1,Ana,Luis,x\n2,Luis,Ana,").unwrap();
        assert_eq!(edges(&parsed), vec![("Ana", "Luis"), ("Luis", "Ana")]);
    }

    #[test]
    fn test_missing_header_column_is_fatal() {
        let err = parse_pairs_csv("from,to\nalice,bob").unwrap_err();
        assert!(matches!(err, IngestError::Format(_)));
    }

    #[test]
    fn test_too_few_lines_is_fatal() {
        assert!(matches!(
            parse_pairs_csv("giver,receiver\n\n  \n"),
            Err(IngestError::Format(_))
        ));
        assert!(matches!(parse_pairs_csv(""), Err(IngestError::Format(_))));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let raw = "giver,receiver\nalice,bob\njust-one-field\n,carol\nbob,\nbob,alice";
        let parsed = parse_pairs_csv(raw).unwrap();

        assert_eq!(edges(&parsed), vec![("alice", "bob"), ("bob", "alice")]);
        let reasons: Vec<(usize, SkipReason)> =
            parsed.skipped.iter().map(|s| (s.line, s.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (3, SkipReason::MissingFields),
                (4, SkipReason::EmptyName),
                (5, SkipReason::EmptyName),
            ]
        );
        // names from skipped rows never enter the name set
        assert_eq!(parsed.names, vec!["alice", "bob"]);
    }

    #[test]
    fn test_duplicate_giver_keeps_first_row() {
        let parsed = parse_pairs_csv("giver,receiver\nalice,bob\nalice,carol\nbob,alice").unwrap();
        assert_eq!(edges(&parsed), vec![("alice", "bob"), ("bob", "alice")]);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].reason, SkipReason::DuplicateGiver);
        assert!(!parsed.names.contains(&"carol".to_string()));
    }

    #[test]
    fn test_all_rows_invalid_is_fatal() {
        let err = parse_pairs_csv("giver,receiver\nalice\n,bob").unwrap_err();
        assert_eq!(
            err,
            IngestError::Format("No valid giver/receiver pairs found in CSV".to_string())
        );
    }

    #[test]
    fn test_family_layout() {
        let raw = "garcia\r\ngiver,receiver\r\n\r\nAna María, Luis\r\nLuis,Ana María\r\n";
        let parsed = parse_family_csv(raw).unwrap();
        assert_eq!(parsed.family_slug.as_deref(), Some("garcia"));
        assert_eq!(edges(&parsed), vec![("Ana María", "Luis"), ("Luis", "Ana María")]);
        assert_eq!(parsed.pairs[0].line, 4);
    }

    #[test]
    fn test_family_layout_needs_three_lines() {
        assert!(matches!(
            parse_family_csv("garcia\ngiver,receiver\n"),
            Err(IngestError::Format(_))
        ));
    }

    #[test]
    fn test_family_layout_rejects_non_slug_first_line() {
        assert!(matches!(
            parse_family_csv("Garcia Family\ngiver,receiver\na,b"),
            Err(IngestError::Format(_))
        ));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let parsed = parse_pairs_csv("\u{feff}giver,receiver\r\nalice,bob\r\nbob,alice\r\n").unwrap();
        assert_eq!(edges(&parsed), vec![("alice", "bob"), ("bob", "alice")]);
        assert!(parsed.skipped.is_empty());

        let parsed = parse_family_csv("\u{feff}garcia\ngiver,receiver\nalice,bob\n").unwrap();
        assert_eq!(parsed.family_slug.as_deref(), Some("garcia"));
        assert_eq!(edges(&parsed), vec![("alice", "bob")]);
    }
}
