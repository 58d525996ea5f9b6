//! Shareable link manifests produced once per ingestion run.

use crate::error::{AppError, AppResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

pub const TEXT_MANIFEST_FILE: &str = "generated_links.txt";
pub const CSV_MANIFEST_FILE: &str = "generated_links.csv";

/// One participant and the URL they should open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    pub name: String,
    pub url: String,
}

/// Ordered list of participant links, in name discovery order
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkManifest {
    pub entries: Vec<LinkEntry>,
}

/// Paths written by [`LinkManifest::write_to`]
#[derive(Debug, Clone)]
pub struct WrittenManifests {
    pub text: PathBuf,
    pub csv: PathBuf,
}

/// `{base_url}/?token={token}`
pub fn token_link(base_url: &str, token: &str) -> AppResult<String> {
    let mut url = parse_base(base_url)?;
    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut().clear().append_pair("token", token);
    Ok(url.to_string())
}

/// `{base_url}/families/{family_slug}/{member_slug}`
pub fn member_link(base_url: &str, family_slug: &str, member_slug: &str) -> AppResult<String> {
    let mut url = parse_base(base_url)?;
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("BASE_URL cannot be a base: {}", base_url)))?
        .pop_if_empty()
        .extend(["families", family_slug, member_slug]);
    Ok(url.to_string())
}

fn parse_base(base_url: &str) -> AppResult<Url> {
    Url::parse(base_url).map_err(|e| AppError::Config(format!("Invalid BASE_URL {}: {}", base_url, e)))
}

impl LinkManifest {
    pub fn push(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.entries.push(LinkEntry {
            name: name.into(),
            url: url.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `name: url` lines
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.name, e.url))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `name,link` header followed by `name,url` lines
    pub fn to_csv(&self) -> String {
        std::iter::once("name,link".to_string())
            .chain(self.entries.iter().map(|e| format!("{},{}", e.name, e.url)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write both manifests into `dir`, replacing earlier runs
    pub fn write_to(&self, dir: &Path) -> AppResult<WrittenManifests> {
        std::fs::create_dir_all(dir)?;
        let text = dir.join(TEXT_MANIFEST_FILE);
        let csv = dir.join(CSV_MANIFEST_FILE);

        std::fs::write(&text, self.to_text())?;
        std::fs::write(&csv, self.to_csv())?;

        info!(
            entries = self.entries.len(),
            text = %text.display(),
            csv = %csv.display(),
            "Link manifests written"
        );
        Ok(WrittenManifests { text, csv })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_link() {
        assert_eq!(
            token_link("http://localhost:3000", "abc-123").unwrap(),
            "http://localhost:3000/?token=abc-123"
        );
        assert_eq!(
            token_link("https://santa.example.com/", "t").unwrap(),
            "https://santa.example.com/?token=t"
        );
        assert_eq!(
            token_link("https://example.com/santa", "t").unwrap(),
            "https://example.com/santa/?token=t"
        );
    }

    #[test]
    fn test_member_link() {
        assert_eq!(
            member_link("http://localhost:3000", "garcia", "ana-maria").unwrap(),
            "http://localhost:3000/families/garcia/ana-maria"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(token_link("not a url", "t"), Err(AppError::Config(_))));
    }

    #[test]
    fn test_manifest_rendering_keeps_order() {
        let mut manifest = LinkManifest::default();
        manifest.push("carol", "http://x/?token=3");
        manifest.push("alice", "http://x/?token=1");

        assert_eq!(
            manifest.to_text(),
            "carol: http://x/?token=3\nalice: http://x/?token=1"
        );
        assert_eq!(
            manifest.to_csv(),
            "name,link\ncarol,http://x/?token=3\nalice,http://x/?token=1"
        );
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = LinkManifest::default();
        manifest.push("alice", "http://x/?token=1");

        let written = manifest.write_to(dir.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(written.text).unwrap(),
            "alice: http://x/?token=1"
        );
        assert_eq!(
            std::fs::read_to_string(written.csv).unwrap(),
            "name,link\nalice,http://x/?token=1"
        );
    }
}
