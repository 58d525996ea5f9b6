use super::locks::NamedLocks;
use crate::error::{AppError, AppResult};
use crate::ingest::{parse_pairs_csv, token_link, LinkManifest, PairRow, SkippedRow};
use crate::models::{AuthToken, Pair};
use crate::repositories::{TokenRoster, TokenStore, TOKEN_ROSTER_LOCK_KEY};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Mints opaque bearer tokens
pub trait TokenIssuer: Send + Sync {
    fn mint(&self) -> String;
}

/// Random UUID v4 tokens from the OS generator. No collision check.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenIssuer;

impl TokenIssuer for RandomTokenIssuer {
    fn mint(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Integer participant ids handed out 1, 2, 3, ... in name first-seen order
#[derive(Debug, Clone, Default)]
pub struct ParticipantIds {
    ordered: Vec<(String, i32)>,
    by_name: HashMap<String, i32>,
}

impl ParticipantIds {
    /// Assign ids over every row, giver before receiver
    pub fn assign(pairs: &[PairRow]) -> AppResult<Self> {
        let mut ids = Self::default();
        for pair in pairs {
            ids.get_or_assign(&pair.giver)?;
            ids.get_or_assign(&pair.receiver)?;
        }
        Ok(ids)
    }

    fn get_or_assign(&mut self, name: &str) -> AppResult<i32> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(id);
        }
        let id = i32::try_from(self.ordered.len() + 1)
            .map_err(|_| AppError::Validation("too many participants".to_string()))?;
        self.by_name.insert(name.to_string(), id);
        self.ordered.push((name.to_string(), id));
        Ok(id)
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    /// `(name, id)` in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.ordered.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TokenImportReport {
    pub participant_ids: ParticipantIds,
    pub roster: TokenRoster,
    pub manifest: LinkManifest,
    pub skipped_rows: Vec<SkippedRow>,
}

/// Token-model import: full replace of pairs, tokens and participant wishlists
pub struct TokenImportService {
    tokens: Arc<dyn TokenStore>,
    issuer: Arc<dyn TokenIssuer>,
    locks: Arc<NamedLocks>,
    base_url: String,
}

impl TokenImportService {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        issuer: Arc<dyn TokenIssuer>,
        locks: Arc<NamedLocks>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            issuer,
            locks,
            base_url: base_url.into(),
        }
    }

    /// Build the roster for `pairs`: one pair and token per row, one empty
    /// wishlist per distinct giver.
    pub fn build_roster(&self, pairs: &[PairRow]) -> AppResult<(ParticipantIds, TokenRoster)> {
        let ids = ParticipantIds::assign(pairs)?;
        let mut roster = TokenRoster::default();

        for row in pairs {
            let (giver_id, receiver_id) = match (ids.get(&row.giver), ids.get(&row.receiver)) {
                (Some(g), Some(r)) => (g, r),
                _ => {
                    return Err(AppError::Message(format!(
                        "participant id missing for {} -> {}",
                        row.giver, row.receiver
                    )))
                }
            };

            roster.pairs.push(Pair {
                giver_id,
                giver_name: row.giver.clone(),
                receiver_id,
                receiver_name: row.receiver.clone(),
            });
            roster
                .tokens
                .push(AuthToken::new(self.issuer.mint(), giver_id));
            if !roster.wishlist_owners.contains(&giver_id) {
                roster.wishlist_owners.push(giver_id);
            }
        }

        Ok((ids, roster))
    }

    /// Links for every name holding a token, in name first-seen order
    pub fn build_manifest(&self, ids: &ParticipantIds, roster: &TokenRoster) -> AppResult<LinkManifest> {
        let token_by_giver: HashMap<i32, &str> = roster
            .tokens
            .iter()
            .map(|t| (t.giver_id, t.token.as_str()))
            .collect();

        let mut manifest = LinkManifest::default();
        for (name, id) in ids.iter() {
            if let Some(token) = token_by_giver.get(&id) {
                manifest.push(name, token_link(&self.base_url, token)?);
            }
        }
        Ok(manifest)
    }

    /// Parse, build and persist a new roster, invalidating every earlier token
    pub async fn import(&self, raw_csv: &str) -> AppResult<TokenImportReport> {
        let parsed = parse_pairs_csv(raw_csv)?;
        let (participant_ids, roster) = self.build_roster(&parsed.pairs)?;
        let manifest = self.build_manifest(&participant_ids, &roster)?;

        info!("Name -> ID mapping:");
        for (name, id) in participant_ids.iter() {
            info!("  {} : {}", id, name);
        }

        let _guard = self.locks.acquire(TOKEN_ROSTER_LOCK_KEY).await;
        info!("Replacing existing pairs, tokens and wishlists...");
        self.tokens.replace_all(&roster).await?;

        for pair in &roster.pairs {
            info!("{} -> {}", pair.giver_name, pair.receiver_name);
        }
        info!(
            "Import complete: {} pairs, {} tokens, {} links",
            roster.pairs.len(),
            roster.tokens.len(),
            manifest.len()
        );

        Ok(TokenImportReport {
            participant_ids,
            roster,
            manifest,
            skipped_rows: parsed.skipped,
        })
    }
}
