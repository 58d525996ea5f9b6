use super::identity_service::ParticipantDirectory;
use crate::error::AppResult;
use crate::ingest::PairRow;
use crate::models::{Assignment, FamilyGroup};
use crate::repositories::AssignmentStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a parsed pair produced no assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroppedPairReason {
    /// Giver or receiver has no member in the directory
    UnresolvedMember,
    /// Giver's member already gives in this run (names merged onto one slug)
    GiverAlreadyAssigned,
}

#[derive(Debug, Clone)]
pub struct DroppedPair {
    pub pair: PairRow,
    pub reason: DroppedPairReason,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentReport {
    pub assignments: Vec<Assignment>,
    pub dropped: Vec<DroppedPair>,
}

/// Rebuilds a family's assignment set from parsed pairs
pub struct AssignmentService {
    assignments: Arc<dyn AssignmentStore>,
}

impl AssignmentService {
    pub fn new(assignments: Arc<dyn AssignmentStore>) -> Self {
        Self { assignments }
    }

    /// Replace every assignment of `family` with the edges in `pairs`.
    ///
    /// Pairs that cannot be resolved are dropped with a warning; the rest are
    /// swapped in as one unit by the store.
    pub async fn rebuild(
        &self,
        family: &FamilyGroup,
        directory: &ParticipantDirectory,
        pairs: &[PairRow],
    ) -> AppResult<AssignmentReport> {
        let mut edges = Vec::with_capacity(pairs.len());
        let mut givers = HashSet::new();
        let mut dropped = Vec::new();

        for pair in pairs {
            let (giver, receiver) = match (directory.get(&pair.giver), directory.get(&pair.receiver)) {
                (Some(giver), Some(receiver)) => (giver, receiver),
                _ => {
                    warn!(
                        "Skipping assignment {} -> {} (missing member record)",
                        pair.giver, pair.receiver
                    );
                    dropped.push(DroppedPair {
                        pair: pair.clone(),
                        reason: DroppedPairReason::UnresolvedMember,
                    });
                    continue;
                }
            };

            if !givers.insert(giver.id) {
                warn!(
                    "Skipping assignment {} -> {} (member {} already gives)",
                    pair.giver, pair.receiver, giver.slug
                );
                dropped.push(DroppedPair {
                    pair: pair.clone(),
                    reason: DroppedPairReason::GiverAlreadyAssigned,
                });
                continue;
            }

            if giver.id == receiver.id {
                warn!("Member {} is assigned to themselves", giver.slug);
            }

            edges.push((giver.id, receiver.id));
        }

        let assignments = self.assignments.replace_for_family(family, &edges).await?;
        info!(
            "Replaced assignments for family {}: {} created, {} dropped",
            family.slug,
            assignments.len(),
            dropped.len()
        );

        Ok(AssignmentReport {
            assignments,
            dropped,
        })
    }
}
