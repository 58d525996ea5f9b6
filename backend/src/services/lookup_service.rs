use super::wishlist_service::WishlistService;
use crate::error::{AppError, AppResult};
use crate::identity::{
    ParticipantIdentity, ParticipantOrigin, Participant, SlugPath, SlugPathResolver, TokenResolver,
};
use crate::models::{AuthToken, FamilyGroup, Member, Wishlist, WishlistKey};
use crate::repositories::Stores;
use serde::Serialize;
use uuid::Uuid;

/// A participant with both wishlists loaded
#[derive(Debug, Clone)]
pub struct LoadedParticipant {
    pub participant: Participant,
    pub own_wishlist: String,
    /// Present exactly when the participant has a recipient
    pub recipient_wishlist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user_name: String,
    pub recipient_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientWishlist {
    pub recipient_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverView {
    pub member: Member,
    pub wishlist: String,
}

/// Everything the member page shows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub family: FamilyGroup,
    pub member: Member,
    pub wishlist: String,
    pub receiver: Option<ReceiverView>,
}

/// Answers "who am I / who did I get / what did they ask for"
pub struct LookupService {
    slug_paths: SlugPathResolver,
    tokens: TokenResolver,
    wishlists: WishlistService,
}

impl LookupService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            slug_paths: SlugPathResolver::new(
                stores.families.clone(),
                stores.members.clone(),
                stores.assignments.clone(),
            ),
            tokens: TokenResolver::new(stores.tokens.clone()),
            wishlists: WishlistService::new(stores.wishlists.clone(), stores.members.clone()),
        }
    }

    /// Resolve with `resolver`, then load the participant's and recipient's wishlists
    pub async fn load<R>(&self, resolver: &R, credential: &R::Credential) -> AppResult<LoadedParticipant>
    where
        R: ParticipantIdentity,
    {
        let participant = resolver.resolve(credential).await?;
        let own_wishlist = self.wishlists.read(participant.wishlist_key).await?;
        let recipient_wishlist = match &participant.recipient {
            Some(recipient) => Some(self.wishlists.read(recipient.wishlist_key).await?),
            None => None,
        };

        Ok(LoadedParticipant {
            participant,
            own_wishlist,
            recipient_wishlist,
        })
    }

    fn require_token(token: Option<&str>) -> AppResult<&str> {
        match token.map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AppError::Unauthenticated),
        }
    }

    /// Token possession check without loading anything else
    pub async fn authenticate(&self, token: Option<&str>) -> AppResult<AuthToken> {
        self.tokens.authenticate(token).await
    }

    /// Giver and recipient names for a token
    pub async fn whoami(&self, token: Option<&str>) -> AppResult<WhoAmI> {
        let participant = self.tokens.resolve(Self::require_token(token)?).await?;
        let recipient_name = participant
            .recipient
            .map(|r| r.name)
            .unwrap_or_default();

        Ok(WhoAmI {
            user_name: participant.display_name,
            recipient_name,
        })
    }

    /// The token holder's own wishlist; needs no pair
    pub async fn my_wishlist(&self, token: Option<&str>) -> AppResult<String> {
        let auth = self.tokens.authenticate(token).await?;
        self.wishlists
            .read(WishlistKey::Participant(auth.giver_id))
            .await
    }

    pub async fn save_my_wishlist(&self, token: Option<&str>, content: &str) -> AppResult<Wishlist> {
        let auth = self.tokens.authenticate(token).await?;
        self.save_for_token(&auth, content).await
    }

    /// Save for a token already returned by [`Self::authenticate`]
    pub async fn save_for_token(&self, auth: &AuthToken, content: &str) -> AppResult<Wishlist> {
        self.wishlists
            .save(WishlistKey::Participant(auth.giver_id), content)
            .await
    }

    /// The token holder's recipient and what they asked for
    pub async fn recipient_wishlist(&self, token: Option<&str>) -> AppResult<RecipientWishlist> {
        let loaded = self.load(&self.tokens, Self::require_token(token)?).await?;
        match (loaded.participant.recipient, loaded.recipient_wishlist) {
            (Some(recipient), Some(content)) => Ok(RecipientWishlist {
                recipient_name: recipient.name,
                content,
            }),
            _ => Err(AppError::NotFound(
                "No pair found for this participant".to_string(),
            )),
        }
    }

    /// Family, member, own wishlist and (when assigned) the receiver with theirs
    pub async fn member_view(&self, family_slug: &str, member_slug: &str) -> AppResult<MemberView> {
        let path = SlugPath::new(family_slug, member_slug);
        let loaded = self.load(&self.slug_paths, &path).await?;

        let (family, member) = match loaded.participant.origin {
            ParticipantOrigin::Member { family, member } => (family, member),
            ParticipantOrigin::Token { .. } => {
                return Err(AppError::Message(
                    "slug lookup resolved a token participant".to_string(),
                ))
            }
        };

        let receiver = match (loaded.participant.recipient, loaded.recipient_wishlist) {
            (Some(recipient), Some(wishlist)) => match recipient.member {
                Some(member) => Some(ReceiverView { member, wishlist }),
                None => None,
            },
            _ => None,
        };

        Ok(MemberView {
            family,
            member,
            wishlist: loaded.own_wishlist,
            receiver,
        })
    }

    /// Save the wishlist of the member addressed by a slug pair
    pub async fn save_wishlist_by_slug(
        &self,
        family_slug: &str,
        member_slug: &str,
        content: &str,
    ) -> AppResult<Wishlist> {
        let path = SlugPath::new(family_slug, member_slug);
        let (_, member) = self.slug_paths.resolve_member(&path).await?;
        self.wishlists
            .save(WishlistKey::Member(member.id), content)
            .await
    }

    pub async fn save_wishlist_by_member_id(&self, member_id: Uuid, content: &str) -> AppResult<Wishlist> {
        self.wishlists.save_for_member(member_id, content).await
    }
}
