pub mod assignment_service;
pub mod identity_service;
pub mod locks;
pub mod lookup_service;
pub mod seeding;
pub mod token_service;
pub mod wishlist_service;

pub use assignment_service::{AssignmentReport, AssignmentService, DroppedPair, DroppedPairReason};
pub use identity_service::{plan_members, IdentityReport, IdentityService, ParticipantDirectory, PlannedMember};
pub use locks::NamedLocks;
pub use lookup_service::{LookupService, MemberView, RecipientWishlist, WhoAmI};
pub use seeding::{FamilySeedReport, SeedService, SeededMember};
pub use token_service::{ParticipantIds, RandomTokenIssuer, TokenImportReport, TokenImportService, TokenIssuer};
pub use wishlist_service::WishlistService;
