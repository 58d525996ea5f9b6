//! Domain models for the gift exchange.
//!
//! Two identity models live side by side: the slug-routed one
//! (`FamilyGroup` / `Member` / `Assignment`) and the token-routed one
//! (`Pair` / `AuthToken`) keyed by integer participant ids. Both share
//! the `Wishlist` table through `WishlistKey`.

pub mod assignment;
pub mod family_group;
pub mod member;
pub mod pair;
pub mod wishlist;

// Re-export all models for convenient access
pub use assignment::Assignment;
pub use family_group::FamilyGroup;
pub use member::Member;
pub use pair::{AuthToken, Pair};
pub use wishlist::{Wishlist, WishlistKey};
