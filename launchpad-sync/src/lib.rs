//! # launchpad-sync
//!
//! Reconciliation of store listings, images, track rollouts and branches
//! against their remote counterparts, plus opening pull requests.
//!
//! Distribution-console changes run inside one [`EditSession`], usually via
//! [`with_edit`], which commits only when every staged operation succeeded.

pub mod branches;
pub mod edit;
pub mod error;
pub mod images;
pub mod listing;
pub mod metadata;
pub mod pulls;
pub mod rollout;

pub use branches::{delete_branches, deletable, CleanupReport};
pub use edit::{with_edit, EditSession};
pub use error::SyncError;
pub use listing::ListingChanges;
pub use metadata::WriteResult;
pub use rollout::{BetaOutcome, BetaUpload, Promotion, VersionOverride};
