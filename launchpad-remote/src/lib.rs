//! Blocking HTTP implementations of the launchpad collaborator traits.
//!
//! - [`PlayClient`] talks to the Google Play Developer API (v3)
//! - [`GithubClient`] talks to the GitHub GraphQL and REST APIs
//!
//! Both authenticate with a bearer token taken from configuration.

pub mod github;
pub mod http;
pub mod play;

pub use github::GithubClient;
pub use play::PlayClient;
