//! Types shared between the Allerta API server, its storage layer and its
//! clients.
//!
//! - [`params`]: request bodies and query strings accepted by the API.
//! - [`views`]: response bodies returned by the API.
//! - [`caller`]: the identity attached to an authenticated request.
//! - [`policy`]: authorization predicates evaluated before mutating calls.

pub mod caller;
pub mod links;
pub mod params;
pub mod policy;
pub mod validation;
pub mod views;
