//! Allerta API service.
//!
//! REST endpoints for emergency reports and the users who file them. Reads
//! are public; writes to emergencies and password changes take a bearer
//! token issued by `POST /api/auth/login`.
//!
//! # Configuration
//!
//! See [`config::AllertaApiConfig`]. The token signing secret is mandatory.

pub mod auth;
pub mod config;
pub mod context;
pub mod server;

pub(crate) mod error;
pub(crate) mod extract;
pub(crate) mod handlers;
