//! Persistence for Allerta: document models, schema validation, password
//! hashing and the storage backends.

pub mod models;
pub mod password;
pub mod storage;
