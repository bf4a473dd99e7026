//! Password hashing. Passwords are stored as bcrypt hashes, never in clear.

pub use bcrypt::DEFAULT_COST;

/// Cheapest cost bcrypt accepts. Only suitable for tests.
pub const MIN_COST: u32 = 4;

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Checks `password` against a stored hash. A hash that cannot be parsed
/// counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}
