//! Authorization predicates.
//!
//! Each check runs before the storage call it guards and does not touch
//! storage itself, so handlers can fail fast and the rules can be tested on
//! their own.

use crate::caller::{Caller, CallerError, Role};

/// Only the user themself may change their password. Identifiers are ULIDs,
/// which compare without regard to case.
pub fn ensure_can_change_password(caller: &Caller, target_id: &str) -> Result<(), CallerError> {
    let identity = caller.identity()?;
    if !identity.id.eq_ignore_ascii_case(target_id) {
        return Err(CallerError::forbidden(
            "You cannot change another user's password",
        ));
    }
    Ok(())
}

/// Operators are never deletable through the API.
pub fn ensure_can_delete_user(target_role: Role) -> Result<(), CallerError> {
    if target_role == Role::Operator {
        return Err(CallerError::forbidden("You cannot delete an operator"));
    }
    Ok(())
}

/// Mutating emergencies requires any authenticated caller.
pub fn ensure_can_manage_emergencies(caller: &Caller) -> Result<(), CallerError> {
    caller.identity().map(|_| ())
}
