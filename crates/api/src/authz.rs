//! API-side access checks.
//!
//! The user directory gates its own operations; this covers requests that
//! fail before the directory is reached (e.g. an unparseable id).

use rolegate_auth::{authorize, AuthzError, Operation, ResourceKind};

use crate::context::PrincipalContext;

/// Run the user directory gate for `operation` in the current request
/// context.
pub fn authorize_directory(
    principal: &PrincipalContext,
    operation: Operation,
) -> Result<(), AuthzError> {
    authorize(principal.principal(), ResourceKind::UserDirectory, operation)
}
