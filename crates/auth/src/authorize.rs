use serde::Serialize;
use thiserror::Error;

use crate::{Principal, Role};

/// Kinds of protected resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The user administration surface.
    UserDirectory,
}

/// Operations that can be attempted on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Retrieve,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ResourceKind::UserDirectory => f.write_str("user directory"),
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Operation::List => "list",
            Operation::Retrieve => "retrieve",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// No principal at all (missing, invalid or expired token).
    #[error("authentication required")]
    Unauthenticated,

    /// A principal exists but its role is not enough.
    #[error("forbidden: role {role} may not {operation} the {resource}")]
    Forbidden {
        role: Role,
        resource: ResourceKind,
        operation: Operation,
    },
}

/// Role a principal must hold to touch `resource`.
pub fn required_role(resource: ResourceKind) -> Role {
    match resource {
        ResourceKind::UserDirectory => Role::Root,
    }
}

/// Access gate.
///
/// - No IO
/// - No panics
/// - Same answer for every operation on a resource: there is no read-only
///   carve-out for lower roles.
pub fn authorize(
    principal: Option<&Principal>,
    resource: ResourceKind,
    operation: Operation,
) -> Result<(), AuthzError> {
    let Some(principal) = principal else {
        return Err(AuthzError::Unauthenticated);
    };

    if principal.role == required_role(resource) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: principal.role,
            resource,
            operation,
        })
    }
}
