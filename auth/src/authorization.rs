use thiserror::Error;

use crate::jwt::Identity;

/// What an operation demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    AnyAuthenticated,
    AdminOnly,
    BusinessOrAdmin,
    /// Admin, or the account owning the resource.
    OwnerOrAdmin(String),
}

/// Reasons an authorization check can deny access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Admin privileges required")]
    AdminRequired,

    #[error("Business account or admin privileges required")]
    BusinessOrAdminRequired,

    #[error("Only the owner or an admin may perform this operation")]
    OwnerOrAdminRequired,
}

/// Decide whether `identity` satisfies `requirement`.
///
/// Side-effect free. Role flags are taken from the identity as issued; they
/// are not re-checked against the stored account.
pub fn authorize(
    identity: Option<&Identity>,
    requirement: &Requirement,
) -> Result<(), AuthorizationError> {
    let identity = identity.ok_or(AuthorizationError::Unauthenticated)?;

    match requirement {
        Requirement::AnyAuthenticated => Ok(()),
        Requirement::AdminOnly if identity.is_admin() => Ok(()),
        Requirement::AdminOnly => Err(AuthorizationError::AdminRequired),
        Requirement::BusinessOrAdmin if identity.is_business() || identity.is_admin() => Ok(()),
        Requirement::BusinessOrAdmin => Err(AuthorizationError::BusinessOrAdminRequired),
        Requirement::OwnerOrAdmin(owner_id) => {
            if identity.is_admin() || same_subject(&identity.subject, owner_id) {
                Ok(())
            } else {
                Err(AuthorizationError::OwnerOrAdminRequired)
            }
        }
    }
}

fn same_subject(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
