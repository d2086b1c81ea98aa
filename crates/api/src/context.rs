use rolegate_auth::Principal;

/// Principal context for a request.
///
/// Always present on protected routes; empty when the request carried no
/// usable bearer token. Whether that is acceptable is decided by the access
/// gate, not by the middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Option<Principal>,
}

impl PrincipalContext {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}
