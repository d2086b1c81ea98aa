//! `rolegate-auth` — authentication and authorization boundary.
//!
//! Role model, user record, credential handling, the repository contract,
//! pluggable authentication backends, token issuance and the access gate.
//! Nothing here depends on HTTP or on a concrete storage engine.

pub mod authorize;
pub mod backend;
pub mod claims;
pub mod credential;
pub mod directory;
pub mod error;
pub mod external;
pub mod local;
pub mod principal;
pub mod provisioning;
pub mod repository;
pub mod roles;
pub mod service;
pub mod token;
pub mod user;

pub use authorize::{authorize, AuthzError, Operation, ResourceKind};
pub use backend::AuthBackend;
pub use claims::{validate_claims, JwtClaims, TokenError, TokenType};
pub use credential::{Credential, CredentialError, PasswordHash};
pub use directory::{provision_superuser, CreateUserInput, DirectoryError, UserDirectory, UserView};
pub use error::AuthError;
pub use external::{
    ExternalAuthenticator, ExternalIdentity, ExternalOutcome, StubExternalAuthenticator,
};
pub use local::LocalPasswordBackend;
pub use principal::Principal;
pub use provisioning::AutoProvisioningBackend;
pub use repository::{RepositoryError, UserRepository};
pub use roles::Role;
pub use service::AuthService;
pub use token::{JwtValidator, TokenConfig, TokenIssuer, TokenPair};
pub use user::{NewUser, User, UserUpdate};

pub use rolegate_core::{EmailAddress, UserId, Username};
