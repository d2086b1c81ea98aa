//! `rolegate-core` — domain primitives shared by every other crate.
//!
//! Nothing in here knows about HTTP, storage or tokens.

pub mod email;
pub mod entity;
pub mod error;
pub mod id;
pub mod username;
pub mod value_object;

pub use email::EmailAddress;
pub use entity::Entity;
pub use error::DomainError;
pub use id::UserId;
pub use username::Username;
pub use value_object::ValueObject;
