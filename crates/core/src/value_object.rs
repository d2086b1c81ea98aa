//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// A value object is immutable and compared by its attributes. `Username` and
/// `EmailAddress` are value objects; `User` is an entity.
///
/// Implementors validate on construction, so holding one is proof the value
/// is well-formed.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
