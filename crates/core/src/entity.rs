//! Entity trait: identity that survives state changes.

/// An object whose identity is its id, not its attributes.
///
/// A user stays the same user when its role or activation flag changes.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
