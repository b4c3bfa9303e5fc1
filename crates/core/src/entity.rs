//! Identity of records held in a result list.

/// A record with a stable identity that survives field updates.
///
/// Result lists use it to replace or drop items in place after a mutation.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
