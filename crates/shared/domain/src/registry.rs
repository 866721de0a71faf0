//! Type-erased registry primitives for feature slices.
//!
//! Feature crates initialize into an [`InitializedSlice`]; the hosting
//! application keeps the collection and uses
//! [`InitializedSlice::downcast_ref`] to get concrete state back out.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// Shared, thread-safe feature state that can live behind a trait object.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Escape hatch for downcasting from the trait object.
    fn as_any(&self) -> &dyn Any;
}

/// One initialized feature, tagged with the concrete state's [`TypeId`].
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    /// Boxes a concrete feature state.
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), state: Box::new(state) }
    }

    /// Whether this slice holds state of type `T`.
    #[must_use]
    pub fn holds<T: FeatureSlice>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Borrows the held state as its concrete type.
    #[must_use]
    pub fn downcast_ref<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}
