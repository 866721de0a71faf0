//! The boundary to the object-graph introspection capability.

use crate::error::DiagnosticsError;

/// Opaque object identifier (typically an address) handed out by the capability.
pub type ObjectId = u64;

/// One row of the new-objects report: a type name plus the ids created since
/// the previous baseline.
///
/// Row order is the capability's creation-time order; it is the tie-break
/// order for everything derived downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDelta {
    pub type_name: String,
    pub object_ids: Vec<ObjectId>,
}

impl TypeDelta {
    #[must_use]
    pub fn new(type_name: impl Into<String>, object_ids: Vec<ObjectId>) -> Self {
        Self { type_name: type_name.into(), object_ids }
    }

    /// Number of new objects in this row.
    #[must_use]
    pub fn count(&self) -> usize {
        self.object_ids.len()
    }
}

/// Row ordering for [`ObjectGraph::new_object_ids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationOrder {
    /// Oldest allocations first.
    OldestFirst,
    /// Newest allocations first.
    NewestFirst,
}

/// Introspection capability driven by the snapshot recorder.
///
/// Implementations wrap a heap-introspection library. The recorder never
/// inspects resolved objects; it only forwards them from
/// [`resolve_objects`](Self::resolve_objects) into the two renderers, so
/// [`Object`](Self::Object) stays fully opaque.
pub trait ObjectGraph {
    /// Live-object handle produced by [`resolve_objects`](Self::resolve_objects).
    type Object;

    /// Reports at most `limit` rows of objects created since the previous
    /// call, then resets the internal baseline so the next call only sees
    /// younger allocations.
    ///
    /// # Errors
    ///
    /// Introspection failures propagate to the recorder unhandled.
    fn new_object_ids(
        &mut self,
        limit: usize,
        order: CreationOrder,
    ) -> Result<Vec<TypeDelta>, DiagnosticsError>;

    /// Resolves ids to live object handles. Ids whose objects have already
    /// been reclaimed may be dropped from the result.
    ///
    /// # Errors
    ///
    /// Introspection failures propagate to the recorder unhandled.
    fn resolve_objects(&self, ids: &[ObjectId]) -> Result<Vec<Self::Object>, DiagnosticsError>;

    /// Renders the graph of references pointing *at* `objects` as DOT text,
    /// following edges up to `max_depth`.
    ///
    /// # Errors
    ///
    /// Introspection failures propagate to the recorder unhandled.
    fn render_back_references(
        &self,
        objects: &[Self::Object],
        max_depth: usize,
    ) -> Result<String, DiagnosticsError>;

    /// Renders the graph of references going *out of* `objects` as DOT text,
    /// following edges up to `max_depth`.
    ///
    /// # Errors
    ///
    /// Introspection failures propagate to the recorder unhandled.
    fn render_forward_references(
        &self,
        objects: &[Self::Object],
        max_depth: usize,
    ) -> Result<String, DiagnosticsError>;
}
