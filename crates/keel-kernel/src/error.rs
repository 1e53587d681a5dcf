//! Structural resolution errors.
//!
//! These are registry configuration defects: the computation cannot
//! proceed and fails fast. Semantic conflicts never surface here; they are
//! returned as [`crate::ConflictReport`] data alongside a successful
//! resolution.

/// Machine-readable codes carried by [`ResolveError`], for callers that
/// dispatch on failure kind rather than message text.
pub mod error_code {
    pub const UNKNOWN_ARCH: &str = "UNKNOWN_ARCH";
    pub const MISSING_MIXIN: &str = "MISSING_MIXIN";
    pub const CIRCULAR_INHERITANCE: &str = "CIRCULAR_INHERITANCE";
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The requested id, or an ancestor named by `inherits`, is absent
    /// from the registry's nodes.
    #[error("unknown architecture `{arch_id}`")]
    UnknownArch {
        arch_id: String,
        available: Vec<String>,
    },

    /// A mixin referenced by a node's `mixins` list or by an inline tag is
    /// absent from the registry's mixins.
    #[error("unknown mixin `{mixin_id}` (referenced by `{referenced_by}`)")]
    MissingMixin {
        mixin_id: String,
        referenced_by: String,
        available: Vec<String>,
    },

    /// The `inherits` walk revisited a node. `path` is the full walk
    /// including the repeated id.
    #[error("circular inheritance: {}", .path.join(" -> "))]
    CircularInheritance { path: Vec<String> },
}

impl ResolveError {
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::UnknownArch { .. } => error_code::UNKNOWN_ARCH,
            ResolveError::MissingMixin { .. } => error_code::MISSING_MIXIN,
            ResolveError::CircularInheritance { .. } => error_code::CIRCULAR_INHERITANCE,
        }
    }
}
