//! # Keel Kernel
//!
//! The resolution engine behind per-file architecture enforcement: given a
//! registry of architecture nodes and mixins, flatten the rules that apply
//! to one architecture id into a single deterministic constraint set, with
//! an audit trail for every override and conflict decision.
//!
//! ## Pipeline
//!
//! ```text
//! Registry               ← immutable nodes + mixins (built externally)
//!     │
//! InheritanceChain       ← inherits walk, root-first, cycle-checked
//!     │
//! Accumulator            ← ancestors → registry mixins → inline mixins → self
//!     │
//! Reconciler             ← allow/forbid cancellation, deny-wins, unresolved pairs
//!     │
//! FlattenedArchitecture  ← constraints + hints + pointers + ConflictReport[]
//! ```
//!
//! The engine performs no I/O, holds no state across calls, and never
//! mutates the registry, so one `Registry` may back any number of
//! concurrent resolutions. Semantic disagreements between rule sources are
//! returned as [`ConflictReport`] data; only structural registry defects
//! (unknown ids, cycles) are errors.

pub mod accumulate;
pub mod chain;
pub mod conflict;
pub mod constraint;
pub mod error;
pub mod mixin_conflict;
pub mod reconcile;
pub mod registry;
pub mod resolve;

pub use chain::build_inheritance_chain;
pub use conflict::{ConflictReport, ConflictSeverity, UNRESOLVED};
pub use constraint::{
    Constraint, Pointer, ResolvedConstraint, RuleKind, RuleValue, Severity, constraint_key,
    extract_pattern,
};
pub use error::{ResolveError, error_code};
pub use registry::{ArchId, ArchitectureNode, InlineMode, Mixin, MixinId, Registry};
pub use resolve::{FlattenedArchitecture, Resolution, resolve_architecture, semantic_digest};
