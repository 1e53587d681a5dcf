//! Registry boundary: YAML loading, structural checking, and inline tag
//! parsing.
//!
//! The kernel assumes a well-typed [`keel_kernel::Registry`]; this crate
//! is where that assumption is earned. Value shapes are validated once at
//! load time, so the resolver can match on rule tags without re-checking.

pub mod check;
pub mod load;
pub mod tag;

pub use check::{RegistryIssue, RegistryReport, check_registry, failure_class};
pub use load::{LoadError, REGISTRY_SCHEMA_VERSION, load_registry_path, load_registry_str};
pub use tag::{ArchTag, parse_arch_tag};
