use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "keel",
    about = "Keel: declared architecture rules, resolved deterministically per file",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Severity threshold at which conflicts fail the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DenySeverity {
    Warning,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flatten one architecture id into its effective rule set
    Resolve {
        /// Architecture id to resolve
        arch_id: String,

        /// Path to the registry YAML
        #[arg(long, default_value = ".keel/registry.yaml")]
        registry: String,

        /// Inline mixin id, applied after registry-declared mixins (repeatable)
        #[arg(long = "mixin")]
        mixins: Vec<String>,

        /// Exit non-zero when any conflict reaches this severity
        #[arg(long, value_enum)]
        deny_conflicts: Option<DenySeverity>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Explain the precedence trace for one rule of an architecture
    Explain {
        /// Architecture id to resolve
        arch_id: String,

        /// Rule to trace (e.g. forbid_import)
        #[arg(long)]
        rule: String,

        /// Path to the registry YAML
        #[arg(long, default_value = ".keel/registry.yaml")]
        registry: String,

        /// Inline mixin id (repeatable)
        #[arg(long = "mixin")]
        mixins: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check registry cross-references and report every defect
    Check {
        /// Path to the registry YAML
        #[arg(long, default_value = ".keel/registry.yaml")]
        registry: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a file's @arch tag and resolve the tagged architecture
    Tag {
        /// Source file to scan for an @arch marker
        file: String,

        /// Path to the registry YAML
        #[arg(long, default_value = ".keel/registry.yaml")]
        registry: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
