//! Keel CLI: the `keel` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            arch_id,
            registry,
            mixins,
            deny_conflicts,
            json,
        } => commands::resolve::run(arch_id, registry, mixins, deny_conflicts, json),

        Commands::Explain {
            arch_id,
            rule,
            registry,
            mixins,
            json,
        } => commands::explain::run(arch_id, rule, registry, mixins, json),

        Commands::Check { registry, json } => commands::check::run(registry, json),

        Commands::Tag {
            file,
            registry,
            json,
        } => commands::tag::run(file, registry, json),
    }
}
