//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    completions::CompletionsArgs, generate::GenerateArgs, list::ListArgs,
    match_schema::MatchArgs,
};

#[derive(Parser)]
#[command(name = "docgen")]
#[command(author, version, about = "Constraint template documentation generator")]
#[command(long_about = "Builds markdown documentation for a policy library from its test suites: \
every constraint template with its parameter schema and the example objects it allows and rejects.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log more detail to stderr (repeat for more)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the library documentation
    Generate(GenerateArgs),

    /// Summarize the templates found in the library
    List(ListArgs),

    /// Print the documentation for the constraint `match` section
    Match(MatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
