use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cask",
    about = "Content-addressed storage: payloads keyed by their digest, plus named pointers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted before or after any subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Store root (overrides CASK_DIR and the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Use a throwaway in-memory store
    #[arg(long, global = true)]
    pub memory: bool,

    /// TOML file with [store] and [server] sections
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the store directories
    Init,
    /// Add content and print its identifier
    Add(AddArgs),
    /// Write the content stored under an identifier to stdout
    Get(GetArgs),
    /// Bind a pointer to a content identifier
    Put(PutArgs),
    /// Remove an entry
    Rm(RmArgs),
    /// List identifiers starting with a prefix
    Find(FindArgs),
    /// Check whether an entry exists
    Contains(ContainsArgs),
    /// Print a fresh random identifier, e.g. for a new pointer name
    RandomId,
    /// Print the content identifier a pointer is bound to
    Resolve(ResolveArgs),
    /// Serve the store over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// File to add; stdin when neither FILE nor --text is given
    #[arg(conflicts_with = "text")]
    pub file: Option<PathBuf>,
    /// Add this text instead of a file
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Content identifier or unique prefix
    pub id: String,
    /// Treat ID as a pointer and follow it
    #[arg(short, long)]
    pub pointer: bool,
}

#[derive(Args)]
pub struct PutArgs {
    /// Pointer identifier (full length)
    pub pointer: String,
    /// Content identifier or unique prefix
    pub content: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Identifier or unique prefix
    pub id: String,
    #[arg(short, long)]
    pub pointer: bool,
}

#[derive(Args)]
#[command(group(ArgGroup::new("db").args(["pointer", "content"])))]
pub struct FindArgs {
    #[arg(default_value = "")]
    pub prefix: String,
    /// Search only the pointer database
    #[arg(short, long)]
    pub pointer: bool,
    /// Search only the content database
    #[arg(short, long)]
    pub content: bool,
}

#[derive(Args)]
pub struct ContainsArgs {
    /// Full identifier
    pub id: String,
    #[arg(short, long)]
    pub pointer: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Pointer identifier or unique prefix
    pub pointer: String,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on, e.g. tcp://127.0.0.1:7474
    #[arg(long)]
    pub bind: Option<String>,
}
