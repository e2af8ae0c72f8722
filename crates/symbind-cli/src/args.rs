use std::path::PathBuf;

use clap::Parser;

/// CLI arguments for the symbind binary.
#[derive(Parser, Debug)]
#[command(name = "symbind", version, about = "Binds a batch of parsed compilation units against a classpath")]
pub struct CliArgs {
    /// Parsed compilation units to bind, each a JSON-encoded `CompUnit`.
    #[arg(required = true)]
    pub units: Vec<PathBuf>,

    /// Bootclasspath directories, searched before `--classpath` and before
    /// any ordinary classpath entry for every short name.
    #[arg(long = "bootclasspath", value_delimiter = ',')]
    pub bootclasspath: Vec<PathBuf>,

    /// Classpath directories, searched after the bootclasspath.
    #[arg(short = 'c', long = "classpath", value_delimiter = ',')]
    pub classpath: Vec<PathBuf>,

    /// Directory to resolve each unit's `source_file` against, for line/column
    /// positions in diagnostics. Without it, diagnostics report byte spans.
    #[arg(long = "source-root")]
    pub source_root: Option<PathBuf>,

    /// Print a one-line summary of every bound class (supertypes, field and
    /// method counts) after diagnostics.
    #[arg(long)]
    pub summary: bool,

    /// Exit non-zero only on diagnostics at error severity; by default any
    /// diagnostic (including warnings) fails the run.
    #[arg(long = "errors-only")]
    pub errors_only: bool,

    /// Increase log verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
