use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// refscope - .NET assembly dependency and version-conflict graphs
#[derive(Debug, Parser)]
#[command(name = "refscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit summaries as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the assembly reference graph from ildasm dumps or compiled modules.
    Modules {
        /// Directory to scan (.il/.txt dumps, .dll/.exe modules) or a single dump file.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Assembly table cache. Loaded instead of scanning if it exists, written otherwise.
        #[arg(long, value_name = "FILE")]
        cache: Option<PathBuf>,

        /// Configuration file with binding redirects (repeatable).
        #[arg(long, value_name = "FILE")]
        config: Vec<PathBuf>,

        /// Assembly to highlight as the root of the graph.
        #[arg(long, value_name = "NAME")]
        root: Option<String>,

        /// Disassembler used for .dll/.exe inputs.
        #[arg(long, value_name = "CMD", default_value = "ildasm")]
        ildasm: String,

        /// Write the DOT graph to this file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Render the graph without noise filtering or leaf collapsing.
        #[arg(long)]
        raw: bool,
    },

    /// Build the version-conflict graph from MSBuild detailed output.
    Conflicts {
        /// Build log file, or a project directory to build with detailed verbosity.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Stop after this many conflict reports.
        #[arg(value_name = "MAX_REPORTS")]
        max_reports: Option<usize>,

        /// Build tool used when PATH is a directory.
        #[arg(long, value_name = "CMD", default_value = "msbuild")]
        msbuild: String,

        /// Write the DOT graph to this file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Render the graph without noise filtering or leaf collapsing.
        #[arg(long)]
        raw: bool,
    },

    /// List the binding redirects of a configuration file.
    Redirects {
        /// Path to an app.config / web.config file.
        #[arg(value_name = "CONFIG")]
        path: PathBuf,
    },
}
