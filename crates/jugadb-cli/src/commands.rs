use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "jugadb")]
#[command(about = "jugadb is a single-node relational database engine with a SQL-like query language", long_about = None, version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "open", about = "Open a database directory and start the interactive shell")]
    Open(OpenArgs),
    #[command(name = "exec", about = "Run a single JQL statement against a database and exit")]
    Exec(ExecArgs),
    #[command(name = "cluster", about = "List the databases registered in a cluster.jbconf file")]
    Cluster(ClusterArgs),
}

#[derive(Debug, Parser)]
pub struct OpenArgs {
    /// Directory holding the database's catalog, heap, and B-tree files.
    pub path: PathBuf,
}

#[derive(Debug, Parser)]
pub struct ExecArgs {
    /// Directory holding the database's catalog, heap, and B-tree files.
    pub path: PathBuf,
    /// The JQL statement to execute.
    pub query: String,
}

#[derive(Debug, Parser)]
pub struct ClusterArgs {
    /// Path to the cluster.jbconf file.
    #[arg(default_value = "cluster.jbconf")]
    pub config: PathBuf,
}
