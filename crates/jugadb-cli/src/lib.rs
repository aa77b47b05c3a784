//! REPL shell and cluster manager for jugadb (spec.md §1 "Out of scope" —
//! these are thin wrappers around the core's `(db, query_text) -> ExecutionResult`
//! contract).

use clap::Parser as _;

use jugadb_exec::Executor;
use jugadb_storage::Database;

use crate::commands::{Cli, Commands};

pub mod cluster;
pub mod commands;
mod logger;
pub mod repl;

pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let _ = logger::init();
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Open(args) => match Database::open(&args.path) {
            Ok(mut db) => match repl::run(&mut db) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("shell error: {e}");
                    1
                }
            },
            Err(e) => {
                eprintln!("failed to open {}: {e}", args.path.display());
                1
            }
        },
        Commands::Exec(args) => match Database::open(&args.path) {
            Ok(mut db) => {
                let result = Executor::new().process(&mut db, &args.query);
                if result.code != 0 {
                    eprintln!("error: {}", result.message);
                    return result.code;
                }
                for row in &result.rows {
                    let rendered = row
                        .values
                        .iter()
                        .map(jugadb_exec::functions::display_value)
                        .collect::<Vec<_>>()
                        .join(" | ");
                    println!("{rendered}");
                }
                0
            }
            Err(e) => {
                eprintln!("failed to open {}: {e}", args.path.display());
                1
            }
        },
        Commands::Cluster(args) => match cluster::load(&args.config) {
            Ok(clusters) => {
                for entry in clusters {
                    println!("{entry}");
                }
                0
            }
            Err(e) => {
                eprintln!("failed to read {}: {e}", args.config.display());
                1
            }
        },
    }
}
