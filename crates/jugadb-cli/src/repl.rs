//! Dot-command shell (spec.md §4.8 "Dot-commands", §6 "Shell"). Lines
//! starting with `.` are handled here; everything else is forwarded
//! verbatim to `Executor::process`. Treated as a thin external wrapper —
//! spec.md §1 excludes the shell itself from the core.

use std::io::{self, BufRead, Write};

use jugadb_exec::functions::display_value;
use jugadb_exec::{ExecutionResult, Executor};
use jugadb_storage::Database;
use jugadb_types::schema::TableSchema;

enum DotOutcome {
    Quit,
    Handled,
}

pub fn run(db: &mut Database) -> io::Result<()> {
    let mut executor = Executor::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "jugadb shell. type .help for dot-commands, .quit to exit.")?;
    loop {
        write!(stdout, "jugadb> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('.') {
            match dispatch_dot_command(command, db, &mut stdout)? {
                DotOutcome::Quit => break,
                DotOutcome::Handled => continue,
            }
        }

        let result = executor.process(db, line);
        print_result(&result, &mut stdout)?;
    }
    Ok(())
}

fn dispatch_dot_command(command: &str, db: &Database, out: &mut impl Write) -> io::Result<DotOutcome> {
    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or("") {
        "quit" | "exit" => Ok(DotOutcome::Quit),
        "help" => {
            writeln!(out, ".schema [table]   show a table's columns, or list all tables")?;
            writeln!(out, ".help             show this message")?;
            writeln!(out, ".quit             exit the shell")?;
            Ok(DotOutcome::Handled)
        }
        "schema" => {
            match parts.next() {
                Some(name) => match db.find_table_schema_tc(name) {
                    Some(schema) => print_schema(schema, out)?,
                    None => writeln!(out, "no such table {name:?}")?,
                },
                None => {
                    for name in db.table_names() {
                        writeln!(out, "{name}")?;
                    }
                }
            }
            Ok(DotOutcome::Handled)
        }
        other => {
            writeln!(out, "unknown dot-command .{other}, try .help")?;
            Ok(DotOutcome::Handled)
        }
    }
}

fn print_schema(schema: &TableSchema, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", schema.table_name)?;
    for col in &schema.columns {
        let mut flags = Vec::new();
        if col.is_primary_key {
            flags.push("PRIMKEY");
        }
        if col.is_unique {
            flags.push("UNIQUE");
        }
        if col.is_not_null {
            flags.push("NOT NULL");
        }
        if col.is_foreign_key {
            flags.push("FRNKEY");
        }
        writeln!(out, "  {} {}{}", col.name, col.type_kind, if flags.is_empty() { String::new() } else { format!(" [{}]", flags.join(", ")) })?;
    }
    Ok(())
}

fn print_result(result: &ExecutionResult, out: &mut impl Write) -> io::Result<()> {
    if result.code != 0 {
        writeln!(out, "error: {}", result.message)?;
        return Ok(());
    }
    for row in &result.rows {
        let rendered = row.values.iter().map(display_value).collect::<Vec<_>>().join(" | ");
        writeln!(out, "{rendered}")?;
    }
    writeln!(out, "({} row(s))", result.row_count)
}
