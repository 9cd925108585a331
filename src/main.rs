use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use flatdb::{DbError, InputType, MetaCommand, PrepareError, Result, Statement, Table};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// A single-table record store with an interactive prompt.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to the database file, created if missing
    filename: PathBuf,
}

struct InputBuffer {
    bytes: Vec<u8>,
    buffer: String,
}

enum ReadStatus {
    Line,
    NotUtf8,
    Eof,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            buffer: String::new(),
        }
    }

    fn read_input(&mut self) -> io::Result<ReadStatus> {
        self.bytes.clear();
        if io::stdin().lock().read_until(b'\n', &mut self.bytes)? == 0 {
            return Ok(ReadStatus::Eof);
        }

        let (text, status) = match std::str::from_utf8(&self.bytes) {
            Ok(text) => (Cow::Borrowed(text), ReadStatus::Line),
            Err(_) => (String::from_utf8_lossy(&self.bytes), ReadStatus::NotUtf8),
        };
        self.buffer = text.trim().to_string();
        Ok(status)
    }
}

fn print_prompt() -> io::Result<()> {
    print!("db > ");
    io::stdout().flush()
}

fn execute(table: &mut Table, statement: Statement) -> Result<()> {
    let result = match statement {
        Statement::Insert(row) => table.insert(&row),
        Statement::Select => table.scan().try_for_each(|row| {
            println!("{}", row?);
            Ok(())
        }),
    };

    match result {
        Ok(()) => println!("Executed."),
        Err(e) if e.is_fatal() => return Err(e),
        Err(DbError::TableFull) => println!("Error: Table full."),
        Err(DbError::NulByte { field }) => {
            debug!(field, "rejected insert");
            println!("String contains a NUL byte.");
        }
        Err(e) => {
            debug!(error = %e, "rejected insert");
            println!("String is too long.");
        }
    }
    Ok(())
}

fn repl(table: &mut Table) -> Result<()> {
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt()?;
        let status = input_buffer.read_input()?;
        let line = input_buffer.buffer.as_str();
        match status {
            ReadStatus::Eof => return Ok(()),
            ReadStatus::NotUtf8 => {
                println!("Unrecognized command: {line}");
                continue;
            }
            ReadStatus::Line if line.is_empty() => continue,
            ReadStatus::Line => {}
        }

        match InputType::parse(line) {
            InputType::Meta(MetaCommand::Exit) => return Ok(()),
            InputType::Meta(MetaCommand::Unrecognized) => {
                println!("Unrecognized meta-command: {line}");
            }
            InputType::Statement(Ok(statement)) => execute(table, statement)?,
            InputType::Statement(Err(PrepareError::Unrecognized)) => {
                println!("Unrecognized command: {line}")
            }
            InputType::Statement(Err(e)) => println!("{e}"),
        }
    }
}

/// Runs the session, then closes the table however the session ended.
fn run(mut table: Table) -> Result<()> {
    let session = repl(&mut table);
    let closed = table.close();
    session.and(closed)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Exit code 1 is the only report left if stderr is gone too.
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let table = match Table::open(&args.filename) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Unable to open file {}: {e}", args.filename.display());
            return ExitCode::FAILURE;
        }
    };

    match run(table) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
