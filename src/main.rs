//! Command line front end: runs a program file (or stdin) in batch mode, or
//! reads one mini-program per line in interactive mode.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use naivelog::{parse_program, Atom, DatalogEngine};

#[derive(Debug, Parser)]
#[command(name = "naivelog", about = "Naive bottom-up Datalog interpreter", version)]
struct Cli {
    /// Program file to run (reads stdin when omitted)
    file: Option<PathBuf>,
    /// Evaluate each input line as its own program against one engine
    #[arg(short, long)]
    interactive: bool,
    /// Answer output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `learns(nidoking, icebeam).`
    Text,
    /// One JSON-encoded atom per line
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = if cli.interactive {
        interactive(&cli)
    } else {
        batch(&cli)
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn read_source(cli: &Cli) -> anyhow::Result<String> {
    match &cli.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read program file '{}'", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read program from stdin")?;
            Ok(source)
        }
    }
}

/// Parse everything first; nothing runs if any of it is malformed
fn batch(cli: &Cli) -> anyhow::Result<ExitCode> {
    let source = read_source(cli)?;
    let commands = match parse_program(&source) {
        Ok(commands) => commands,
        Err(err) => {
            eprintln!("parse error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    log::debug!("parsed {} command(s)", commands.len());

    let mut engine = DatalogEngine::new();
    let mut out = io::stdout().lock();
    for answer in engine.run(commands) {
        match answer {
            Ok(atom) => print_answer(&mut out, &atom, cli.format)?,
            Err(err) => {
                out.flush()?;
                eprintln!("error: {err}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn interactive(cli: &Cli) -> anyhow::Result<ExitCode> {
    if let Some(path) = &cli.file {
        anyhow::bail!(
            "interactive mode reads stdin; drop '{}' or --interactive",
            path.display()
        );
    }

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    let mut engine = DatalogEngine::new();
    let mut lines = stdin.lock().lines();

    loop {
        if prompt {
            print!("?- ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;

        let commands = match parse_program(&line) {
            Ok(commands) => commands,
            Err(err) => {
                eprintln!("parse error: {err}");
                continue;
            }
        };

        let mut out = io::stdout().lock();
        for answer in engine.run(commands) {
            match answer {
                Ok(atom) => print_answer(&mut out, &atom, cli.format)?,
                Err(err) => eprintln!("error: {err}"),
            }
        }
        out.flush()?;
    }

    if prompt {
        println!();
    }
    Ok(ExitCode::SUCCESS)
}

fn print_answer(out: &mut impl Write, atom: &Atom, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Text => writeln!(out, "{atom}.")?,
        Format::Json => writeln!(out, "{}", serde_json::to_string(atom)?)?,
    }
    Ok(())
}
