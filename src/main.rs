use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::filter::EnvFilter;

use regvm_bytecode::bytecode::assembly::parse_words;
use regvm_bytecode::{disassemble, render_table};

#[derive(Parser, Debug)]
#[command(name = "regvm-dis")]
#[command(about = "Disassemble a listing of instruction words")]
struct Args {
  /// File containing the word listing. Reads stdin if omitted.
  #[arg(value_name = "FILE")]
  file: Option<PathBuf>,

  /// Print one instruction per line instead of a table
  #[arg(short, long)]
  plain: bool,

  /// Show debug logging
  #[arg(short, long)]
  verbose: bool,
}

fn read_input(file: &Option<PathBuf>) -> io::Result<String> {
  match file {
    Some(path) => fs::read_to_string(path),
    None => {
      let mut text = String::new();
      io::stdin().read_to_string(&mut text)?;
      Ok(text)
    }
  }
}

fn main() -> ExitCode {
  let args = Args::parse();

  let default_level = if args.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    )
    .with_writer(io::stderr)
    .init();

  let text = match read_input(&args.file) {
    Ok(text) => text,
    Err(e) => {
      error!("could not read input: {}", e);
      return ExitCode::FAILURE;
    }
  };

  let words = match parse_words(&text) {
    Ok(words) => words,
    Err(e) => {
      error!("{}", e);
      return ExitCode::FAILURE;
    }
  };
  debug!(words = words.len(), "parsed listing");

  let lines = match disassemble(&words) {
    Ok(lines) => lines,
    Err(e) => {
      error!("{}", e);
      return ExitCode::FAILURE;
    }
  };

  if args.plain {
    for line in &lines {
      println!("{}", line);
    }
  } else {
    render_table(&lines).printstd();
  }

  ExitCode::SUCCESS
}
