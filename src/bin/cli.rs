#![cfg(not(tarpaulin_include))]

use clap::{Parser, Subcommand};
use plsql_restyle::loader::extract_names;
use plsql_restyle::transform::transform;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "restyle", version, about = "Offline procedure restyling tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print FILE (or stdin) with its embedded HTML restyled
    Transform { file: Option<PathBuf> },
    /// Print the NAME column of a spreadsheet, one name per line
    Names { file: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Transform { file } => {
            let source = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            out.write_all(transform(&source).as_bytes())?;
        }
        Command::Names { file } => {
            let bytes = fs::read(&file)?;
            for name in extract_names(&bytes)? {
                writeln!(out, "{}", name)?;
            }
        }
    }

    Ok(())
}
