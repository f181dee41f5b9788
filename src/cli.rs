use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::ColumnType;

#[derive(Debug, Parser)]
#[command(author, version, about = "Infer column types of nested tabular data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse every column of a CSV file and report the inferred types
    Probe(ProbeArgs),
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Input CSV file to inspect (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Write the inferred schema as YAML instead of printing a table
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Render the first N parsed rows after the schema
    #[arg(long)]
    pub preview: Option<usize>,
    /// YAML file with parser options; flags below override it
    #[arg(long = "options")]
    pub options: Option<PathBuf>,
    /// Cell value treated as null (repeatable, replaces the defaults)
    #[arg(long = "null-string", action = clap::ArgAction::Append)]
    pub null_strings: Vec<String>,
    /// Locale tag for number parsing, e.g. `de-DE`
    #[arg(long)]
    pub locale: Option<String>,
    /// chrono pattern used for date-time, date and time values
    #[arg(long = "date-time-pattern")]
    pub date_time_pattern: Option<String>,
    /// Type the inference must not produce (repeatable)
    #[arg(long = "skip-type", value_parser = parse_column_type, action = clap::ArgAction::Append)]
    pub skip_types: Vec<ColumnType>,
    /// Split headers on this character into nested column paths
    #[arg(long = "nest-separator")]
    pub nest_separator: Option<char>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

fn parse_column_type(value: &str) -> Result<ColumnType, String> {
    value.parse::<ColumnType>().map_err(|err| err.to_string())
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
