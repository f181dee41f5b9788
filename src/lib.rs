pub mod cli;
pub mod collector;
pub mod column;
pub mod convert;
pub mod data;
pub mod error;
pub mod frame;
pub mod insert;
pub mod io_utils;
pub mod json;
pub mod numeric;
pub mod options;
pub mod parallel;
pub mod parser;
pub mod path;
pub mod probe;
pub mod reference;
pub mod remove;
pub mod table;
pub mod temporal;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    collector::{DataCollector, TypedCollector},
    column::{Column, ColumnGroup, ColumnKind, FrameColumn, ValueColumn},
    convert::convert_column,
    data::{ColumnType, Value},
    error::{FrameError, FrameResult},
    frame::Frame,
    insert::{ColumnToInsert, insert_columns},
    options::{Locale, ParserOptions},
    parallel::parse_frame,
    parser::{
        ParseContext, ParserRegistry, StringParser, configure_global_parsers, global_parsers,
        reset_global_parsers,
    },
    path::ColumnPath,
    reference::{NodeId, ReferenceData, ReferenceTree},
    remove::{
        RemovalResult, RemovedColumn, group_columns, move_columns, remove_columns, rename_column,
        ungroup,
    },
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("nested_frame", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Probe(args) => probe::execute(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
