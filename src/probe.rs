use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    cli::ProbeArgs,
    column::Column,
    data::ColumnType,
    frame::Frame,
    io_utils,
    options::{Locale, ParserOptions},
    parallel::parse_frame,
    parser::global_parsers,
    printable_delimiter, table,
};

/// Inferred type of one leaf column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub path: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSchema {
    pub rows: usize,
    pub columns: Vec<ColumnSchema>,
}

impl FrameSchema {
    pub fn of(frame: &Frame) -> Self {
        let columns = frame
            .leaf_paths()
            .into_iter()
            .filter_map(|path| {
                let column = frame.get(&path).ok()?;
                Some(ColumnSchema {
                    path: path.to_string(),
                    ty: column.column_type(),
                    nullable: column.is_nullable(),
                })
            })
            .collect();
        Self {
            rows: frame.row_count(),
            columns,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        let mut writer = BufWriter::new(file);
        serde_yaml::to_writer(&mut writer, self).context("Serializing schema YAML")?;
        writer.flush().context("Flushing schema file")?;
        Ok(())
    }

    fn table_rows(&self) -> Vec<Vec<String>> {
        self.columns
            .iter()
            .map(|column| {
                vec![
                    column.path.clone(),
                    column.ty.to_string(),
                    if column.nullable { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect()
    }
}

/// CLI flags override the options file field by field.
pub fn resolve_options(args: &ProbeArgs) -> Result<ParserOptions> {
    let base = match &args.options {
        Some(path) => ParserOptions::load(path)?,
        None => ParserOptions::default(),
    };
    let locale = args
        .locale
        .as_deref()
        .map(|tag| Locale::for_tag(tag).ok_or_else(|| anyhow!("Unsupported locale '{tag}'")))
        .transpose()?;
    let overrides = ParserOptions {
        locale,
        date_time_pattern: args.date_time_pattern.clone(),
        null_strings: (!args.null_strings.is_empty())
            .then(|| args.null_strings.iter().cloned().collect()),
        skip_types: args.skip_types.iter().cloned().collect(),
    };
    Ok(base.merged_with(overrides))
}

pub fn execute(args: &ProbeArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    info!(
        "Probing '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let options = resolve_options(args)?;
    let frame = io_utils::read_csv_frame(
        &args.input,
        Some(delimiter),
        encoding,
        args.nest_separator,
    )?;

    let parsed = {
        let registry = global_parsers();
        parse_frame(frame, &registry, Some(&options))
            .with_context(|| format!("Parsing columns of {:?}", args.input))?
    };
    let schema = FrameSchema::of(&parsed);
    let nested = parsed
        .columns()
        .iter()
        .filter(|column| !matches!(column, Column::Value(_)))
        .count();
    info!(
        "Inferred {} leaf column(s), {} nested, over {} row(s)",
        schema.columns.len(),
        nested,
        schema.rows
    );

    match &args.output {
        Some(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing schema to {path:?}"))?;
            info!("Schema written to {path:?}");
        }
        None => {
            let headers = ["path", "type", "nullable"].map(String::from);
            table::print_table(&headers, &schema.table_rows());
        }
    }

    if let Some(limit) = args.preview {
        println!();
        print!("{}", table::render_frame(&parsed, limit));
    }
    Ok(())
}
