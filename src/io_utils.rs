use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    column::{Column, ValueColumn},
    frame::Frame,
    insert::{ColumnToInsert, insert_columns},
    path::ColumnPath,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    decode_record(&headers, encoding)
}

/// Reads `path` into a frame of string columns.
///
/// With a `nest_separator`, headers such as `user.name` are split into
/// column paths and the columns are nested into groups.
pub fn read_csv_frame(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    nest_separator: Option<char>,
) -> Result<Frame> {
    let delimiter = resolve_input_delimiter(path, delimiter);
    let reader = open_csv_reader_from_path(path, delimiter)?;
    read_csv_frame_from_reader(reader, encoding, nest_separator)
        .with_context(|| format!("Reading CSV from {path:?}"))
}

pub fn read_csv_frame_from_reader<R>(
    mut reader: csv::Reader<R>,
    encoding: &'static Encoding,
    nest_separator: Option<char>,
) -> Result<Frame>
where
    R: Read,
{
    let headers = reader_headers(&mut reader, encoding)?;
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    let mut record = csv::ByteRecord::new();
    let mut row_count = 0usize;
    while reader.read_byte_record(&mut record)? {
        row_count += 1;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            if field.is_empty() {
                column.push(None);
            } else {
                column.push(Some(decode_bytes(field, encoding).with_context(|| {
                    format!("Decoding row {row_count}")
                })?));
            }
        }
    }
    debug!("Read {row_count} row(s) across {} column(s)", headers.len());

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(header, values)| Column::Value(ValueColumn::strings(header.as_str(), values)))
        .collect::<Vec<_>>();

    let Some(separator) = nest_separator else {
        return Ok(Frame::with_row_count(columns, row_count)?);
    };
    let requests = headers
        .iter()
        .zip(columns)
        .map(|(header, column)| {
            ColumnPath::parse(header, separator)
                .map(|path| ColumnToInsert::new(path, column))
                .with_context(|| format!("Splitting header '{header}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    insert_columns(None, requests, None).context("Nesting CSV columns")
}
