use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use thiserror::Error;

use crate::normalize::{Normalizer, TRIMMED_COLUMNS};
use crate::parser::table::VocabTable;
use crate::settings::{OutputFormat, Settings};

const UTF8_BOM: &[u8] = "\u{feff}".as_bytes();

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: OutputFormat,
    pub delimiter: u8,
    pub bom: bool,
}

impl ExportOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self, ExportError> {
        Ok(ExportOptions {
            format: settings.format,
            delimiter: delimiter_byte(&settings.delimiter)?,
            bom: settings.bom,
        })
    }
}

fn delimiter_byte(raw: &str) -> Result<u8, ExportError> {
    match raw.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(ExportError::Delimiter(raw.to_string())),
    }
}

/// Write `table` (with the trimmed columns when a normalizer is given).
pub fn write_table<W: Write>(
    out: W,
    table: &VocabTable,
    normalizer: Option<&Normalizer>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    match normalizer {
        Some(n) => write_rows(out, &TRIMMED_COLUMNS, &n.table(table), options),
        None => write_rows(out, &VocabTable::columns(), table.rows(), options),
    }
}

pub fn write_file(
    path: &Path,
    table: &VocabTable,
    normalizer: Option<&Normalizer>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_table(BufWriter::new(file), table, normalizer, options)
}

fn write_rows<W: Write, R: Serialize>(
    mut out: W,
    columns: &[&str],
    rows: &[R],
    options: &ExportOptions,
) -> Result<(), ExportError> {
    match options.format {
        OutputFormat::Csv => {
            if options.bom {
                out.write_all(UTF8_BOM)?;
            }
            // header written by hand so an empty table still gets one
            let mut writer = WriterBuilder::new()
                .delimiter(options.delimiter)
                .has_headers(false)
                .from_writer(out);
            writer.write_record(columns)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, rows)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
    }
    Ok(())
}
