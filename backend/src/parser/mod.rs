//! CSV reading and writing, plus encoding detection for file input.
//!
//! Reading is strict about quoting: a stray or unbalanced `"` is an error,
//! which the CSV processor turns into a pass-through. Rows are allowed to be
//! shorter (or longer) than the header row.
//!
//! Line endings follow the usual CSV reader contract: `\r\n` reads as `\n`,
//! also inside quoted fields, while a lone `\r` is ordinary field data.

use std::io::Write;

use csv::{ReaderBuilder, Terminator, Writer, WriterBuilder};

use crate::error::{CsvError, CsvResult, PipelineError, PipelineResult};
use crate::models::Table;

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding name.
///
/// Invalid UTF-8 is decoded lossily. Other labels are resolved through
/// `encoding_rs`; a label it does not know is an error.
pub fn decode_content(bytes: &[u8], encoding: &str) -> PipelineResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        other => {
            let decoder = encoding_rs::Encoding::for_label(other.as_bytes()).ok_or_else(|| {
                PipelineError::Encoding(format!("unsupported encoding: {}", encoding))
            })?;
            Ok(decoder.decode(bytes).0.into_owned())
        }
    }
}

/// Decode raw file bytes, detecting the encoding first.
pub fn decode_auto(bytes: &[u8]) -> PipelineResult<(String, String)> {
    let encoding = detect_encoding(bytes);
    let text = decode_content(bytes, &encoding)?;
    Ok((text, encoding))
}

/// Reject quoting the `csv` crate would silently accept.
///
/// A quoted field must close before the next delimiter or newline, and an
/// unquoted field may not contain `"`.
pub fn check_quoting(content: &str) -> CsvResult<()> {
    #[derive(Clone, Copy)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut state = State::FieldStart;
    let mut line = 1;
    let mut quote_opened_at = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        state = match (state, c) {
            (State::FieldStart, '"') => {
                quote_opened_at = line;
                State::Quoted
            }
            (State::FieldStart | State::Unquoted, ',') => State::FieldStart,
            (State::FieldStart | State::Unquoted, '\n') => {
                line += 1;
                State::FieldStart
            }
            (State::FieldStart | State::Unquoted, _) if c != '"' => State::Unquoted,
            (State::Unquoted, _) => return Err(CsvError::BareQuote { line }),

            (State::Quoted, '"') => State::QuoteInQuoted,
            (State::Quoted, '\n') => {
                line += 1;
                State::Quoted
            }
            (State::Quoted, _) => State::Quoted,

            (State::QuoteInQuoted, '"') => State::Quoted,
            (State::QuoteInQuoted, ',') => State::FieldStart,
            (State::QuoteInQuoted, '\n') => {
                line += 1;
                State::FieldStart
            }
            (State::QuoteInQuoted, '\r') if chars.peek() == Some(&'\n') => State::Unquoted,
            (State::QuoteInQuoted, _) => return Err(CsvError::ExtraneousQuote { line }),

            (State::FieldStart, _) => State::Unquoted,
        };
    }

    match state {
        State::Quoted => Err(CsvError::UnterminatedQuote {
            line: quote_opened_at,
        }),
        _ => Ok(()),
    }
}

/// Parse comma-separated text into a [`Table`].
///
/// The first record is the header row; header names are trimmed.
pub fn parse_table(content: &str) -> CsvResult<Table> {
    let content = content.replace("\r\n", "\n");
    check_quoting(&content)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let mut records = records.into_iter();
    let header_row = records.next().ok_or(CsvError::EmptyInput)?;
    let headers = header_row.iter().map(|h| h.trim().to_string()).collect();

    Ok(Table::new(headers, records.collect()))
}

/// Serialize a [`Table`] as CSV with `\n` record terminators.
///
/// Fields are quoted only when they need it. A record with no fields, or with
/// a single empty field, is written as a bare newline.
pub fn write_table(table: &Table) -> CsvResult<String> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    write_record(&mut writer, &table.headers)?;
    for row in &table.rows {
        write_record(&mut writer, row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Writer(e.error().to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::Writer(e.to_string()))
}

// The csv crate writes both of these as `""`.
fn write_record(writer: &mut Writer<Vec<u8>>, record: &[String]) -> CsvResult<()> {
    if matches!(record, [] | [_]) && record.iter().all(String::is_empty) {
        writer.flush().map_err(|e| CsvError::Writer(e.to_string()))?;
        writer
            .get_mut()
            .write_all(b"\n")
            .map_err(|e| CsvError::Writer(e.to_string()))?;
    } else {
        writer.write_record(record)?;
    }
    Ok(())
}
