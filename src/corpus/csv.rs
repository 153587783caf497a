//! Minimal RFC 4180 reader for spreadsheet CSV exports.
//!
//! Handles quoted fields, doubled `""` escapes, quoted line breaks and
//! both `\n` / `\r\n` endings. Blank lines are skipped.

use crate::{corpus::CorpusRow, error::LoadError};

/// Split CSV text into records of fields
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // true once the current field started with a quote and the quote closed
    let mut closed_quote = false;
    let mut line = 1usize;
    let mut quote_line = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    closed_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() && !closed_quote => {
                in_quotes = true;
                quote_line = line;
            }
            '"' => {
                return Err(LoadError::Csv {
                    line,
                    message: "unexpected quote inside unquoted field".to_string(),
                });
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                closed_quote = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                closed_quote = false;
                push_record(&mut records, std::mem::take(&mut record));
                line += 1;
            }
            _ if closed_quote => {
                return Err(LoadError::Csv {
                    line,
                    message: "text after closing quote".to_string(),
                });
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(LoadError::Csv {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !record.is_empty() || closed_quote {
        record.push(field);
        push_record(&mut records, record);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    // a blank line parses as one empty field
    let blank = record.len() == 1 && record[0].is_empty();
    if !blank {
        records.push(record);
    }
}

/// Parse a trigger table.
///
/// The first record is the header and fixes the column count, which must
/// be at least 2. Column 0 holds the keywords, column 1 the answer, any
/// further columns are ignored. Rows whose answer cell is missing or blank
/// are dropped.
pub fn parse_table(text: &str) -> Result<Vec<CorpusRow>, LoadError> {
    let mut records = parse_records(text)?.into_iter();
    let header = records.next().ok_or(LoadError::TooFewColumns { found: 0 })?;
    if header.len() < 2 {
        return Err(LoadError::TooFewColumns { found: header.len() });
    }
    Ok(records
        .filter_map(|mut record| {
            if record.len() < 2 || record[1].trim().is_empty() {
                return None;
            }
            record.truncate(2);
            let answer = record.pop()?;
            let keywords = record.pop()?;
            Some(CorpusRow { keywords, answer })
        })
        .collect())
}
