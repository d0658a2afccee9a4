//! Flat shot table export and import.
//!
//! The exported column set and order is the persisted schema: a table
//! written on one run is read back as the "previous" table on the next.

use serde::{Deserialize, Serialize};

use crate::correlate::ShotRecord;
use crate::error::{Error, Result};

pub const COL_VFX_CODE: &str = "VFX CODE";
pub const COL_EPISODE: &str = "EPISODE";
pub const COL_TC_IN_OUT: &str = "TC IN/OUT";
pub const COL_SOURCE_TC_IN: &str = "Source TC IN";
pub const COL_SOURCE_TC_OUT: &str = "Source TC OUT";
pub const COL_DURATION: &str = "Duration (frames)";
pub const COL_DESCRIPTION: &str = "Description";

/// Export columns, in order, without the optional description.
pub const BASE_COLUMNS: [&str; 6] = [
    COL_VFX_CODE,
    COL_EPISODE,
    COL_TC_IN_OUT,
    COL_SOURCE_TC_IN,
    COL_SOURCE_TC_OUT,
    COL_DURATION,
];

/// Table export options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub delimiter: char,
    pub include_description: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_description: true,
        }
    }
}

impl TableOptions {
    pub fn columns(&self) -> Vec<&'static str> {
        let mut cols = BASE_COLUMNS.to_vec();
        if self.include_description {
            cols.push(COL_DESCRIPTION);
        }
        cols
    }
}

/// A text table with a header row; every cell is kept as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ShotTable {
    /// Render shots with the export columns.
    pub fn from_shots(shots: &[ShotRecord], include_description: bool) -> Self {
        let options = TableOptions {
            include_description,
            ..TableOptions::default()
        };
        Self {
            headers: options.columns().into_iter().map(String::from).collect(),
            rows: shots
                .iter()
                .map(|shot| shot_row(shot, include_description))
                .collect(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell text; missing cells read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn shot_row(shot: &ShotRecord, include_description: bool) -> Vec<String> {
    let mut row = vec![
        shot.vfx_code.clone(),
        shot.episode.clone(),
        shot.record_range(),
        shot.source_tc_in.clone(),
        shot.source_tc_out.clone(),
        shot.duration_frames.to_string(),
    ];
    if include_description {
        row.push(shot.description.clone());
    }
    row
}

/// Serialize shots to delimited text with a header row.
pub fn write_table(shots: &[ShotRecord], options: &TableOptions) -> String {
    let table = ShotTable::from_shots(shots, options.include_description);
    let mut out = String::new();
    write_record(&mut out, &table.headers, options.delimiter);
    for row in &table.rows {
        write_record(&mut out, row, options.delimiter);
    }
    out
}

fn write_record(out: &mut String, fields: &[String], delimiter: char) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        let needs_quotes = field.contains(delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r');
        if needs_quotes {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Parse delimited text with a header row into a [`ShotTable`].
///
/// Quoted fields may contain the delimiter, doubled quotes, and newlines.
/// Blank lines are skipped. Empty input yields an empty table.
pub fn read_table(input: &str, delimiter: char) -> Result<ShotTable> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut records = parse_records(input, delimiter)?.into_iter();

    let Some((_, headers)) = records.next() else {
        return Ok(ShotTable::default());
    };
    let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (line, mut fields) in records {
        if fields.len() > headers.len() {
            return Err(Error::TableParse {
                line,
                message: format!(
                    "expected at most {} fields, got {}",
                    headers.len(),
                    fields.len()
                ),
            });
        }
        fields.resize(headers.len(), String::new());
        rows.push(fields);
    }

    Ok(ShotTable { headers, rows })
}

// Splits into (starting line number, fields) records, skipping blank lines.
fn parse_records(input: &str, delimiter: char) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut field));
                if !(fields.len() == 1 && fields[0].trim().is_empty()) {
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                fields.clear();
                line += 1;
                record_line = line;
            }
            c if c == delimiter => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::TableParse {
            line: record_line,
            message: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        if !(fields.len() == 1 && fields[0].trim().is_empty()) {
            records.push((record_line, fields));
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shot(code: &str, description: &str) -> ShotRecord {
        ShotRecord {
            vfx_code: code.into(),
            episode: "039".into(),
            record_tc_in: "01:00:10:00".into(),
            record_tc_out: "01:00:12:00".into(),
            source_tc_in: "10:00:00:00".into(),
            source_tc_out: "10:00:02:00".into(),
            duration_frames: 48,
            description: description.into(),
        }
    }

    #[test]
    fn test_write_table_columns() {
        let text = write_table(&[shot("HH_103_039_020", "Remove shadow")], &TableOptions::default());
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "VFX CODE,EPISODE,TC IN/OUT,Source TC IN,Source TC OUT,Duration (frames),Description"
        );
        assert_eq!(
            lines.next().unwrap(),
            "HH_103_039_020,039,01:00:10:00 - 01:00:12:00,10:00:00:00,10:00:02:00,48,Remove shadow"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_without_description() {
        let options = TableOptions {
            include_description: false,
            ..TableOptions::default()
        };
        let text = write_table(&[shot("HH_1_2_3", "ignored")], &options);
        assert!(!text.contains("Description"));
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn test_quoting() {
        let text = write_table(&[shot("HH_1_2_3", "sky, \"big\" fix")], &TableOptions::default());
        assert!(text.contains("\"sky, \"\"big\"\" fix\""));

        let table = read_table(&text, ',').unwrap();
        assert_eq!(table.cell(0, 6), "sky, \"big\" fix");
    }

    #[test]
    fn test_read_table_basic() {
        let input = "\
VFX CODE,EPISODE,Duration (frames)
HH_103_039_020,039,48

HH_103_039_030,039,12
";
        let table = read_table(input, ',').unwrap();
        assert_eq!(table.headers, vec!["VFX CODE", "EPISODE", "Duration (frames)"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_index("EPISODE"), Some(1));
        assert_eq!(table.cell(1, 0), "HH_103_039_030");
    }

    #[test]
    fn test_read_table_short_rows_padded() {
        let table = read_table("A,B,C\r\n1,2\r\n", ',').unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_read_table_errors() {
        let err = read_table("A,B\n1,2,3\n", ',').unwrap_err();
        assert!(matches!(err, Error::TableParse { line: 2, .. }));

        assert!(read_table("A,B\n\"open,2\n", ',').is_err());
    }

    #[test]
    fn test_read_table_multiline_quoted() {
        let input = "A,B\n\"line one\nline two\",x\n";
        let table = read_table(input, ',').unwrap();
        assert_eq!(table.cell(0, 0), "line one\nline two");
        assert_eq!(table.cell(0, 1), "x");
    }

    #[test]
    fn test_read_empty_and_bom() {
        assert!(read_table("", ',').unwrap().headers.is_empty());
        let table = read_table("\u{feff}VFX CODE\nHH_1\n", ',').unwrap();
        assert_eq!(table.column_index(COL_VFX_CODE), Some(0));
    }

    #[test]
    fn test_tab_delimiter() {
        let options = TableOptions {
            delimiter: '\t',
            include_description: true,
        };
        let text = write_table(&[shot("HH_1_2_3", "a, b")], &options);
        let table = read_table(&text, '\t').unwrap();
        assert_eq!(table.cell(0, 6), "a, b");
        assert_eq!(table.cell(0, 2), "01:00:10:00 - 01:00:12:00");
    }
}
