//! Line-oriented CSV reading.
//!
//! A streaming reader sized for the two source tables: fields split with
//! RFC 4180 quoting (a quoted field may contain the delimiter, `""` is a
//! literal quote), lines decoded lossily since the files are not
//! guaranteed UTF-8, and a UTF-8 BOM on the first header cell stripped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::data::DatasetError;

/// A parsed table: one header row plus zero or more data rows.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Index of an exact, case-sensitive column name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

/// Read a delimited table from disk.
///
/// Blank lines are skipped. Row arity is not enforced; short rows surface
/// as missing cells downstream.
pub fn read_table(path: &Path, delimiter: char) -> Result<CsvTable, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| DatasetError::Read {
                path: path.display().to_string(),
                source,
            })?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }

        match headers {
            None => {
                let mut fields = split_line(line, delimiter);
                if let Some(first) = fields.first_mut() {
                    if let Some(stripped) = first.strip_prefix('\u{feff}') {
                        *first = stripped.to_string();
                    }
                }
                headers = Some(fields);
            }
            Some(_) => rows.push(split_line(line, delimiter)),
        }
    }

    let headers = headers.ok_or_else(|| DatasetError::EmptyFile {
        path: path.display().to_string(),
    })?;

    debug!("Read {} data rows from {}", rows.len(), path.display());
    Ok(CsvTable { headers, rows })
}

/// Split one line into fields. Quotes hide the delimiter; `""` inside a
/// quoted field is a literal quote. Fields with embedded newlines are not
/// supported by the line-based reader.
fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_split_line_plain() {
        assert_eq!(split_line("a,b,c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_line_quoted_delimiter() {
        assert_eq!(
            split_line("\"Rapid City, SD\",12", ','),
            vec!["Rapid City, SD", "12"]
        );
    }

    #[test]
    fn test_split_line_escaped_quote() {
        assert_eq!(
            split_line("\"say \"\"hi\"\"\",x", ','),
            vec!["say \"hi\"", "x"]
        );
    }

    #[test]
    fn test_split_line_empty_fields() {
        assert_eq!(split_line("a,,c,", ','), vec!["a", "", "c", ""]);
    }

    #[test]
    fn test_split_line_alternate_delimiter() {
        assert_eq!(split_line("a;b;c", ';'), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_read_table_basic() {
        let file = write_temp(b"date,state\r\n2020-01-01,TX\n2020-02-01,CA\n");
        let table = read_table(file.path(), ',').unwrap();

        assert_eq!(table.headers, vec!["date", "state"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["2020-01-01", "TX"]);
        assert_eq!(table.column("state"), Some(1));
        assert_eq!(table.column("State"), None);
    }

    #[test]
    fn test_read_table_strips_bom() {
        let file = write_temp(b"\xef\xbb\xbfdate,state\n2020-01-01,TX\n");
        let table = read_table(file.path(), ',').unwrap();

        assert_eq!(table.headers[0], "date");
    }

    #[test]
    fn test_read_table_skips_blank_lines() {
        let file = write_temp(b"a,b\n\n1,2\n\n");
        let table = read_table(file.path(), ',').unwrap();

        assert_eq!(table.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_read_table_keeps_short_rows() {
        let file = write_temp(b"a,b,c\n1,2\n");
        let table = read_table(file.path(), ',').unwrap();

        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_read_table_lossy_decodes_latin1() {
        let file = write_temp(b"area\nCa\xf1on City\n");
        let table = read_table(file.path(), ',').unwrap();

        assert_eq!(table.rows[0][0], "Ca\u{fffd}on City");
    }

    #[test]
    fn test_read_table_empty_file_is_error() {
        let file = write_temp(b"");
        let err = read_table(file.path(), ',').unwrap_err();

        assert!(matches!(err, DatasetError::EmptyFile { .. }));
    }

    #[test]
    fn test_read_table_missing_file_is_error() {
        let err = read_table(Path::new("/nonexistent/deaths.csv"), ',').unwrap_err();

        assert!(matches!(err, DatasetError::Read { .. }));
    }
}
