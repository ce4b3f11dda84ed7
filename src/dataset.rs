//! Labeled pair tables
//!
//! A pair table is a CSV file with at least `node1`, `node2` and `label`
//! columns, plus any features computed earlier. Tables are kept as raw
//! strings so that every pre-existing column round-trips untouched; new
//! feature columns are appended at the right.

use linkfeat_sdk::AuthorId;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const NODE1_COLUMN: &str = "node1";
pub const NODE2_COLUMN: &str = "node2";
pub const LABEL_COLUMN: &str = "label";

/// Pair table errors
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Invalid value {value:?} in column {column}, row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Column {column} has {got} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// One labeled author pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRecord {
    pub node1: AuthorId,
    pub node2: AuthorId,
    /// 1 if the authors are linked, 0 otherwise
    pub label: u8,
}

impl PairRecord {
    pub fn ids(&self) -> (AuthorId, AuthorId) {
        (self.node1, self.node2)
    }
}

/// In-memory CSV table of author pairs
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl PairTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn read_csv(path: impl AsRef<Path>) -> DatasetResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parse CSV text (RFC 4180 quoting, first record is the header)
    pub fn parse(text: &str) -> DatasetResult<Self> {
        let mut records = parse_records(text)?.into_iter();
        let (_, columns) = records.next().ok_or(DatasetError::Parse {
            line: 1,
            message: "missing header".to_string(),
        })?;

        let mut rows = Vec::new();
        for (line, record) in records {
            if record.len() != columns.len() {
                return Err(DatasetError::Parse {
                    line,
                    message: format!("expected {} fields, found {}", columns.len(), record.len()),
                });
            }
            rows.push(record);
        }

        Ok(Self { columns, rows })
    }

    /// Write to `path`, replacing it only once the whole table is on disk.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> DatasetResult<()> {
        let path = path.as_ref();
        let io_err = |source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, self.to_csv_string()).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)
    }

    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, &self.columns);
        for row in &self.rows {
            write_record(&mut out, row);
        }
        out
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> DatasetResult<usize> {
        self.column_index(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    }

    /// Raw values of one column
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn push_row(&mut self, row: Vec<String>) -> DatasetResult<()> {
        if row.len() != self.columns.len() {
            return Err(DatasetError::LengthMismatch {
                column: "<row>".to_string(),
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Parse the `node1`, `node2` and `label` columns
    pub fn pairs(&self) -> DatasetResult<Vec<PairRecord>> {
        let n1 = self.require_column(NODE1_COLUMN)?;
        let n2 = self.require_column(NODE2_COLUMN)?;
        let lb = self.require_column(LABEL_COLUMN)?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(PairRecord {
                    node1: parse_id(&row[n1], i, NODE1_COLUMN)?,
                    node2: parse_id(&row[n2], i, NODE2_COLUMN)?,
                    label: parse_label(&row[lb], i)?,
                })
            })
            .collect()
    }

    /// Append a numeric column; existing columns are never overwritten.
    pub fn append_column(&mut self, name: &str, values: &[f64]) -> DatasetResult<()> {
        if self.has_column(name) {
            return Err(DatasetError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.rows.len() {
            return Err(DatasetError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        self.columns.push(name.to_string());
        for (row, &v) in self.rows.iter_mut().zip(values) {
            row.push(format_float(v));
        }
        Ok(())
    }
}

/// `data/train.csv` -> `data/train_enriched.csv`
pub fn enriched_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(file_name)
}

fn parse_id(raw: &str, row: usize, column: &str) -> DatasetResult<AuthorId> {
    let raw = raw.trim();
    let invalid = || DatasetError::InvalidValue {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    };

    if let Ok(id) = raw.parse::<AuthorId>() {
        return Ok(id);
    }
    // Ids written by float-typed dataframes ("12.0")
    let f: f64 = raw.parse().map_err(|_| invalid())?;
    if f >= 0.0 && f.fract() == 0.0 && f <= AuthorId::MAX as f64 {
        Ok(f as AuthorId)
    } else {
        Err(invalid())
    }
}

fn parse_label(raw: &str, row: usize) -> DatasetResult<u8> {
    match raw.trim() {
        "0" | "0.0" => Ok(0),
        "1" | "1.0" => Ok(1),
        other => Err(DatasetError::InvalidValue {
            row,
            column: LABEL_COLUMN.to_string(),
            value: other.to_string(),
        }),
    }
}

fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

fn format_csv_value(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_record(out: &mut String, fields: &[String]) {
    let cells: Vec<String> = fields.iter().map(|f| format_csv_value(f)).collect();
    out.push_str(&cells.join(","));
    out.push('\n');
}

/// Split CSV text into records, tagged with the line each record starts on
fn parse_records(text: &str) -> DatasetResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = text.chars().peekable();

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
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push((start_line, std::mem::take(&mut record)));
                }
                record.clear();
                line += 1;
                start_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(DatasetError::Parse {
            line: start_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push((start_line, record));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = ",node1,node2,label,adamic_adar\n0,12,40,1,0.72\n1,12.0,7,0,0.0\n";

    #[test]
    fn test_parse_and_pairs() {
        let table = PairTable::parse(SAMPLE).unwrap();
        assert_eq!(table.columns(), &["", "node1", "node2", "label", "adamic_adar"]);
        assert_eq!(table.len(), 2);

        let pairs = table.pairs().unwrap();
        assert_eq!(pairs[0], PairRecord { node1: 12, node2: 40, label: 1 });
        assert_eq!(pairs[1].ids(), (12, 7));
    }

    #[test]
    fn test_append_preserves_existing_columns() {
        let mut table = PairTable::parse(SAMPLE).unwrap();
        table.append_column("similarity_tfidf", &[1.0 / 3.0, 0.0]).unwrap();

        let out = table.to_csv_string();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some(",node1,node2,label,adamic_adar,similarity_tfidf"));
        assert_eq!(lines.next(), Some("0,12,40,1,0.72,0.3333333333333333"));
        assert_eq!(lines.next(), Some("1,12.0,7,0,0.0,0.0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_append_rejects_duplicates_and_bad_lengths() {
        let mut table = PairTable::parse(SAMPLE).unwrap();
        assert!(matches!(
            table.append_column("adamic_adar", &[0.0, 0.0]),
            Err(DatasetError::DuplicateColumn(_))
        ));
        assert!(matches!(
            table.append_column("x", &[0.0]),
            Err(DatasetError::LengthMismatch { expected: 2, got: 1, .. })
        ));
        assert_eq!(table.columns().len(), 5);
    }

    #[test]
    fn test_quoted_fields_round_trip() {
        let text = "node1,node2,label,note\n1,2,0,\"a, \"\"quoted\"\"\nnote\"\r\n";
        let table = PairTable::parse(text).unwrap();
        assert_eq!(table.column("note").unwrap(), vec!["a, \"quoted\"\nnote"]);
        assert_eq!(PairTable::parse(&table.to_csv_string()).unwrap(), table);
    }

    #[test]
    fn test_invalid_rows() {
        assert!(matches!(
            PairTable::parse("node1,node2,label\n1,2\n"),
            Err(DatasetError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            PairTable::parse("node1,node2,label\n1,2,\"0\n"),
            Err(DatasetError::Parse { .. })
        ));

        let bad_label = PairTable::parse("node1,node2,label\n1,2,3\n").unwrap();
        assert!(matches!(bad_label.pairs(), Err(DatasetError::InvalidValue { .. })));

        let bad_id = PairTable::parse("node1,node2,label\n-1,2,1\n").unwrap();
        assert!(matches!(bad_id.pairs(), Err(DatasetError::InvalidValue { row: 0, .. })));

        let no_label = PairTable::parse("node1,node2\n1,2\n").unwrap();
        assert!(matches!(no_label.pairs(), Err(DatasetError::MissingColumn(c)) if c == "label"));
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let table = PairTable::parse(SAMPLE).unwrap();
        table.write_csv(&path).unwrap();

        assert_eq!(PairTable::read_csv(&path).unwrap(), table);
        assert!(!dir.path().join("train.csv.tmp").exists());
    }

    #[test]
    fn test_enriched_path() {
        let p = enriched_path(Path::new("datasets/d1/train_balanced_668.csv"), "_enriched");
        assert_eq!(p, PathBuf::from("datasets/d1/train_balanced_668_enriched.csv"));
        assert_eq!(enriched_path(Path::new("pairs"), "_x"), PathBuf::from("pairs_x"));
    }
}
