//! # Whitespace-delimited detection tables
//!
//! Minimal reader/writer for the text tables handled by the remapper: a header row of
//! column names followed by data rows, fields separated by arbitrary whitespace.
//!
//! Cells are kept as text. Only the identifier column is rewritten; every other cell
//! is written back exactly as it was read.
//!
//! ## Error Handling
//! -----------------
//! * A table without a header row → [`MopsError::EmptyTable`].
//! * A data row whose field count differs from the header → [`MopsError::MalformedRow`],
//!   carrying the 1-based line number. The whole run fails on the first such row.
use std::io::Write;

use camino::Utf8Path;
use itertools::Itertools;

use super::id_mapping::IdMapping;
use crate::mops_errors::MopsError;

/// Return the position of the identifier column in `header`.
///
/// Aliases are tried in priority order; the first alias present anywhere in the header
/// wins, regardless of its position in the header.
///
/// Arguments
/// -----------------
/// * `header` – Column names of the table.
/// * `aliases` – Accepted column names, by decreasing priority.
///
/// Return
/// ----------
/// * The index of the matching column, or [`MopsError::NoIdentifierColumn`] listing the
///   header when no alias matches.
pub fn identifier_column<S: AsRef<str>>(header: &[S], aliases: &[&str]) -> Result<usize, MopsError> {
    aliases
        .iter()
        .find_map(|alias| header.iter().position(|name| name.as_ref() == *alias))
        .ok_or_else(|| {
            MopsError::NoIdentifierColumn(header.iter().map(|s| s.as_ref().to_string()).collect())
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DetectionTable {
    /// Parse a table from its text content. Blank lines are ignored.
    pub fn parse(content: &str) -> Result<Self, MopsError> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines.next().ok_or(MopsError::EmptyTable)?;
        let header: Vec<String> = header_line.split_whitespace().map(str::to_string).collect();

        let rows = lines
            .map(|(idx, line)| {
                let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
                if fields.len() != header.len() {
                    return Err(MopsError::MalformedRow {
                        row: idx + 1,
                        expected: header.len(),
                        found: fields.len(),
                    });
                }
                Ok(fields)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DetectionTable { header, rows })
    }

    pub fn from_file(path: &Utf8Path) -> Result<Self, MopsError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[column].as_str())
    }

    /// Replace every cell of `column` by the dense integer of its value.
    ///
    /// Integers are assigned in order of first appearance scanning the rows top to
    /// bottom, so the first row always gets `0`.
    pub fn remap_column(&mut self, column: usize) -> IdMapping {
        let mut mapping = IdMapping::new();
        for row in self.rows.iter_mut() {
            let id = mapping.assign(&row[column]);
            row[column] = id.to_string();
        }
        mapping
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{}", self.header.iter().join(" "))?;
        for row in &self.rows {
            writeln!(writer, "{}", row.iter().join(" "))?;
        }
        Ok(())
    }

    pub fn write(&self, path: &Utf8Path) -> Result<(), MopsError> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }
}
