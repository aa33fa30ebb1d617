//! # ssmId remapping
//!
//! Rewrites the object identifier column of a detection table into dense integers,
//! and records the mapping between original identifiers and integers in a side file.
//!
//! Modules
//! -----------------
//! * [`detection_table`] – Whitespace-delimited table reader/writer and identifier
//!   column lookup.
//! * [`id_mapping`] – First-seen-order bijection between identifiers and `0..N`.
//!
//! Pipeline
//! -----------------
//! 1. Read the table ([`DetectionTable::from_file`]).
//! 2. Pick the identifier column: the first of
//!    [`SSM_ID_ALIASES`](crate::constants::SSM_ID_ALIASES) present in the header.
//! 3. Replace every identifier by its first-seen index.
//! 4. Write the rewritten table and the `<original> <integer>` mapping file.
//!
//! Identifiers are compared as text: `"007"` and `"7"` are two distinct objects.
pub mod detection_table;
pub mod id_mapping;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;

use crate::constants::{NEW_ID_SUFFIX, SSM_ID_ALIASES};
use crate::mops_errors::MopsError;
pub use detection_table::{identifier_column, DetectionTable};
pub use id_mapping::IdMapping;

/// Outcome of a remapping run.
#[derive(Debug, Clone, PartialEq)]
pub struct RemapSummary {
    /// Name of the column that was rewritten.
    pub column: String,
    /// Number of data rows written.
    pub rows: usize,
    /// Number of distinct identifiers, i.e. the size of the mapping.
    pub distinct_ids: usize,
    pub output: Utf8PathBuf,
    pub mapping: Utf8PathBuf,
}

/// Default output path: `_newId` inserted before the final extension of `input`,
/// or appended when the file name has no extension.
///
/// ```
/// use camino::Utf8Path;
/// use mopsprep::remap::default_output_path;
///
/// assert_eq!(default_output_path(Utf8Path::new("dir/dias.txt")), "dir/dias_newId.txt");
/// assert_eq!(default_output_path(Utf8Path::new("dias")), "dias_newId");
/// ```
pub fn default_output_path(input: &Utf8Path) -> Utf8PathBuf {
    match (input.file_stem(), input.extension()) {
        (Some(stem), Some(ext)) => input.with_file_name(format!("{stem}{NEW_ID_SUFFIX}.{ext}")),
        _ => Utf8PathBuf::from(format!("{input}{NEW_ID_SUFFIX}")),
    }
}

/// Run the whole remapping on one file.
///
/// Arguments
/// -----------------
/// * `input` – Table to rewrite.
/// * `mapping_path` – Destination of the `<original> <integer>` file.
/// * `output` – Destination of the rewritten table.
///
/// Return
/// ----------
/// * A [`RemapSummary`], or the first error met. Nothing is written when reading or
///   column lookup fails.
pub fn swap_ssm_ids(
    input: &Utf8Path,
    mapping_path: &Utf8Path,
    output: &Utf8Path,
) -> Result<RemapSummary, MopsError> {
    info!("Reading diaSources from {input}...");
    let mut table = DetectionTable::from_file(input)?;
    let column = identifier_column(table.header(), &SSM_ID_ALIASES)?;
    let column_name = table.header()[column].clone();
    info!("... Done. {} rows, identifier column '{column_name}'", table.len());

    let mapping = table.remap_column(column);

    table.write(output)?;
    mapping.write(mapping_path)?;
    info!(
        "Wrote {} rows to {output} and {} identifiers to {mapping_path}",
        table.len(),
        mapping.len()
    );

    Ok(RemapSummary {
        column: column_name,
        rows: table.len(),
        distinct_ids: mapping.len(),
        output: output.to_path_buf(),
        mapping: mapping_path.to_path_buf(),
    })
}

#[cfg(test)]
mod remap_test {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Utf8Path::new("data/dias.short.txt")),
            Utf8PathBuf::from("data/dias.short_newId.txt")
        );
        assert_eq!(
            default_output_path(Utf8Path::new("./data/dias")),
            Utf8PathBuf::from("./data/dias_newId")
        );
        assert_eq!(
            default_output_path(Utf8Path::new("dias.dat")),
            Utf8PathBuf::from("dias_newId.dat")
        );
    }
}
