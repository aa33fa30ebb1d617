//! # Dump-backed metadata
//!
//! Reads the two flat dumps produced upstream and serves lookups from memory.
//!
//! ## Formats
//! -----------------
//! * diaSources, one per line: `diaId obsHistId ssmId ra dec expMjd mag snr`
//!   (`snr` is read for validation only and discarded);
//! * opsim images, one per line: `expMjd fieldId obsHistId`.
//!
//! Fields are separated by arbitrary whitespace; blank lines are skipped. Any other
//! line with a wrong number of fields or an unparsable number aborts the load with
//! [`MopsError::DumpParse`], naming the file and the 1-based line number.
//!
//! The whole diaSource dump must fit in memory.
use std::collections::HashMap;
use std::str::FromStr;

use ahash::RandomState;
use camino::Utf8Path;

use super::{DiaSource, ImageMetadata, MetadataSource};
use crate::constants::{DiaId, ObsHistId};
use crate::mops_errors::MopsError;

#[derive(Debug, Clone, Default)]
pub struct FileMetadataSource {
    dias: HashMap<DiaId, DiaSource, RandomState>,
    images: ImageMetadata,
}

impl FileMetadataSource {
    pub fn from_files(dias_file: &Utf8Path, opsim_file: &Utf8Path) -> Result<Self, MopsError> {
        Ok(FileMetadataSource {
            dias: read_dias(dias_file)?,
            images: read_images(opsim_file)?,
        })
    }

    /// Source of diaSources only; every image lookup comes back empty.
    pub fn from_dias_file(dias_file: &Utf8Path) -> Result<Self, MopsError> {
        Ok(FileMetadataSource {
            dias: read_dias(dias_file)?,
            images: ImageMetadata::new(),
        })
    }

    /// Source of images only; every diaSource lookup fails.
    pub fn from_opsim_file(opsim_file: &Utf8Path) -> Result<Self, MopsError> {
        Ok(FileMetadataSource {
            dias: HashMap::default(),
            images: read_images(opsim_file)?,
        })
    }

    /// Build a source from already loaded records.
    pub fn from_records(dias: impl IntoIterator<Item = DiaSource>, images: ImageMetadata) -> Self {
        FileMetadataSource {
            dias: dias.into_iter().map(|d| (d.dia_id, d)).collect(),
            images,
        }
    }

    pub fn num_dias(&self) -> usize {
        self.dias.len()
    }

    pub fn images(&self) -> &ImageMetadata {
        &self.images
    }
}

impl MetadataSource for FileMetadataSource {
    fn lookup_dia(&mut self, dia_id: DiaId) -> Result<DiaSource, MopsError> {
        self.dias
            .get(&dia_id)
            .cloned()
            .ok_or(MopsError::UnknownDiaSource(dia_id))
    }

    fn image_metadata(&mut self, obs_hists: &[ObsHistId]) -> Result<ImageMetadata, MopsError> {
        Ok(self.images.restricted_to(obs_hists))
    }
}

fn parse_field<T: FromStr>(
    path: &Utf8Path,
    line: usize,
    name: &str,
    token: &str,
) -> Result<T, MopsError> {
    token.parse::<T>().map_err(|_| MopsError::DumpParse {
        path: path.to_path_buf(),
        line,
        reason: format!("invalid {name}: '{token}'"),
    })
}

/// Split a dump line into exactly `N` fields.
fn split_fields<'a, const N: usize>(
    path: &Utf8Path,
    line: usize,
    content: &'a str,
) -> Result<[&'a str; N], MopsError> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    tokens.try_into().map_err(|tokens: Vec<&str>| MopsError::DumpParse {
        path: path.to_path_buf(),
        line,
        reason: format!("expected {N} fields, found {}", tokens.len()),
    })
}

/// Parse the content of a diaSource dump. `path` is only used in error messages.
pub fn parse_dias(
    path: &Utf8Path,
    content: &str,
) -> Result<HashMap<DiaId, DiaSource, RandomState>, MopsError> {
    let mut dias = HashMap::default();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let [dia_id, obs_hist_id, ssm_id, ra, dec, exp_mjd, mag, snr] =
            split_fields::<8>(path, line_no, line)?;

        let dia = DiaSource {
            dia_id: parse_field(path, line_no, "diaId", dia_id)?,
            obs_hist_id: Some(parse_field(path, line_no, "obsHistId", obs_hist_id)?),
            ssm_id: ssm_id.to_string(),
            ra: parse_field(path, line_no, "ra", ra)?,
            dec: parse_field(path, line_no, "dec", dec)?,
            obs_time: parse_field(path, line_no, "expMjd", exp_mjd)?,
            mag: parse_field(path, line_no, "mag", mag)?,
        };
        let _: f64 = parse_field(path, line_no, "snr", snr)?;

        dias.insert(dia.dia_id, dia);
    }
    Ok(dias)
}

/// Parse the content of an opsim dump. `path` is only used in error messages.
pub fn parse_images(path: &Utf8Path, content: &str) -> Result<ImageMetadata, MopsError> {
    let mut images = ImageMetadata::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let [exp_mjd, field_id, obs_hist_id] = split_fields::<3>(path, line_no, line)?;
        images.insert(
            parse_field(path, line_no, "obsHistId", obs_hist_id)?,
            parse_field(path, line_no, "expMjd", exp_mjd)?,
            parse_field(path, line_no, "fieldId", field_id)?,
        );
    }
    Ok(images)
}

pub fn read_dias(path: &Utf8Path) -> Result<HashMap<DiaId, DiaSource, RandomState>, MopsError> {
    let content = std::fs::read_to_string(path)?;
    parse_dias(path, &content)
}

pub fn read_images(path: &Utf8Path) -> Result<ImageMetadata, MopsError> {
    let content = std::fs::read_to_string(path)?;
    parse_images(path, &content)
}

#[cfg(test)]
mod file_backed_test {
    use super::*;
    use camino::Utf8PathBuf;

    const DIAS: &str = "\
1 100 S1 10.0 -5.0 53000.1 21.5 7.2
2 100 NULL 10.5 -5.5 53000.1 22.0 5.1

3 101 S1 10.01 -5.01 53000.2 21.4 8.0
";

    const OPSIM: &str = "\
53000.1 1200 100
53000.2 1201 101
53031.4 1200 102
";

    #[test]
    fn test_parse_dias() {
        let dias = parse_dias(Utf8Path::new("dias.dat"), DIAS).unwrap();
        assert_eq!(dias.len(), 3);
        assert_eq!(
            dias[&2],
            DiaSource {
                dia_id: 2,
                obs_time: 53000.1,
                ssm_id: "NULL".into(),
                obs_hist_id: Some(100),
                ra: 10.5,
                dec: -5.5,
                mag: 22.0,
            }
        );
    }

    #[test]
    fn test_parse_dias_wrong_field_count() {
        let content = "1 100 S1 10.0 -5.0 53000.1 21.5\n";
        assert_eq!(
            parse_dias(Utf8Path::new("dias.dat"), content).err(),
            Some(MopsError::DumpParse {
                path: Utf8PathBuf::from("dias.dat"),
                line: 1,
                reason: "expected 8 fields, found 7".into(),
            })
        );
    }

    #[test]
    fn test_parse_dias_bad_number() {
        let content = "1 100 S1 10.0 -5.0 53000.1 21.5 7.0\n2 1x0 S1 10.0 -5.0 53000.1 21.5 7.0\n";
        assert_eq!(
            parse_dias(Utf8Path::new("dias.dat"), content).err(),
            Some(MopsError::DumpParse {
                path: Utf8PathBuf::from("dias.dat"),
                line: 2,
                reason: "invalid obsHistId: '1x0'".into(),
            })
        );
    }

    #[test]
    fn test_parse_images() {
        let images = parse_images(Utf8Path::new("opsim.dat"), OPSIM).unwrap();
        assert_eq!(images.len(), 3);
        assert_eq!(images.exp_mjd(102), Some(53031.4));
        assert_eq!(images.field_id(101), Some(1201));
    }

    #[test]
    fn test_lookups() {
        let dias = parse_dias(Utf8Path::new("dias.dat"), DIAS).unwrap();
        let images = parse_images(Utf8Path::new("opsim.dat"), OPSIM).unwrap();
        let mut source = FileMetadataSource::from_records(dias.into_values(), images);

        assert_eq!(source.num_dias(), 3);
        assert_eq!(source.lookup_dia(3).unwrap().ssm_id, "S1");
        assert_eq!(source.lookup_dia(4), Err(MopsError::UnknownDiaSource(4)));

        let subset = source.image_metadata(&[101, 102, 555]).unwrap();
        assert_eq!(subset.len(), 2);
        assert!(!subset.contains(100));
    }
}
