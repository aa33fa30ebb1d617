//! # Per-image tracklet files
//!
//! Tracklets are computed upstream and stored one file per image, in a single
//! directory, under the name `<obsHistId><suffix>` (suffix `.tracklets.byDiaId` by
//! default). Each line of a file is one tracklet: the whitespace-separated [`DiaId`]s
//! of its detections.
//!
//! [`TrackletCatalog`] owns the naming convention: it maps an image to its file,
//! discovers which images have a file, and reads a file into a [`TrackletFile`].
//!
//! The presence of a file is the only thing that makes an image visible to the
//! window selection: images without a tracklet file are never discovered.
//!
//! Blank lines carry no tracklet and are skipped; they do not consume a tracklet id.
//! They are kept in [`TrackletFile::content`], which is copied as is to the `.ids`
//! output.
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use smallvec::SmallVec;

use crate::config::BatchConfig;
use crate::constants::{DiaId, ObsHistId};
use crate::mops_errors::MopsError;

/// One tracklet: detections of the same hypothetical object on one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracklet {
    pub dia_ids: SmallVec<[DiaId; 4]>,
    /// Source line, without its line terminator.
    pub line: String,
}

impl Tracklet {
    /// Parse one line of a tracklet file. On failure, return the offending token.
    pub fn parse(line: &str) -> Result<Self, String> {
        let dia_ids = line
            .split_whitespace()
            .map(|token| token.parse::<DiaId>().map_err(|_| token.to_string()))
            .collect::<Result<SmallVec<_>, _>>()?;
        Ok(Tracklet {
            dia_ids,
            line: line.to_string(),
        })
    }
}

/// All the tracklets rooted in one image, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackletFile {
    pub obs_hist: ObsHistId,
    pub tracklets: Vec<Tracklet>,
    /// File content as read, blank lines included.
    pub content: String,
}

impl TrackletFile {
    /// Parse the content of the tracklet file of `obs_hist`. `path` is only used in
    /// error messages.
    pub fn parse(obs_hist: ObsHistId, path: &Utf8Path, content: &str) -> Result<Self, MopsError> {
        let tracklets = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                Tracklet::parse(line).map_err(|token| MopsError::InvalidTrackletLine {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    token,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrackletFile {
            obs_hist,
            tracklets,
            content: content.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.tracklets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracklets.is_empty()
    }

    /// Number of detections over all tracklets, duplicates included.
    pub fn num_detections(&self) -> usize {
        self.tracklets.iter().map(|t| t.dia_ids.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackletCatalog {
    dir: Utf8PathBuf,
    suffix: String,
}

impl TrackletCatalog {
    pub fn new(dir: impl Into<Utf8PathBuf>, suffix: impl Into<String>) -> Self {
        TrackletCatalog {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.tracklets_dir.clone(), config.tracklets_suffix.clone())
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Path of the tracklet file of `obs_hist`.
    pub fn path_for(&self, obs_hist: ObsHistId) -> Utf8PathBuf {
        self.dir.join(format!("{obs_hist}{}", self.suffix))
    }

    /// Inverse of [`path_for`](Self::path_for) on a bare file name.
    pub fn obs_hist_of(&self, file_name: &str) -> Option<ObsHistId> {
        file_name
            .strip_suffix(self.suffix.as_str())
            .and_then(|stem| stem.parse().ok())
    }

    /// Every image having a tracklet file, in increasing `obsHistId` order.
    ///
    /// Files carrying the suffix but whose prefix is not an integer are skipped with a
    /// warning.
    pub fn discover(&self) -> Result<Vec<ObsHistId>, MopsError> {
        let mut obs_hists = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !file_name.ends_with(self.suffix.as_str()) {
                continue;
            }
            match self.obs_hist_of(file_name) {
                Some(obs_hist) => obs_hists.push(obs_hist),
                None => warn!("Ignoring {file_name}: not named <obsHistId>{}", self.suffix),
            }
        }
        obs_hists.sort_unstable();
        obs_hists.dedup();
        debug!("{} tracklet files found in {}", obs_hists.len(), self.dir);
        Ok(obs_hists)
    }

    pub fn read(&self, obs_hist: ObsHistId) -> Result<TrackletFile, MopsError> {
        let path = self.path_for(obs_hist);
        let content = std::fs::read_to_string(&path)?;
        TrackletFile::parse(obs_hist, &path, &content)
    }
}
