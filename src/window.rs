//! # Tracking window selection
//!
//! Given a start image, find the images that may contribute tracklets to tracks rooted
//! in it: images observed strictly after the start image and at most
//! `tracking_window_days` nights later.
//!
//! Images are bucketed by night number (`floor(MJD)`), then nights `N0 ..= N0 + W`
//! are scanned in increasing order, `N0` being the night of the start image. Within a
//! night, images keep the order of the candidate list. The strict time comparison is
//! what excludes images of night `N0` observed before (or together with) the start
//! image.
use std::collections::HashMap;

use ahash::RandomState;
use log::{debug, warn};

use crate::constants::{NightNumber, ObsHistId, MJD};
use crate::metadata::ImageMetadata;
use crate::mops_errors::MopsError;

/// Night number of an epoch.
pub fn night_number(mjd: MJD) -> NightNumber {
    mjd.floor() as NightNumber
}

/// Images of one batch job: the start image first, then the support images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchImages {
    pub start: Vec<ObsHistId>,
    pub support: Vec<ObsHistId>,
}

impl BatchImages {
    /// Start images then support images, the order in which tracklet ids are assigned.
    pub fn all(&self) -> impl Iterator<Item = ObsHistId> + '_ {
        self.start.iter().chain(self.support.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.start.len() + self.support.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group `candidates` by night number. Candidates without metadata are skipped.
pub fn bucket_by_night(
    candidates: &[ObsHistId],
    images: &ImageMetadata,
) -> HashMap<NightNumber, Vec<ObsHistId>, RandomState> {
    let mut nights: HashMap<NightNumber, Vec<ObsHistId>, RandomState> = HashMap::default();
    for &obs_hist in candidates {
        match images.exp_mjd(obs_hist) {
            Some(mjd) => nights.entry(night_number(mjd)).or_default().push(obs_hist),
            None => warn!("No metadata for obsHist {obs_hist}, ignoring its tracklets"),
        }
    }
    nights
}

/// Select the support images of `start`.
///
/// Arguments
/// -----------------
/// * `start` – The start image.
/// * `candidates` – Images having a tracklet file.
/// * `images` – Observation times of (at least) `start` and the candidates.
/// * `window_days` – Number of nights after the start night to scan.
///
/// Return
/// ----------
/// * The [`BatchImages`] of the job, or [`MopsError::UnknownImage`] when the start image
///   has no known observation time.
pub fn select_window(
    start: ObsHistId,
    candidates: &[ObsHistId],
    images: &ImageMetadata,
    window_days: u32,
) -> Result<BatchImages, MopsError> {
    let start_mjd = images
        .exp_mjd(start)
        .ok_or(MopsError::UnknownImage(start))?;
    let first_night = night_number(start_mjd);
    let nights = bucket_by_night(candidates, images);

    let mut support = Vec::new();
    for night in first_night..=first_night + NightNumber::from(window_days) {
        let Some(tonight) = nights.get(&night) else {
            continue;
        };
        support.extend(tonight.iter().copied().filter(|&obs_hist| {
            images
                .exp_mjd(obs_hist)
                .is_some_and(|mjd| mjd > start_mjd)
        }));
    }
    debug!(
        "obsHist {start} (night {first_night}): {} support images in {} nights",
        support.len(),
        window_days + 1
    );

    Ok(BatchImages {
        start: vec![start],
        support,
    })
}
