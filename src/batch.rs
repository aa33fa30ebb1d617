//! # One link-tracklets batch job
//!
//! Builds the linker input of one start image:
//!
//! 1. discover the images having a tracklet file ([`TrackletCatalog::discover`]);
//! 2. fetch their observation time and field ([`MetadataSource::image_metadata`]);
//! 3. select the support images in the tracking window ([`select_window`]);
//! 4. read the tracklet files of the batch and write every output file
//!    ([`write_output_files`]).
//!
//! Jobs are independent: scale-out is done by running one process per start image.
use camino::Utf8Path;
use log::info;

use crate::config::BatchConfig;
use crate::constants::ObsHistId;
use crate::metadata::MetadataSource;
use crate::mops_errors::MopsError;
use crate::tracklets::{TrackletCatalog, TrackletFile};
use crate::window::{select_window, BatchImages};
use crate::writer::{write_output_files, OutputPaths, WriteSummary};

/// Outcome of [`make_link_tracklets_input`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub images: BatchImages,
    pub paths: OutputPaths,
    pub written: WriteSummary,
}

/// Write the linker input of the batch rooted in `start` under the base name `out_base`.
///
/// Arguments
/// -----------------
/// * `start` – The start image.
/// * `out_base` – Base name of every output file, see [`OutputPaths::from_base`].
/// * `source` – diaSource and image metadata.
/// * `catalog` – Location of the per-image tracklet files.
/// * `config` – Tracking window, optional outputs, observatory code.
///
/// Errors
/// ----------
/// * [`MopsError::UnknownImage`] if the start image has no metadata.
/// * [`MopsError::UnknownDiaSource`] if a tracklet references an unknown detection.
/// * I/O errors on any tracklet file or output file.
pub fn make_link_tracklets_input(
    start: ObsHistId,
    out_base: &Utf8Path,
    source: &mut dyn MetadataSource,
    catalog: &TrackletCatalog,
    config: &BatchConfig,
) -> Result<BatchSummary, MopsError> {
    let candidates = catalog.discover()?;
    info!("{} images with tracklets in {}", candidates.len(), catalog.dir());

    let mut requested = candidates.clone();
    if !requested.contains(&start) {
        requested.push(start);
    }
    info!("Reading ObsHist info...");
    let images = source.image_metadata(&requested)?;
    info!("...Done.");

    let batch = select_window(start, &candidates, &images, config.tracking_window_days)?;
    info!(
        "obsHist {start}: {} support images within {} days",
        batch.support.len(),
        config.tracking_window_days
    );

    let files = batch
        .all()
        .map(|obs_hist| catalog.read(obs_hist))
        .collect::<Result<Vec<TrackletFile>, _>>()?;

    let paths = OutputPaths::from_base(out_base, config.start_t_range_dir.as_deref());
    let written = write_output_files(&paths, &batch, &files, &images, source, config)?;

    Ok(BatchSummary {
        images: batch,
        paths,
        written,
    })
}
