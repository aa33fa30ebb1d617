//! # Link-tracklets input files
//!
//! Serializes the tracklets of a batch job (start image first, then support images)
//! into the files read by the linker. All files are derived from one base name `B`:
//!
//! | File               | Content                                                        | Written            |
//! |--------------------|----------------------------------------------------------------|--------------------|
//! | `B.miti`           | one [`MitiRecord`] per detection, tagged with its tracklet id  | always             |
//! | `B.miti.diaIds`    | the diaId of each `B.miti` record, same order                  | always             |
//! | `B.dets`           | one [`MitiRecord`] per distinct diaId, tagged with the diaId   | `write_cpp_style_inputs` |
//! | `B.ids`            | every tracklet line, verbatim                                  | `write_cpp_style_inputs` |
//! | `B.start_t_range`  | start image time + epsilon                                     | always             |
//! | `B.info`           | counts, time spans and per-image tracklet counts               | `write_stats_file` |
//!
//! Tracklet ids
//! -----------------
//! A single counter, starting at `0`, runs over the images in batch order and over the
//! tracklets of each image in file order. Every detection of a tracklet carries the
//! same id. A detection shared by two tracklets is written twice, in `B.miti` and in
//! `B.miti.diaIds`.
//!
//! Files are created or truncated without any atomicity: a failure leaves a partial set
//! of outputs.
pub mod miti;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};

use ahash::RandomState;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};

use crate::config::BatchConfig;
use crate::constants::{
    DiaId, ObsHistId, TrackletId, DETS_EXT, IDS_EXT, INFO_EXT, MITI_CHEAT_SHEET_EXT, MITI_EXT,
    MJD, START_T_RANGE_EXT,
};
use crate::metadata::{ImageMetadata, MetadataSource};
use crate::mops_errors::MopsError;
use crate::tracklets::TrackletFile;
use crate::window::BatchImages;
pub use miti::MitiRecord;

/// Number of tracklets rooted in each image of a batch.
pub type TrackletCounts = HashMap<ObsHistId, usize, RandomState>;

/// Paths of every file of a batch job.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub miti: Utf8PathBuf,
    pub miti_dia_ids: Utf8PathBuf,
    pub dets: Utf8PathBuf,
    pub ids: Utf8PathBuf,
    pub start_t_range: Utf8PathBuf,
    pub info: Utf8PathBuf,
}

impl OutputPaths {
    /// Derive every output path from `base`.
    ///
    /// When `start_t_range_dir` is given, the `.start_t_range` file is placed in that
    /// directory under the file name of `base`.
    pub fn from_base(base: &Utf8Path, start_t_range_dir: Option<&Utf8Path>) -> Self {
        let with_ext = |ext: &str| Utf8PathBuf::from(format!("{base}.{ext}"));
        let start_t_range = match start_t_range_dir {
            Some(dir) => dir.join(format!(
                "{}.{START_T_RANGE_EXT}",
                base.file_name().unwrap_or(base.as_str())
            )),
            None => with_ext(START_T_RANGE_EXT),
        };
        OutputPaths {
            miti: with_ext(MITI_EXT),
            miti_dia_ids: with_ext(MITI_CHEAT_SHEET_EXT),
            dets: with_ext(DETS_EXT),
            ids: with_ext(IDS_EXT),
            start_t_range,
            info: with_ext(INFO_EXT),
        }
    }
}

/// What was written for a batch job.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub num_tracklets: TrackletId,
    /// Number of `.miti` records, i.e. detections counted once per tracklet.
    pub num_records: usize,
    pub counts: TrackletCounts,
}

/// Write the `.miti` records and the `.miti.diaIds` cheat sheet.
///
/// Arguments
/// -----------------
/// * `miti_out`, `cheat_sheet_out` – Destinations.
/// * `files` – Tracklet files in batch order.
/// * `source` – Resolves each diaId to its record.
/// * `first_id` – Id of the first tracklet.
/// * `obs_code` – Observatory code of every record.
///
/// Return
/// ----------
/// * A [`WriteSummary`], or the first lookup/I/O error.
pub fn write_miti<W: Write, C: Write>(
    miti_out: &mut W,
    cheat_sheet_out: &mut C,
    files: &[TrackletFile],
    source: &mut dyn MetadataSource,
    first_id: TrackletId,
    obs_code: &str,
) -> Result<WriteSummary, MopsError> {
    let mut tracklet_id = first_id;
    let mut num_records = 0;
    let mut counts = TrackletCounts::default();

    for file in files {
        for tracklet in &file.tracklets {
            for &dia_id in &tracklet.dia_ids {
                let dia = source.lookup_dia(dia_id)?;
                writeln!(miti_out, "{}", MitiRecord::new(tracklet_id, &dia, obs_code))?;
                writeln!(cheat_sheet_out, "{dia_id}")?;
                num_records += 1;
            }
            tracklet_id += 1;
        }
        *counts.entry(file.obs_hist).or_default() += file.len();
    }

    Ok(WriteSummary {
        num_tracklets: tracklet_id - first_id,
        num_records,
        counts,
    })
}

/// Write the `.dets`/`.ids` pair.
///
/// `.ids` receives the content of every tracklet file verbatim, blank lines included,
/// a line terminator being added to a file not ending with one. `.dets` gets one record
/// per distinct diaId, in order of first reference, tagged with the diaId itself.
pub fn write_dets_ids<D: Write, I: Write>(
    dets_out: &mut D,
    ids_out: &mut I,
    files: &[TrackletFile],
    source: &mut dyn MetadataSource,
    obs_code: &str,
) -> Result<usize, MopsError> {
    let mut seen: HashSet<DiaId, RandomState> = HashSet::default();
    let mut dia_ids = Vec::new();

    for file in files {
        ids_out.write_all(file.content.as_bytes())?;
        if !file.content.is_empty() && !file.content.ends_with('\n') {
            writeln!(ids_out)?;
        }
        for tracklet in &file.tracklets {
            dia_ids.extend(tracklet.dia_ids.iter().copied().filter(|id| seen.insert(*id)));
        }
    }

    for &dia_id in &dia_ids {
        let dia = source.lookup_dia(dia_id)?;
        writeln!(dets_out, "{}", MitiRecord::new(dia_id, &dia, obs_code))?;
    }
    Ok(dia_ids.len())
}

/// Write the start time of the batch, shifted by `epsilon`, as a plain float.
pub fn write_start_t_range<W: Write>(out: &mut W, start_mjd: MJD, epsilon: f64) -> std::io::Result<()> {
    write!(out, "{:.6}", start_mjd + epsilon)
}

fn exp_mjd(images: &ImageMetadata, obs_hist: ObsHistId) -> Result<MJD, MopsError> {
    images.exp_mjd(obs_hist).ok_or(MopsError::UnknownImage(obs_hist))
}

/// `(min, max)` observation time of a set of images, NaN for an empty set.
fn time_span(images: &ImageMetadata, obs_hists: &[ObsHistId]) -> Result<(MJD, MJD), MopsError> {
    if obs_hists.is_empty() {
        return Ok((f64::NAN, f64::NAN));
    }
    let (mut first, mut last) = (f64::INFINITY, f64::NEG_INFINITY);
    for &obs_hist in obs_hists {
        let mjd = exp_mjd(images, obs_hist)?;
        first = first.min(mjd);
        last = last.max(mjd);
    }
    Ok((first, last))
}

/// Six-decimal date, `nan` for an empty set.
fn format_date(mjd: MJD) -> String {
    if mjd.is_nan() {
        "nan".to_string()
    } else {
        format!("{mjd:.6}")
    }
}

/// Write the human readable statistics of a batch job.
pub fn write_stats<W: Write>(
    out: &mut W,
    batch: &BatchImages,
    images: &ImageMetadata,
    counts: &TrackletCounts,
) -> Result<(), MopsError> {
    let (start_first, start_last) = time_span(images, &batch.start)?;
    let (support_first, support_last) = time_span(images, &batch.support)?;

    writeln!(
        out,
        "!num_start_images num_support_images start_image_first_date start_image_last_date \
         support_image_first_date support_image_last_date"
    )?;
    writeln!(
        out,
        "{} {} {} {} {} {}",
        batch.start.len(),
        batch.support.len(),
        format_date(start_first),
        format_date(start_last),
        format_date(support_first),
        format_date(support_last)
    )?;

    for (obs_hists, header) in [
        (&batch.start, "FIRST ENDPOINT IMAGES"),
        (&batch.support, "SUPPORT IMAGES"),
    ] {
        writeln!(out, "\n{header}: by obsHistId fieldId expMjd trackletRootedInImage")?;
        for &obs_hist in obs_hists {
            let field_id = images
                .field_id(obs_hist)
                .ok_or(MopsError::UnknownImage(obs_hist))?;
            writeln!(
                out,
                "{} {} {:.10} {}",
                obs_hist,
                field_id,
                exp_mjd(images, obs_hist)?,
                counts.get(&obs_hist).copied().unwrap_or(0)
            )?;
        }
    }
    Ok(())
}

fn create(path: &Utf8Path) -> Result<BufWriter<File>, MopsError> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write every output file of a batch job.
///
/// Arguments
/// -----------------
/// * `paths` – Destinations, see [`OutputPaths::from_base`].
/// * `batch` – Start and support images.
/// * `files` – Tracklet files of `batch`, in [`BatchImages::all`] order.
/// * `images` – Metadata of every image of `batch`.
/// * `source` – diaSource lookups.
/// * `config` – Optional outputs, observatory code and epsilon.
///
/// A batch without start image is rejected with [`MopsError::EmptyBatch`] before any
/// file is created.
pub fn write_output_files(
    paths: &OutputPaths,
    batch: &BatchImages,
    files: &[TrackletFile],
    images: &ImageMetadata,
    source: &mut dyn MetadataSource,
    config: &BatchConfig,
) -> Result<WriteSummary, MopsError> {
    let last_start = batch.start.last().copied().ok_or(MopsError::EmptyBatch)?;
    info!("Writing output file for {}", paths.miti);

    let mut miti_out = create(&paths.miti)?;
    let mut cheat_sheet_out = create(&paths.miti_dia_ids)?;
    let summary = write_miti(
        &mut miti_out,
        &mut cheat_sheet_out,
        files,
        source,
        0,
        &config.obs_code,
    )?;
    miti_out.flush()?;
    cheat_sheet_out.flush()?;
    debug!(
        "{} tracklets, {} records written to {}",
        summary.num_tracklets, summary.num_records, paths.miti
    );

    if config.write_cpp_style_inputs {
        let mut dets_out = create(&paths.dets)?;
        let mut ids_out = create(&paths.ids)?;
        let num_dets = write_dets_ids(&mut dets_out, &mut ids_out, files, source, &config.obs_code)?;
        dets_out.flush()?;
        ids_out.flush()?;
        debug!("{num_dets} distinct detections written to {}", paths.dets);
    }

    let mut t_range_out = create(&paths.start_t_range)?;
    write_start_t_range(&mut t_range_out, exp_mjd(images, last_start)?, config.epsilon)?;
    t_range_out.flush()?;

    if config.write_stats_file {
        let mut info_out = create(&paths.info)?;
        write_stats(&mut info_out, batch, images, &summary.counts)?;
        info_out.flush()?;
    }

    info!("finished writing output file for {}", paths.miti);
    Ok(summary)
}
