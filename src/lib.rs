//! # mopsprep
//!
//! Preparation tools for the MOPS moving-object linking pipeline:
//!
//! * [`remap`] – rewrite string `ssmId`s of a detection table into dense integers;
//! * [`batch`] – build the link-tracklets input of one start image from per-image
//!   tracklet files, using [`metadata`] from flat dumps or a MySQL database, the
//!   tracking-[`window`] selection and the [`writer`] of the MITI files.
//!
//! Both tools are also available as binaries (`swap_ssm_id`,
//! `make_link_tracklets_input`).
pub mod batch;
pub mod config;
pub mod constants;
pub mod logging;
pub mod metadata;
pub mod mops_errors;
pub mod remap;
pub mod tracklets;
pub mod window;
pub mod writer;

pub use batch::{make_link_tracklets_input, BatchSummary};
pub use config::{BatchConfig, DatabaseSettings};
pub use metadata::{open_metadata_source, DiaSource, ImageMetadata, MetadataSource, SourceSettings};
pub use mops_errors::MopsError;
pub use tracklets::TrackletCatalog;
