//! # Constants and type definitions for mopsprep
//!
//! This module centralizes the **default values** and **common type definitions** used
//! by both tools of the crate (the ssmId remapper and the link-tracklets batch
//! assembler).
//!
//! ## Overview
//!
//! - Identifier aliases (`DiaId`, `ObsHistId`, `FieldId`) and time units (`MJD`)
//! - Default values of [`BatchConfig`](crate::config::BatchConfig)
//! - Naming conventions of the files read and written by the assembler
//! - Column aliases recognised by the remapper

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Modified Julian Date (days)
pub type MJD = f64;
/// Angle in degrees
pub type Degree = f64;
/// Unique identifier of a diaSource (one detection)
pub type DiaId = i64;
/// Unique identifier of an image (opsim `obsHistId`)
pub type ObsHistId = i64;
/// Identifier of a survey field
pub type FieldId = i64;
/// Night number, `floor(MJD)`
pub type NightNumber = i64;
/// Sequential identifier assigned to tracklets in an output file
pub type TrackletId = u64;

// -------------------------------------------------------------------------------------------------
// Batch assembler defaults
// -------------------------------------------------------------------------------------------------

/// Observatory code written in every MITI record.
pub const FORCED_OBSCODE: &str = "807";

/// Added to the start image time in the `.start_t_range` file.
/// Must be larger than zero and smaller than the minimal time between two images.
pub const EPSILON: f64 = 1e-5;

/// Only tracks spanning at most this number of nights are considered.
pub const TRACKING_WINDOW_DAYS: u32 = 30;

/// Suffix of the per-image tracklet files (`<obsHistId><suffix>`).
pub const TRACKLETS_BY_OBSHIST_SUFFIX: &str = ".tracklets.byDiaId";

/// Default directory of the per-image tracklet files.
pub const TRACKLETS_BY_OBSHIST_DIR: &str = "tracklets/trackletsByObsHist";

/// Default opsim schema and table queried by the database backend.
pub const OPSIM_DB: &str = "opsim_3_61";
pub const OPSIM_TABLE: &str = "output_opsim3_61";

/// Default diaSource schema and table queried by the database backend.
pub const DIAS_DB: &str = "mops_noDeepAstromError";
pub const DIAS_TABLE: &str = "fullerDiaSource";

// -------------------------------------------------------------------------------------------------
// Output file extensions
// -------------------------------------------------------------------------------------------------

pub const MITI_EXT: &str = "miti";
pub const MITI_CHEAT_SHEET_EXT: &str = "miti.diaIds";
pub const DETS_EXT: &str = "dets";
pub const IDS_EXT: &str = "ids";
pub const START_T_RANGE_EXT: &str = "start_t_range";
pub const INFO_EXT: &str = "info";

// -------------------------------------------------------------------------------------------------
// Remapper
// -------------------------------------------------------------------------------------------------

/// Column names accepted as the object identifier, by decreasing priority.
pub const SSM_ID_ALIASES: [&str; 5] = ["objId", "ssmId", "ObjID", "objID", "ssmID"];

/// Default mapping file written by the remapper.
pub const DEFAULT_TRACK_ID_FILE: &str = "ssmId_to_int.dat";

/// Inserted before the extension of the input file to build the default output name.
pub const NEW_ID_SUFFIX: &str = "_newId";
