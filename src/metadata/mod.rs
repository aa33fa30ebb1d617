//! # Detection and image metadata
//!
//! The batch assembler needs two kinds of metadata:
//! * **diaSources**: one record per detection, looked up by [`DiaId`] when a tracklet
//!   is serialized;
//! * **images**: observation time and field of each `obsHistId`, looked up in bulk
//!   before the tracking window is computed.
//!
//! Both are served by a [`MetadataSource`]. Two implementations exist:
//! * [`FileMetadataSource`](file_backed::FileMetadataSource): dumps on local disk,
//!   loaded fully in memory;
//! * `DatabaseMetadataSource`: MySQL queries through `diesel` (cargo feature
//!   `database`).
//!
//! Callers only depend on the trait. [`open_metadata_source`] picks a backend for each
//! kind of metadata from [`SourceSettings`] (a [`RoutedSource`] combines two of them)
//! and fails fast, before any I/O, when a kind has neither a dump nor a database.
#[cfg(feature = "database")]
pub mod database;
pub mod file_backed;
pub mod sql;

use std::collections::HashMap;

use ahash::RandomState;
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};

use crate::config::{BatchConfig, DatabaseSettings};
use crate::constants::{Degree, DiaId, FieldId, ObsHistId, MJD};
use crate::mops_errors::MopsError;
pub use file_backed::FileMetadataSource;

/// A single detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaSource {
    pub dia_id: DiaId,
    pub obs_time: MJD,
    /// Object label as found in the source (`ssmId`), possibly a "no object" marker.
    pub ssm_id: String,
    /// Image of the detection. Not provided by the database point lookup.
    pub obs_hist_id: Option<ObsHistId>,
    pub ra: Degree,
    pub dec: Degree,
    pub mag: f64,
}

/// Observation time and field id of a set of images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    exp_mjd: HashMap<ObsHistId, MJD, RandomState>,
    field_id: HashMap<ObsHistId, FieldId, RandomState>,
}

impl ImageMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, obs_hist: ObsHistId, exp_mjd: MJD, field_id: FieldId) {
        self.exp_mjd.insert(obs_hist, exp_mjd);
        self.field_id.insert(obs_hist, field_id);
    }

    pub fn exp_mjd(&self, obs_hist: ObsHistId) -> Option<MJD> {
        self.exp_mjd.get(&obs_hist).copied()
    }

    pub fn field_id(&self, obs_hist: ObsHistId) -> Option<FieldId> {
        self.field_id.get(&obs_hist).copied()
    }

    pub fn contains(&self, obs_hist: ObsHistId) -> bool {
        self.exp_mjd.contains_key(&obs_hist)
    }

    pub fn len(&self) -> usize {
        self.exp_mjd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exp_mjd.is_empty()
    }

    /// Copy of the records whose id is in `obs_hists`; unknown ids are ignored.
    pub fn restricted_to(&self, obs_hists: &[ObsHistId]) -> ImageMetadata {
        let mut subset = ImageMetadata::new();
        for &obs_hist in obs_hists {
            if let (Some(mjd), Some(field)) = (self.exp_mjd(obs_hist), self.field_id(obs_hist)) {
                subset.insert(obs_hist, mjd, field);
            }
        }
        subset
    }
}

/// Lookup capability shared by every metadata backend.
pub trait MetadataSource {
    /// Point lookup of one detection.
    ///
    /// Return
    /// ----------
    /// * The detection, or [`MopsError::UnknownDiaSource`] when the id is not known.
    fn lookup_dia(&mut self, dia_id: DiaId) -> Result<DiaSource, MopsError>;

    /// Bulk lookup of image metadata.
    ///
    /// Only the requested ids are returned; ids unknown to the source are absent from
    /// the result rather than reported as errors.
    fn image_metadata(&mut self, obs_hists: &[ObsHistId]) -> Result<ImageMetadata, MopsError>;
}

/// Inputs from which a [`MetadataSource`] can be opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSettings {
    /// Dump of diaSources (`diaId obsHistId ssmId ra dec expMjd mag snr`).
    pub dias_file: Option<Utf8PathBuf>,
    /// Dump of opsim images (`expMjd fieldId obsHistId`).
    pub opsim_file: Option<Utf8PathBuf>,
    pub database: DatabaseSettings,
}

/// Where one kind of metadata is read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backend<'a> {
    Dump(&'a Utf8Path),
    Database,
}

impl SourceSettings {
    pub fn from_files(dias_file: impl Into<Utf8PathBuf>, opsim_file: impl Into<Utf8PathBuf>) -> Self {
        SourceSettings {
            dias_file: Some(dias_file.into()),
            opsim_file: Some(opsim_file.into()),
            database: DatabaseSettings::default(),
        }
    }

    /// Settings for `config`. The diaSource dump is only kept when
    /// `config.dias_from_file` is set; otherwise diaSources come from the database.
    pub fn from_config(
        config: &BatchConfig,
        dias_file: Option<Utf8PathBuf>,
        opsim_file: Option<Utf8PathBuf>,
    ) -> Self {
        let dias_file = match dias_file {
            Some(path) if !config.dias_from_file => {
                warn!("dias_from_file is off, ignoring the diaSource dump {path}");
                None
            }
            other => other,
        };
        SourceSettings {
            dias_file,
            opsim_file,
            database: config.database.clone(),
        }
    }

    /// Settings from the positional dump arguments of `make_link_tracklets_input`.
    ///
    /// `dumps` must hold `diasDump opSimDump` when `config.dias_from_file` is set and be
    /// empty otherwise.
    pub fn from_arguments(config: &BatchConfig, dumps: &[Utf8PathBuf]) -> Result<Self, MopsError> {
        match (config.dias_from_file, dumps) {
            (true, [dias, opsim]) => Ok(SourceSettings::from_config(
                config,
                Some(dias.clone()),
                Some(opsim.clone()),
            )),
            (false, []) => Ok(SourceSettings::from_config(config, None, None)),
            (true, _) => Err(MopsError::Usage(
                "makeLinkTrackletsInput <obsHistId> <outFileName> <diasDump> <opSimDump>".into(),
            )),
            (false, _) => Err(MopsError::Usage(
                "makeLinkTrackletsInput <obsHistId> <outFileName>".into(),
            )),
        }
    }

    fn has_database(&self) -> bool {
        self.database.url.is_some()
    }

    /// Backend of the diaSource lookups: the dump when given, the database otherwise.
    pub fn dias_backend(&self) -> Backend<'_> {
        self.dias_file
            .as_deref()
            .map_or(Backend::Database, Backend::Dump)
    }

    /// Backend of the image lookups: the dump when given, the database otherwise.
    pub fn images_backend(&self) -> Backend<'_> {
        self.opsim_file
            .as_deref()
            .map_or(Backend::Database, Backend::Dump)
    }

    /// Configuration checks performed before any I/O.
    pub fn validate(&self) -> Result<(), MopsError> {
        if self.dias_file.is_none() && !self.has_database() {
            return Err(MopsError::MissingDiaSourceInput);
        }
        if self.opsim_file.is_none() && !self.has_database() {
            return Err(MopsError::MissingImageInput);
        }
        let needs_database = self.dias_backend() == Backend::Database
            || self.images_backend() == Backend::Database;
        if needs_database && !cfg!(feature = "database") {
            return Err(MopsError::DatabaseDisabled);
        }
        Ok(())
    }
}

/// Serves diaSources and images from two different backends.
pub struct RoutedSource {
    dias: Box<dyn MetadataSource>,
    images: Box<dyn MetadataSource>,
}

impl RoutedSource {
    pub fn new(dias: Box<dyn MetadataSource>, images: Box<dyn MetadataSource>) -> Self {
        RoutedSource { dias, images }
    }
}

impl MetadataSource for RoutedSource {
    fn lookup_dia(&mut self, dia_id: DiaId) -> Result<DiaSource, MopsError> {
        self.dias.lookup_dia(dia_id)
    }

    fn image_metadata(&mut self, obs_hists: &[ObsHistId]) -> Result<ImageMetadata, MopsError> {
        self.images.image_metadata(obs_hists)
    }
}

/// Open the metadata backend described by `settings`.
///
/// Each kind of metadata is read from its dump when one is given and from the
/// database otherwise. When both kinds use the same backend a single source serves
/// them; a mixed setup is served by a [`RoutedSource`].
///
/// Errors
/// ----------
/// * [`MopsError::MissingDiaSourceInput`] / [`MopsError::MissingImageInput`] when a kind
///   of metadata has neither a dump nor a database, checked before anything is opened.
/// * [`MopsError::DatabaseDisabled`] when the database is needed but the crate was built
///   without the `database` feature, also checked before anything is opened.
pub fn open_metadata_source(
    settings: &SourceSettings,
) -> Result<Box<dyn MetadataSource>, MopsError> {
    settings.validate()?;

    match (settings.dias_backend(), settings.images_backend()) {
        (Backend::Dump(dias_file), Backend::Dump(opsim_file)) => {
            info!("Reading Dias from file...");
            let source = FileMetadataSource::from_files(dias_file, opsim_file)?;
            info!("... Done.");
            Ok(Box::new(source))
        }
        (Backend::Database, Backend::Database) => open_database(&settings.database),
        (Backend::Dump(dias_file), Backend::Database) => {
            let database = open_database(&settings.database)?;
            info!("Reading Dias from file...");
            let dias = FileMetadataSource::from_dias_file(dias_file)?;
            info!("... Done.");
            Ok(Box::new(RoutedSource::new(Box::new(dias), database)))
        }
        (Backend::Database, Backend::Dump(opsim_file)) => {
            let database = open_database(&settings.database)?;
            let images = FileMetadataSource::from_opsim_file(opsim_file)?;
            Ok(Box::new(RoutedSource::new(database, Box::new(images))))
        }
    }
}

#[cfg(feature = "database")]
fn open_database(settings: &DatabaseSettings) -> Result<Box<dyn MetadataSource>, MopsError> {
    Ok(Box::new(database::DatabaseMetadataSource::connect(settings)?))
}

#[cfg(not(feature = "database"))]
fn open_database(_settings: &DatabaseSettings) -> Result<Box<dyn MetadataSource>, MopsError> {
    Err(MopsError::DatabaseDisabled)
}
