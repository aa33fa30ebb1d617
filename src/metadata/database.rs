//! # MySQL-backed metadata
//!
//! Serves diaSource point lookups and opsim bulk lookups with raw SQL through `diesel`
//! on a single blocking [`MysqlConnection`].
//!
//! Queried tables
//! -----------------
//! * `<dias_db>.<dias_table>`: `diaSourceId, ra, decl, taiMidPoint, mag, ssmId`
//! * `<opsim_db>.<opsim_table>`: `expMjd, fieldId, obsHistId`
//!
//! Schema and table names come from [`DatabaseSettings`]. A failed query or connection
//! is reported as [`MopsError::Database`]; nothing is retried.
use diesel::mysql::MysqlConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use log::debug;

use super::sql::{dia_source_query, opsim_query, qualified_table};
use super::{DiaSource, ImageMetadata, MetadataSource};
use crate::config::DatabaseSettings;
use crate::constants::{DiaId, ObsHistId};
use crate::mops_errors::MopsError;

#[derive(QueryableByName)]
struct DiaSourceRow {
    #[diesel(sql_type = BigInt)]
    dia_id: i64,
    #[diesel(sql_type = Double)]
    ra: f64,
    #[diesel(sql_type = Double)]
    decl: f64,
    #[diesel(sql_type = Double)]
    mjd: f64,
    #[diesel(sql_type = Double)]
    mag: f64,
    #[diesel(sql_type = Nullable<Text>)]
    ssm_id: Option<String>,
}

#[derive(QueryableByName)]
struct OpsimRow {
    #[diesel(sql_type = Double)]
    exp_mjd: f64,
    #[diesel(sql_type = BigInt)]
    field_id: i64,
    #[diesel(sql_type = BigInt)]
    obs_hist_id: i64,
}

pub struct DatabaseMetadataSource {
    conn: MysqlConnection,
    dias_table: String,
    opsim_table: String,
}

/// Label written for detections without an associated object.
const NULL_SSM_ID: &str = "NULL";

impl DatabaseMetadataSource {
    pub fn connect(settings: &DatabaseSettings) -> Result<Self, MopsError> {
        let url = settings
            .url
            .as_deref()
            .ok_or_else(|| MopsError::InvalidConfig("database url is not set".into()))?;
        let conn = MysqlConnection::establish(url)?;
        Ok(DatabaseMetadataSource {
            conn,
            dias_table: qualified_table(&settings.dias_db, &settings.dias_table),
            opsim_table: qualified_table(&settings.opsim_db, &settings.opsim_table),
        })
    }
}

impl MetadataSource for DatabaseMetadataSource {
    fn lookup_dia(&mut self, dia_id: DiaId) -> Result<DiaSource, MopsError> {
        let row = sql_query(dia_source_query(&self.dias_table))
            .bind::<BigInt, _>(dia_id)
            .get_result::<DiaSourceRow>(&mut self.conn)
            .optional()?
            .ok_or(MopsError::UnknownDiaSource(dia_id))?;

        Ok(DiaSource {
            dia_id: row.dia_id,
            obs_time: row.mjd,
            ssm_id: row.ssm_id.unwrap_or_else(|| NULL_SSM_ID.to_string()),
            obs_hist_id: None,
            ra: row.ra,
            dec: row.decl,
            mag: row.mag,
        })
    }

    fn image_metadata(&mut self, obs_hists: &[ObsHistId]) -> Result<ImageMetadata, MopsError> {
        let mut images = ImageMetadata::new();
        let Some(query) = opsim_query(&self.opsim_table, obs_hists) else {
            return Ok(images);
        };
        let rows = sql_query(query).load::<OpsimRow>(&mut self.conn)?;
        debug!("{} of {} obsHists found in {}", rows.len(), obs_hists.len(), self.opsim_table);

        for row in rows {
            images.insert(row.obs_hist_id, row.exp_mjd, row.field_id);
        }
        Ok(images)
    }
}
