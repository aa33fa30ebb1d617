//! SQL text of the database backend.
//!
//! Kept apart from the `diesel` calls so that it is built, and tested, without a MySQL
//! client library.
use itertools::Itertools;

use crate::constants::ObsHistId;

/// Backquoted `schema`.`table` reference.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("`{}`.`{}`", schema.replace('`', "``"), table.replace('`', "``"))
}

/// Point lookup of one diaSource, bound to a single `diaSourceId` parameter.
///
/// Column aliases match the fields of the row struct of the database backend.
pub fn dia_source_query(dias_table: &str) -> String {
    format!(
        "SELECT CAST(diaSourceId AS SIGNED) AS dia_id, ra, decl, taiMidPoint AS mjd, mag, \
         CAST(ssmId AS CHAR) AS ssm_id FROM {dias_table} WHERE diaSourceId = ?"
    )
}

/// Bulk lookup of image metadata, `None` when there is nothing to look up.
///
/// Ids are integers, so they are inlined in the `IN` list.
pub fn opsim_query(opsim_table: &str, obs_hists: &[ObsHistId]) -> Option<String> {
    if obs_hists.is_empty() {
        return None;
    }
    Some(format!(
        "SELECT expMjd AS exp_mjd, CAST(fieldId AS SIGNED) AS field_id, \
         CAST(obsHistId AS SIGNED) AS obs_hist_id \
         FROM {opsim_table} WHERE obsHistId IN ({})",
        obs_hists.iter().join(", ")
    ))
}
