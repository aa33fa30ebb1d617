//! MITI record formatting.
//!
//! One record per detection:
//!
//! ```text
//! ID EPOCH_MJD RA_DEG DEC_DEG MAG OBSCODE OBJECT_NAME LENGTH ANGLE
//! ```
//!
//! Floats use ten decimals; `LENGTH` and `ANGLE` are always `0.0`.
use std::fmt;

use crate::metadata::DiaSource;

#[derive(Debug, Clone, Copy)]
pub struct MitiRecord<'a, I> {
    /// Tracklet id in `.miti` files, diaSource id in `.dets` files.
    pub id: I,
    pub dia: &'a DiaSource,
    pub obs_code: &'a str,
}

impl<'a, I: fmt::Display> MitiRecord<'a, I> {
    pub fn new(id: I, dia: &'a DiaSource, obs_code: &'a str) -> Self {
        MitiRecord { id, dia, obs_code }
    }
}

impl<I: fmt::Display> fmt::Display for MitiRecord<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.10} {:.10} {:.10} {:.10} {} {} 0.0 0.0",
            self.id,
            self.dia.obs_time,
            self.dia.ra,
            self.dia.dec,
            self.dia.mag,
            self.obs_code,
            self.dia.ssm_id
        )
    }
}

#[cfg(test)]
mod miti_test {
    use super::*;

    #[test]
    fn test_record_fields() {
        let dia = DiaSource {
            dia_id: 42,
            obs_time: 53000.123456789,
            ssm_id: "S0001".into(),
            obs_hist_id: Some(85679),
            ra: 10.5,
            dec: -5.25,
            mag: 21.75,
        };
        let line = MitiRecord::new(3u64, &dia, "807").to_string();
        assert_eq!(
            line,
            "3 53000.1234567890 10.5000000000 -5.2500000000 21.7500000000 807 S0001 0.0 0.0"
        );
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[5], "807");
    }
}
