use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use mopsprep::config::BatchConfig;
use mopsprep::constants::TRACKLETS_BY_OBSHIST_SUFFIX;
use tempfile::TempDir;

/// Images of the fixture survey: `(obsHistId, expMjd, fieldId)`.
///
/// * 99 is observed before the start image 100, same night;
/// * 101 is later the same night;
/// * 103 is on night N0 + 30, the last night of the window;
/// * 102 is on night N0 + 31, outside the window.
pub const IMAGES: [(i64, f64, i64); 5] = [
    (99, 53000.05, 7),
    (100, 53000.1, 7),
    (101, 53000.2, 8),
    (102, 53031.5, 9),
    (103, 53030.9, 9),
];

/// Tracklet files of the fixture, one per image.
pub const TRACKLETS: [(i64, &str); 5] = [
    (99, "11 12\n"),
    (100, "1 2\n"),
    (101, "3 4\n\n5 6\n"),
    (102, "9 10\n"),
    (103, "7 8\n"),
];

pub struct Survey {
    pub dir: TempDir,
}

impl Survey {
    /// Lay out the dumps and tracklet files of the fixture in a temporary directory.
    pub fn new() -> Self {
        let survey = Survey {
            dir: tempfile::tempdir().unwrap(),
        };
        let root = survey.root();

        let opsim: String = IMAGES
            .iter()
            .map(|(obs_hist, mjd, field)| format!("{mjd} {field} {obs_hist}\n"))
            .collect();
        fs::write(root.join("opsim.dat"), opsim).unwrap();

        let dias: String = (1..=12)
            .map(|dia_id: i64| {
                let obs_hist = match dia_id {
                    1 | 2 => 100,
                    3..=6 => 101,
                    7 | 8 => 103,
                    9 | 10 => 102,
                    _ => 99,
                };
                let mjd = IMAGES.iter().find(|i| i.0 == obs_hist).unwrap().1;
                format!(
                    "{dia_id} {obs_hist} S{:04} {} {} {mjd} {} 10.0\n",
                    dia_id % 4,
                    120.0 + dia_id as f64 * 0.5,
                    -10.0 - dia_id as f64 * 0.25,
                    20.0 + dia_id as f64 * 0.1
                )
            })
            .collect();
        fs::write(root.join("dias.dat"), dias).unwrap();

        let tracklets = root.join("tracklets");
        fs::create_dir(&tracklets).unwrap();
        for (obs_hist, content) in TRACKLETS {
            fs::write(
                tracklets.join(format!("{obs_hist}{TRACKLETS_BY_OBSHIST_SUFFIX}")),
                content,
            )
            .unwrap();
        }
        fs::write(tracklets.join("README"), "not a tracklet file").unwrap();
        survey
    }

    pub fn root(&self) -> Utf8PathBuf {
        Utf8Path::from_path(self.dir.path()).unwrap().to_path_buf()
    }

    pub fn dias(&self) -> Utf8PathBuf {
        self.root().join("dias.dat")
    }

    pub fn opsim(&self) -> Utf8PathBuf {
        self.root().join("opsim.dat")
    }

    pub fn config(&self) -> BatchConfig {
        BatchConfig::builder()
            .tracklets_dir(self.root().join("tracklets"))
            .build()
            .unwrap()
    }

    pub fn read(&self, file_name: &str) -> String {
        fs::read_to_string(self.root().join(file_name)).unwrap()
    }
}
