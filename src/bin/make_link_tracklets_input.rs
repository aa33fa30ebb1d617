use camino::Utf8PathBuf;
use clap::Parser;
use log::info;

use mopsprep::config::BatchConfig;
use mopsprep::constants::ObsHistId;
use mopsprep::logging::setup_logging;
use mopsprep::{
    make_link_tracklets_input, open_metadata_source, MopsError, SourceSettings, TrackletCatalog,
};

/// Build the link-tracklets input of one start image.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Start image.
    obs_hist_id: ObsHistId,

    /// Base name of the output files.
    out_file_name: Utf8PathBuf,

    /// `diasDump opSimDump`, required when reading metadata from files.
    #[arg(num_args = 0..=2)]
    dumps: Vec<Utf8PathBuf>,

    /// TOML batch configuration; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), MopsError> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => BatchConfig::from_file(path)?,
        None => BatchConfig::default(),
    };
    let settings = SourceSettings::from_arguments(&config, &cli.dumps)?;
    let mut source = open_metadata_source(&settings)?;
    let catalog = TrackletCatalog::from_config(&config);

    let summary = make_link_tracklets_input(
        cli.obs_hist_id,
        &cli.out_file_name,
        source.as_mut(),
        &catalog,
        &config,
    )?;
    info!(
        "obsHist {}: {} tracklets ({} detections) over {} images",
        cli.obs_hist_id,
        summary.written.num_tracklets,
        summary.written.num_records,
        summary.images.len()
    );
    Ok(())
}
