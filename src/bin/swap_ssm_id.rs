use camino::Utf8PathBuf;
use clap::Parser;
use log::info;

use mopsprep::constants::DEFAULT_TRACK_ID_FILE;
use mopsprep::logging::setup_logging;
use mopsprep::remap::{default_output_path, swap_ssm_ids};
use mopsprep::MopsError;

/// Replace the string ssmIds of a detection table by dense integers.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Whitespace-separated table with a header row.
    input_file: Utf8PathBuf,

    /// Where to write the `<original> <integer>` mapping.
    #[arg(short = 't', long = "track-id", default_value = DEFAULT_TRACK_ID_FILE)]
    track_id: Utf8PathBuf,

    /// Rewritten table; `<input>_newId.<ext>` when omitted.
    #[arg(short = 'o', long = "out-file")]
    out_file: Option<Utf8PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), MopsError> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level)?;

    let output = cli
        .out_file
        .unwrap_or_else(|| default_output_path(&cli.input_file));
    let summary = swap_ssm_ids(&cli.input_file, &cli.track_id, &output)?;
    info!(
        "{} distinct '{}' values over {} rows",
        summary.distinct_ids, summary.column, summary.rows
    );
    Ok(())
}
