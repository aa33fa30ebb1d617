mod common;

use approx::assert_relative_eq;
use common::Survey;
use mopsprep::config::BatchConfig;
use mopsprep::metadata::{FileMetadataSource, RoutedSource};
use mopsprep::{
    make_link_tracklets_input, open_metadata_source, MetadataSource, MopsError, SourceSettings,
    TrackletCatalog,
};

fn run(survey: &Survey, start: i64, config: &BatchConfig) -> Result<mopsprep::BatchSummary, MopsError> {
    let settings = SourceSettings::from_files(survey.dias(), survey.opsim());
    let mut source = open_metadata_source(&settings)?;
    let catalog = TrackletCatalog::from_config(config);
    make_link_tracklets_input(
        start,
        &survey.root().join("85679"),
        source.as_mut(),
        &catalog,
        config,
    )
}

#[test]
fn test_batch_from_dumps() {
    let survey = Survey::new();
    let summary = run(&survey, 100, &survey.config()).unwrap();

    assert_eq!(summary.images.start, vec![100]);
    assert_eq!(summary.images.support, vec![101, 103]);
    assert_eq!(summary.written.num_tracklets, 4);
    assert_eq!(summary.written.num_records, 8);

    let miti = survey.read("85679.miti");
    let records: Vec<Vec<&str>> = miti.lines().map(|l| l.split_whitespace().collect()).collect();
    assert_eq!(records.len(), 8);
    assert!(records.iter().all(|r| r.len() == 9));

    let ids: Vec<&str> = records.iter().map(|r| r[0]).collect();
    assert_eq!(ids, vec!["0", "0", "1", "1", "2", "2", "3", "3"]);

    // diaSource 3: second image, first tracklet
    let third = &records[2];
    assert_relative_eq!(third[1].parse::<f64>().unwrap(), 53000.2, epsilon = 1e-9);
    assert_relative_eq!(third[2].parse::<f64>().unwrap(), 121.5, epsilon = 1e-9);
    assert_relative_eq!(third[3].parse::<f64>().unwrap(), -10.75, epsilon = 1e-9);
    assert_relative_eq!(third[4].parse::<f64>().unwrap(), 20.3, epsilon = 1e-9);
    assert_eq!(&third[5..], ["807", "S0003", "0.0", "0.0"]);

    assert_eq!(survey.read("85679.miti.diaIds"), "1\n2\n3\n4\n5\n6\n7\n8\n");
    assert_eq!(survey.read("85679.start_t_range"), "53000.100010");

    let info = survey.read("85679.info");
    let lines: Vec<&str> = info.lines().collect();
    assert_eq!(
        lines[1],
        "1 2 53000.100000 53000.100000 53000.200000 53030.900000"
    );
    assert!(lines.contains(&"100 7 53000.1000000000 1"));
    assert!(lines.contains(&"101 8 53000.2000000000 2"));
    assert!(lines.contains(&"103 9 53030.9000000000 1"));

    assert!(!survey.root().join("85679.dets").exists());
    assert!(!survey.root().join("85679.ids").exists());
}

#[test]
fn test_optional_outputs() {
    let survey = Survey::new();
    let config = BatchConfig::from_toml_str(&format!(
        "write_cpp_style_inputs = true\n\
         write_stats_file = false\n\
         obs_code = \"I11\"\n\
         tracking_window_days = 0\n\
         tracklets_dir = \"{}\"\n\
         start_t_range_dir = \"{}\"\n",
        survey.root().join("tracklets"),
        survey.root()
    ))
    .unwrap();
    let summary = run(&survey, 100, &config).unwrap();

    assert_eq!(summary.images.support, vec![101]);
    assert_eq!(survey.read("85679.ids"), "1 2\n3 4\n\n5 6\n");

    let dets = survey.read("85679.dets");
    let first: Vec<&str> = dets.lines().map(|l| l.split_whitespace().next().unwrap()).collect();
    assert_eq!(first, vec!["1", "2", "3", "4", "5", "6"]);
    assert!(dets.lines().all(|l| l.split_whitespace().nth(5) == Some("I11")));

    assert!(!survey.root().join("85679.info").exists());
    assert_eq!(survey.read("85679.start_t_range"), "53000.100010");
}

#[test]
fn test_last_image_has_no_support() {
    let survey = Survey::new();
    let summary = run(&survey, 102, &survey.config()).unwrap();
    assert!(summary.images.support.is_empty());
    assert_eq!(summary.written.num_tracklets, 1);

    let info = survey.read("85679.info");
    assert_eq!(info.lines().nth(1), Some("1 0 53031.500000 53031.500000 nan nan"));
}

#[test]
fn test_unknown_start_image() {
    let survey = Survey::new();
    assert_eq!(
        run(&survey, 4242, &survey.config()).err(),
        Some(MopsError::UnknownImage(4242))
    );
}

#[test]
fn test_unknown_dia_source_aborts() {
    let survey = Survey::new();
    std::fs::write(
        survey.root().join("tracklets/101.tracklets.byDiaId"),
        "3 4\n5 404\n",
    )
    .unwrap();
    assert_eq!(
        run(&survey, 100, &survey.config()).err(),
        Some(MopsError::UnknownDiaSource(404))
    );
}

#[test]
fn test_missing_tracklet_directory() {
    let survey = Survey::new();
    let config = BatchConfig::builder()
        .tracklets_dir(survey.root().join("nowhere"))
        .build()
        .unwrap();
    assert!(matches!(run(&survey, 100, &config), Err(MopsError::IoError(_))));
}

#[test]
fn test_file_source_serves_requested_images_only() {
    let survey = Survey::new();
    let mut source = FileMetadataSource::from_files(&survey.dias(), &survey.opsim()).unwrap();
    assert_eq!(source.num_dias(), 12);

    let images = source.image_metadata(&[100, 103, 5000]).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images.field_id(103), Some(9));

    let dia = source.lookup_dia(7).unwrap();
    assert_eq!(dia.obs_hist_id, Some(103));
    assert_eq!(dia.ssm_id, "S0003");
}

#[test]
fn test_fail_fast_without_inputs() {
    let config = BatchConfig::default();
    let settings = SourceSettings::from_config(&config, None, None);
    assert_eq!(
        open_metadata_source(&settings).err(),
        Some(MopsError::MissingDiaSourceInput)
    );
}

#[test]
fn test_batch_with_routed_sources() {
    let survey = Survey::new();
    let dias = FileMetadataSource::from_dias_file(&survey.dias()).unwrap();
    let images = FileMetadataSource::from_opsim_file(&survey.opsim()).unwrap();
    let mut source = RoutedSource::new(Box::new(dias), Box::new(images));

    let config = survey.config();
    let summary = make_link_tracklets_input(
        100,
        &survey.root().join("routed"),
        &mut source,
        &TrackletCatalog::from_config(&config),
        &config,
    )
    .unwrap();

    assert_eq!(summary.images.support, vec![101, 103]);
    run(&survey, 100, &config).unwrap();
    assert_eq!(survey.read("routed.miti"), survey.read("85679.miti"));
    assert_eq!(survey.read("routed.info"), survey.read("85679.info"));
}
