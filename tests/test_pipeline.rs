use chrono::NaiveDate;
use sounding_surface_join::{
    join, join_with_summary, reduce_soundings, write_dataset, write_surface_observations,
    ArchiveConfig, JoinConfig, JoinSummary, PrecipCategory, ReductionConfig,
};

mod utils;

fn build_dataset(archive_config: &ArchiveConfig) -> (String, JoinSummary) {
    let surface_obs = utils::load_surface_file();
    let soundings = utils::load_sounding_file(archive_config);
    let reduced = reduce_soundings(&soundings, &ReductionConfig::default());

    let (records, summary) = join_with_summary(&reduced, &surface_obs, &JoinConfig::default());

    let mut buf = vec![];
    write_dataset(&mut buf, &records).expect("Error writing dataset");

    (String::from_utf8(buf).expect("not utf8"), summary)
}

#[test]
fn test_end_to_end_dataset() {
    let (dataset, summary) = build_dataset(&ArchiveConfig::default());

    assert_eq!(dataset, utils::EXPECTED_DATASET);
    assert_eq!(
        summary,
        JoinSummary {
            soundings: 5,
            matched: 4,
            no_window: 1,
            missing_values: 0,
            unknown_precip: 0,
        }
    );
}

#[test]
fn test_output_is_repeatable() {
    let (first, _) = build_dataset(&ArchiveConfig::default());
    let (second, _) = build_dataset(&ArchiveConfig::default());

    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_station_filter() {
    let config = ArchiveConfig::new().with_station("#USM00072645".to_owned());
    let (dataset, summary) = build_dataset(&config);

    assert_eq!(summary.soundings, 4);
    assert_eq!(summary.matched, 3);
    assert!(!dataset.contains("2023-01-17T00:00:00"));
    assert!(dataset.contains("2023-01-18T11:00:00"));
}

#[test]
fn test_sounding_without_850_is_excluded() {
    let soundings = utils::load_sounding_file(&ArchiveConfig::default());
    assert_eq!(soundings.len(), 6);

    let excluded = NaiveDate::from_ymd(2023, 1, 15).and_hms(12, 0, 0);
    assert!(soundings.iter().any(|snd| snd.launch_time() == excluded));

    let reduced = reduce_soundings(&soundings, &ReductionConfig::default());
    assert_eq!(reduced.len(), 5);
    assert!(reduced.iter().all(|snd| snd.launch_time != excluded));

    // There is a surface observation with a known type 15 minutes after the launch.
    let surface_obs = utils::load_surface_file();
    let records = join(&reduced, &surface_obs, &JoinConfig::default());
    assert!(records.iter().all(|rec| rec.timestamp != excluded));
}

#[test]
fn test_missing_nominal_hour_uses_release_time() {
    let soundings = utils::load_sounding_file(&ArchiveConfig::default());

    let last = soundings.last().expect("no soundings");
    assert_eq!(
        last.launch_time(),
        NaiveDate::from_ymd(2023, 1, 18).and_hms(11, 0, 0)
    );
}

#[test]
fn test_surface_file_filtering() {
    let surface_obs = utils::load_surface_file();

    // The summary of day and the report with only a bad quality read are dropped.
    assert_eq!(surface_obs.len(), 8);
    assert!(surface_obs
        .iter()
        .all(|ob| ob.precip_type() != PrecipCategory::Unknown));

    let mut buf = vec![];
    write_surface_observations(&mut buf, &surface_obs).expect("Error writing observations");
    let table = String::from_utf8(buf).expect("not utf8");

    let mut lines = table.lines();
    assert_eq!(lines.next(), Some("date,tmp,dew,precip_type"));
    assert_eq!(lines.next(), Some("2023-01-14T23:30:00,-1.0,-3.0,0"));
    assert!(table.contains("2023-01-16T12:20:00,,1.5,0\n"));
    assert!(table.contains("2023-01-18T11:53:00,-0.5,-1.1,2\n"));
}

#[test]
fn test_reading_from_memory_matches_file() {
    let text = utils::read_test_file_to_string(utils::SOUNDING_FILE);

    let from_memory =
        sounding_surface_join::read_sounding_archive(text.as_bytes(), &ArchiveConfig::default())
            .expect("Error reading soundings");
    let from_file = utils::load_sounding_file(&ArchiveConfig::default());

    assert_eq!(from_memory.len(), from_file.len());
    for (mem, file) in from_memory.iter().zip(&from_file) {
        assert_eq!(mem.station(), file.station());
        assert_eq!(mem.launch_time(), file.launch_time());
        assert_eq!(mem.levels().len(), file.levels().len());
    }
}
