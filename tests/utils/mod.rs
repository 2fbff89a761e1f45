#![allow(dead_code)] // Not every test file uses every helper

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use metfor::Celsius;
use optional::{none, some, Optioned};
use sounding_surface_join::{
    reconcile_window, ArchiveConfig, JoinConfig, JoinedRecord, PrecipCategory, ReducedSounding,
    Sounding, SurfaceObservation,
};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::PathBuf,
};

pub const SURFACE_FILE: &str = "surface.csv";
pub const SOUNDING_FILE: &str = "soundings.txt";

/// The dataset built from the files in `test_data` with the default configuration.
pub const EXPECTED_DATASET: &str = "\
date,sfc_t,sfc_td,t925,td925,t850,td850,precip_type
2023-01-15T00:00:00,-1.0,-3.0,-1.5,-2.7,-4.0,-6.5,1
2023-01-16T12:00:00,3.0,1.5,2.0,0.0,-1.0,-5.0,0
2023-01-17T00:00:00,-2.0,-3.0,-3.0,-4.0,-7.0,-8.0,2
2023-01-18T11:00:00,-0.5,-1.1,-1.0,-1.6,-3.0,-3.5,2
";

fn test_path(fname: &str) -> PathBuf {
    let mut test_path = PathBuf::new();
    test_path.push("test_data");
    test_path.push(fname);
    test_path
}

pub fn open_test_file(fname: &str) -> File {
    let path = test_path(fname);
    File::open(&path).expect(&format!("Error opening file: {:#?}", path))
}

pub fn load_surface_file() -> Vec<SurfaceObservation> {
    sounding_surface_join::read_surface_csv(open_test_file(SURFACE_FILE))
        .expect("Error reading surface observations")
}

pub fn load_sounding_file(config: &ArchiveConfig) -> Vec<Sounding> {
    let f = BufReader::new(open_test_file(SOUNDING_FILE));
    sounding_surface_join::read_sounding_archive(f, config).expect("Error reading soundings")
}

pub fn read_test_file_to_string(fname: &str) -> String {
    let mut contents = String::new();
    open_test_file(fname)
        .read_to_string(&mut contents)
        .expect("Error reading file");
    contents
}

/// Small deterministic generator so the property tests don't need a random number crate.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as u32
    }

    pub fn below(&mut self, n: u32) -> u32 {
        self.next_u32() % n
    }
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd(2023, 1, 1).and_hms(0, 0, 0)
}

/// Soundings every 12 hours, the usual synoptic schedule, with an occasional late launch.
pub fn synthetic_soundings(rng: &mut Lcg, count: usize) -> Vec<ReducedSounding> {
    (0..count)
        .map(|i| {
            let late = Duration::minutes(i64::from(rng.below(4)) * 15);
            ReducedSounding {
                launch_time: base_time() + Duration::hours(12 * i as i64) + late,
                t925: Celsius(-2.0),
                td925: Celsius(-3.0),
                t850: Celsius(-5.0),
                td850: Celsius(-8.0),
            }
        })
        .collect()
}

/// Irregularly spaced surface observations with gaps, missing values, and all three categories.
pub fn synthetic_surface(rng: &mut Lcg, hours: i64) -> Vec<SurfaceObservation> {
    let mut obs = vec![];
    let mut time = base_time() - Duration::hours(3);
    let end = base_time() + Duration::hours(hours);

    while time < end {
        // Mostly hourly, with specials and the odd multi hour outage.
        let step = match rng.below(10) {
            0 => Duration::minutes(i64::from(rng.below(300))),
            1 | 2 => Duration::minutes(i64::from(rng.below(30))),
            _ => Duration::minutes(60),
        };
        time = time + step;

        let temperature: Optioned<Celsius> = if rng.below(6) == 0 {
            none()
        } else {
            some(Celsius(f64::from(rng.below(100)) / 10.0 - 5.0))
        };
        let dew_point: Optioned<Celsius> = if rng.below(6) == 0 {
            none()
        } else {
            some(Celsius(f64::from(rng.below(100)) / 10.0 - 8.0))
        };
        let precip_type = match rng.below(3) {
            0 => PrecipCategory::Rain,
            1 => PrecipCategory::Mixed,
            _ => PrecipCategory::Frozen,
        };

        obs.push(SurfaceObservation::new(
            time,
            temperature,
            dew_point,
            precip_type,
        ));
    }

    obs
}

fn abs_diff(a: NaiveDateTime, b: NaiveDateTime) -> Duration {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Look at every observation for every sounding. Only agrees with the sweep when soundings are
/// further apart than the match radius plus the stop radius.
pub fn brute_force_join(
    soundings: &[ReducedSounding],
    surface_obs: &[SurfaceObservation],
    config: &JoinConfig,
) -> Vec<JoinedRecord> {
    let mut records = vec![];

    for snd in soundings {
        let window: Vec<_> = surface_obs
            .iter()
            .filter(|ob| abs_diff(snd.launch_time, ob.timestamp()) <= config.match_radius())
            .collect();

        let nearest = |value: &dyn Fn(&SurfaceObservation) -> Optioned<Celsius>| {
            window
                .iter()
                .filter_map(|ob| {
                    value(ob)
                        .into_option()
                        .map(|val| (abs_diff(snd.launch_time, ob.timestamp()), val))
                })
                // min_by_key keeps the first of equal elements
                .min_by_key(|&(delta, _)| delta)
                .map(|(_, val)| val)
        };

        let sfc_temperature = nearest(&|ob: &SurfaceObservation| ob.temperature());
        let sfc_dew_point = nearest(&|ob: &SurfaceObservation| ob.dew_point());
        let precip_type = reconcile_window(window.iter().map(|ob| ob.precip_type()));

        if let (Some(sfc_temperature), Some(sfc_dew_point), true) =
            (sfc_temperature, sfc_dew_point, precip_type.is_known())
        {
            let t = snd.launch_time;
            records.push(JoinedRecord {
                timestamp: t.date().and_hms(t.hour(), 0, 0),
                sfc_temperature,
                sfc_dew_point,
                t925: snd.t925,
                td925: snd.td925,
                t850: snd.t850,
                td850: snd.td850,
                precip_type,
            });
        }
    }

    records
}
