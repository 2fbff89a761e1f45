//! Data types and methods to store an upper air sounding and reduce it to the values used in the
//! dataset: temperature and dew point at 925 and 850 hPa.

use crate::{config::ReductionConfig, utility::round_to_tenths};
use chrono::NaiveDateTime;
use metfor::{Celsius, HectoPascal, Quantity};
use tracing::{debug, info};

mod archive;
mod level;

pub use self::{
    archive::{parse_marker, read_sounding_archive},
    level::SoundingLevel,
};

/// Lower target level.
pub const LOWER_LEVEL: HectoPascal = HectoPascal(925.0);
/// Upper target level.
pub const UPPER_LEVEL: HectoPascal = HectoPascal(850.0);

/// A single sounding: a launch time and the levels in the order they appeared in the source.
///
/// Levels are roughly ordered from the surface up, but that isn't guaranteed and duplicate
/// pressures are possible.
#[derive(Clone, Debug, PartialEq)]
pub struct Sounding {
    station: Option<String>,
    launch_time: NaiveDateTime,
    levels: Vec<SoundingLevel>,
}

impl Sounding {
    /// Create a new sounding without any levels.
    #[inline]
    pub fn new(launch_time: NaiveDateTime) -> Self {
        Sounding {
            station: None,
            launch_time,
            levels: vec![],
        }
    }

    /// Builder method for the station identifier.
    #[inline]
    pub fn with_station<S>(mut self, station: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.station = Option::from(station);
        self
    }

    /// Builder method for the levels.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use sounding_surface_join::{Sounding, SoundingLevel};
    ///
    /// let launch = NaiveDate::from_ymd(2023, 1, 15).and_hms(0, 0, 0);
    /// let levels = vec![
    ///     SoundingLevel::parse("10  1520  92500B  762B  -15B  934    12   250    51"),
    ///     SoundingLevel::parse("10  3620  85000B 1451B  -40B  832    25   265    83"),
    /// ];
    ///
    /// let snd = Sounding::new(launch).with_levels(levels);
    /// assert_eq!(snd.levels().len(), 2);
    /// ```
    #[inline]
    pub fn with_levels(mut self, levels: Vec<SoundingLevel>) -> Self {
        self.levels = levels;
        self
    }

    /// Add a level to the top of the sounding.
    #[inline]
    pub fn push_level(&mut self, level: SoundingLevel) {
        self.levels.push(level);
    }

    /// The station identifier from the source, if known.
    #[inline]
    pub fn station(&self) -> Option<&str> {
        self.station.as_deref()
    }

    /// Launch time, UTC.
    #[inline]
    pub fn launch_time(&self) -> NaiveDateTime {
        self.launch_time
    }

    /// All the levels in source order.
    #[inline]
    pub fn levels(&self) -> &[SoundingLevel] {
        &self.levels
    }

    /// Reduce to temperature and dew point at 925 and 850 hPa.
    ///
    /// For each target the nearest level within the tolerance that has a temperature and a dew
    /// point wins, ties go to the level that came first. Returns `None` if either target has no
    /// usable level.
    pub fn reduce(&self, config: &ReductionConfig) -> Option<ReducedSounding> {
        let lower = select_level(&self.levels, LOWER_LEVEL, config.tolerance());
        let upper = select_level(&self.levels, UPPER_LEVEL, config.tolerance());

        match (lower, upper) {
            (Some((t925, td925)), Some((t850, td850))) => Some(ReducedSounding {
                launch_time: self.launch_time,
                t925: round_celsius(t925),
                td925: round_celsius(td925),
                t850: round_celsius(t850),
                td850: round_celsius(td850),
            }),
            _ => {
                debug!(
                    launch_time = %self.launch_time,
                    has_925 = lower.is_some(),
                    has_850 = upper.is_some(),
                    "sounding missing a target level"
                );
                None
            }
        }
    }
}

/// A sounding reduced to the values used in the dataset, rounded to tenths of a degree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReducedSounding {
    /// Launch time, UTC.
    pub launch_time: NaiveDateTime,
    /// Temperature at 925 hPa
    pub t925: Celsius,
    /// Dew point at 925 hPa
    pub td925: Celsius,
    /// Temperature at 850 hPa
    pub t850: Celsius,
    /// Dew point at 850 hPa
    pub td850: Celsius,
}

/// Reduce a batch of soundings, dropping the ones that can't be reduced. The result is sorted by
/// launch time.
pub fn reduce_soundings(soundings: &[Sounding], config: &ReductionConfig) -> Vec<ReducedSounding> {
    let mut reduced: Vec<ReducedSounding> = soundings
        .iter()
        .filter_map(|snd| snd.reduce(config))
        .collect();

    reduced.sort_by_key(|snd| snd.launch_time);

    info!(
        soundings = soundings.len(),
        reduced = reduced.len(),
        "reduced soundings to 925 and 850 hPa"
    );

    reduced
}

fn select_level(
    levels: &[SoundingLevel],
    target: HectoPascal,
    tolerance: HectoPascal,
) -> Option<(Celsius, Celsius)> {
    levels
        .iter()
        .filter_map(|lvl| {
            let p = lvl.pressure.into_option()?;
            let diff = (p.unpack() - target.unpack()).abs();
            if diff >= tolerance.unpack() {
                return None;
            }

            let t = lvl.temperature.into_option()?;
            let td = lvl.dew_point()?;

            Some((diff, t, td))
        })
        // Only a strictly closer level replaces the current best
        .fold(None, |best: Option<(f64, Celsius, Celsius)>, candidate| match best {
            Some(current) if current.0 <= candidate.0 => Some(current),
            _ => Some(candidate),
        })
        .map(|(_, t, td)| (t, td))
}

fn round_celsius(val: Celsius) -> Celsius {
    Celsius(round_to_tenths(val.unpack()))
}
