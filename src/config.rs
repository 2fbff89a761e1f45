//! Tunable settings for reading soundings, reducing them to the levels of interest and matching
//! them with surface observations.
//!
//! Every setting has a default matching the values the dataset has always been built with, so
//! `Default::default()` is what most callers want.

use chrono::Duration;
use metfor::HectoPascal;

/// Settings for the sweep line join of soundings with surface observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinConfig {
    match_radius: Duration,
    stop_radius: Duration,
}

impl Default for JoinConfig {
    fn default() -> Self {
        JoinConfig {
            match_radius: Duration::hours(1),
            stop_radius: Duration::hours(2),
        }
    }
}

impl JoinConfig {
    /// Create a new config with default values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::Duration;
    /// use sounding_surface_join::JoinConfig;
    ///
    /// let cfg = JoinConfig::new();
    /// assert_eq!(cfg.match_radius(), Duration::hours(1));
    /// assert_eq!(cfg.stop_radius(), Duration::hours(2));
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for the largest time difference at which a surface observation is matched
    /// to a sounding. The bound is inclusive.
    #[inline]
    pub fn with_match_radius(mut self, radius: Duration) -> Self {
        self.match_radius = radius;
        self
    }

    /// Builder method for the time difference after a sounding at which the scan for matching
    /// surface observations stops. The bound is inclusive.
    #[inline]
    pub fn with_stop_radius(mut self, radius: Duration) -> Self {
        self.stop_radius = radius;
        self
    }

    /// Largest time difference for a match.
    #[inline]
    pub fn match_radius(&self) -> Duration {
        self.match_radius
    }

    /// Distance into the future at which scanning for a sounding stops.
    #[inline]
    pub fn stop_radius(&self) -> Duration {
        self.stop_radius
    }
}

/// Settings for reducing a full sounding to temperature and dew point at 925 and 850 hPa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionConfig {
    tolerance: HectoPascal,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig {
            tolerance: HectoPascal(20.0),
        }
    }
}

impl ReductionConfig {
    /// Create a new config with default values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::HectoPascal;
    /// use sounding_surface_join::ReductionConfig;
    ///
    /// assert_eq!(ReductionConfig::new().tolerance(), HectoPascal(20.0));
    /// assert_eq!(
    ///     ReductionConfig::new().with_tolerance(HectoPascal(10.0)).tolerance(),
    ///     HectoPascal(10.0)
    /// );
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for the tolerance band around each target level. A level must be strictly
    /// closer than this to the target to be selected.
    #[inline]
    pub fn with_tolerance(mut self, tolerance: HectoPascal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Tolerance band around the targets.
    #[inline]
    pub fn tolerance(&self) -> HectoPascal {
        self.tolerance
    }
}

/// Settings for reading a fixed width sounding archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveConfig {
    station: Option<String>,
    top_pressure: HectoPascal,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            station: None,
            top_pressure: HectoPascal(600.0),
        }
    }
}

impl ArchiveConfig {
    /// Create a new config that accepts every station.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to only keep soundings from one station, e.g. `USM00072645`. A leading `#`
    /// is optional.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_surface_join::ArchiveConfig;
    ///
    /// let cfg = ArchiveConfig::new().with_station("#USM00072645".to_owned());
    /// assert_eq!(cfg.station(), Some("USM00072645"));
    ///
    /// let cfg = cfg.with_station(None);
    /// assert!(cfg.station().is_none());
    /// ```
    #[inline]
    pub fn with_station<S>(mut self, station: S) -> Self
    where
        Option<String>: From<S>,
    {
        let station: Option<String> = Option::from(station);
        self.station = station.map(|s| s.trim_start_matches('#').to_owned());
        self
    }

    /// Builder method for the pressure at or below which levels are not kept, 600 hPa by default.
    /// Only the lower troposphere is needed for the dataset.
    #[inline]
    pub fn with_top_pressure(mut self, top: HectoPascal) -> Self {
        self.top_pressure = top;
        self
    }

    /// The station filter, if any, without the leading `#`.
    #[inline]
    pub fn station(&self) -> Option<&str> {
        self.station.as_deref()
    }

    /// Levels with pressure at or below this value are dropped while reading.
    #[inline]
    pub fn top_pressure(&self) -> HectoPascal {
        self.top_pressure
    }
}
