use crate::{met_formulas::dew_point_from_rh, utility::parse_flagged_int};
use metfor::{Celsius, CelsiusDiff, HectoPascal, Meters, MetersPSec, Quantity};
use optional::Optioned;
use std::ops::Range;

/// One level of a sounding as decoded from a fixed width data line.
#[derive(Clone, Default, Copy, Debug, PartialEq)]
pub struct SoundingLevel {
    /// Seconds since launch
    pub elapsed: Optioned<i32>,
    /// Pressure in hPa
    pub pressure: Optioned<HectoPascal>,
    /// Geopotential height in meters
    pub height: Optioned<Meters>,
    /// Temperature in C
    pub temperature: Optioned<Celsius>,
    /// Relative humidity in percent
    pub relative_humidity: Optioned<f64>,
    /// Dew point depression in C
    pub dew_point_depression: Optioned<CelsiusDiff>,
    /// Wind direction in degrees
    pub wind_direction: Optioned<f64>,
    /// Wind speed in m/s
    pub wind_speed: Optioned<MetersPSec>,
}

// Column layout of a data line. Values are integers, some followed by a one character flag.
const ELAPSED: Range<usize> = 2..8;
const PRESSURE: Range<usize> = 8..16;
const HEIGHT: Range<usize> = 16..22;
const TEMPERATURE: Range<usize> = 22..28;
const REL_HUMIDITY: Range<usize> = 28..33;
const DEW_POINT_DEPRESSION: Range<usize> = 33..39;
const WIND_DIRECTION: Range<usize> = 39..45;
const WIND_SPEED: Range<usize> = 45..51;

// Missing and removed-by-quality-control markers.
const MISSING: i32 = -9999;
const REMOVED: i32 = -8888;

impl SoundingLevel {
    /// Decode a fixed width data line.
    ///
    /// Every field is decoded independently. A field that is blank, missing, or not an integer even
    /// after removing its flag is left as `none` without affecting the rest of the level.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, CelsiusDiff, HectoPascal, Meters};
    /// use sounding_surface_join::SoundingLevel;
    ///
    /// let lvl = SoundingLevel::parse("10  1520  92500B  762B  -15B  934    12   250    51");
    /// assert_eq!(lvl.pressure.unwrap(), HectoPascal(925.0));
    /// assert_eq!(lvl.height.unwrap(), Meters(762.0));
    /// assert_eq!(lvl.temperature.unwrap(), Celsius(-1.5));
    /// assert_eq!(lvl.relative_humidity.unwrap(), 93.4);
    /// assert_eq!(lvl.dew_point_depression.unwrap(), CelsiusDiff(1.2));
    /// ```
    pub fn parse(line: &str) -> Self {
        let int = |range: Range<usize>| -> Optioned<i32> {
            column(line, range)
                .and_then(parse_flagged_int)
                .filter(|&val| val != MISSING && val != REMOVED)
                .into()
        };
        let scaled = |range: Range<usize>, divisor: f64| -> Optioned<f64> {
            int(range).map_t(|val| f64::from(val) / divisor)
        };

        SoundingLevel {
            elapsed: int(ELAPSED),
            pressure: scaled(PRESSURE, 100.0).map_t(HectoPascal),
            height: scaled(HEIGHT, 1.0).map_t(Meters),
            temperature: scaled(TEMPERATURE, 10.0).map_t(Celsius),
            relative_humidity: scaled(REL_HUMIDITY, 10.0),
            dew_point_depression: scaled(DEW_POINT_DEPRESSION, 10.0).map_t(CelsiusDiff),
            wind_direction: scaled(WIND_DIRECTION, 1.0),
            wind_speed: scaled(WIND_SPEED, 10.0).map_t(MetersPSec),
        }
    }

    /// The dew point at this level.
    ///
    /// Uses the reported dew point depression if available, and otherwise calculates it from the
    /// relative humidity. Requires the temperature in both cases.
    pub fn dew_point(&self) -> Option<Celsius> {
        let t = self.temperature.into_option()?;

        if let Some(dpd) = self.dew_point_depression.into_option() {
            Some(Celsius(t.unpack() - dpd.unpack()))
        } else {
            self.relative_humidity
                .into_option()
                .and_then(|rh| dew_point_from_rh(t, rh))
        }
    }
}

// A line may be shorter than the full layout when trailing fields are blank.
fn column(line: &str, range: Range<usize>) -> Option<&str> {
    let end = range.end.min(line.len());
    line.get(range.start..end)
}
