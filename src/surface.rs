//! Decoding of hourly surface weather reports into observations usable for matching with
//! soundings.
//!
//! The raw reports are rows of a delimited file in the integrated surface data layout: a date, a
//! temperature and dew point each encoded as a comma joined group whose first token is in tenths
//! of a degree Celsius, a report type, and up to 4 automated and 6 manual present weather slots.
//! Each slot is a `code,quality` pair.

use crate::{
    error::{DatasetError, Result},
    precip_type::{reconcile_slots, PrecipCategory},
};
use chrono::NaiveDateTime;
use metfor::{Celsius, Quantity};
use optional::Optioned;
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, info};

mod codes;
pub use codes::CodeSystem;
use codes::BAD_QUALITY_FLAGS;

/// Format of the `DATE` column.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Decoded values with a magnitude at or above this are placeholders for missing data.
pub const MISSING_THRESHOLD: f64 = 500.0;

/// Report type of the daily summaries, which are not hourly observations.
const SUMMARY_OF_DAY: &str = "SOD";

/// Number of automated present weather slots in a report.
pub const NUM_AUTOMATED_SLOTS: usize = 4;
/// Number of manual present weather slots in a report.
pub const NUM_MANUAL_SLOTS: usize = 6;

/// A surface observation reduced to the values needed for the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceObservation {
    timestamp: NaiveDateTime,
    temperature: Optioned<Celsius>,
    dew_point: Optioned<Celsius>,
    precip_type: PrecipCategory,
}

impl SurfaceObservation {
    /// Create a new observation. Temperatures with a magnitude of 500 or more are placeholders and
    /// are stored as missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use metfor::Celsius;
    /// use optional::none;
    /// use sounding_surface_join::{PrecipCategory, SurfaceObservation};
    ///
    /// let time = NaiveDate::from_ymd(2023, 1, 15).and_hms(0, 0, 0);
    ///
    /// let ob = SurfaceObservation::new(time, Celsius(-1.0), Celsius(999.9), PrecipCategory::Rain);
    /// assert_eq!(ob.temperature().unwrap(), Celsius(-1.0));
    /// assert!(ob.dew_point().is_none());
    ///
    /// let ob = SurfaceObservation::new(time, none::<Celsius>(), Celsius(-3.0), PrecipCategory::Frozen);
    /// assert!(ob.temperature().is_none());
    /// ```
    pub fn new<T, U>(
        timestamp: NaiveDateTime,
        temperature: T,
        dew_point: U,
        precip_type: PrecipCategory,
    ) -> Self
    where
        Optioned<Celsius>: From<T> + From<U>,
    {
        SurfaceObservation {
            timestamp,
            temperature: screen_missing(Optioned::from(temperature)),
            dew_point: screen_missing(Optioned::from(dew_point)),
            precip_type,
        }
    }

    /// Valid time of the observation.
    #[inline]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Temperature, if it was reported.
    #[inline]
    pub fn temperature(&self) -> Optioned<Celsius> {
        self.temperature
    }

    /// Dew point, if it was reported.
    #[inline]
    pub fn dew_point(&self) -> Optioned<Celsius> {
        self.dew_point
    }

    /// Reconciled precipitation category of all the present weather slots.
    #[inline]
    pub fn precip_type(&self) -> PrecipCategory {
        self.precip_type
    }
}

fn screen_missing(val: Optioned<Celsius>) -> Optioned<Celsius> {
    val.into_option()
        .filter(|t| t.unpack().abs() < MISSING_THRESHOLD)
        .into()
}

/// One row of a surface observation file with the columns this crate uses, still encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceRecord {
    date: String,
    temperature: String,
    dew_point: String,
    report_type: String,
    automated: [String; NUM_AUTOMATED_SLOTS],
    manual: [String; NUM_MANUAL_SLOTS],
}

impl SurfaceRecord {
    /// Create a record with no present weather slots filled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sounding_surface_join::{PrecipCategory, SurfaceRecord};
    ///
    /// let ob = SurfaceRecord::new("2023-01-15T00:00:00", "-0010,1", "-0030,1", "FM-15")
    ///     .with_automated(0, "02,1")
    ///     .decode()
    ///     .unwrap()
    ///     .unwrap();
    ///
    /// assert_eq!(ob.precip_type(), PrecipCategory::Rain);
    /// ```
    pub fn new(date: &str, temperature: &str, dew_point: &str, report_type: &str) -> Self {
        SurfaceRecord {
            date: date.trim().to_owned(),
            temperature: temperature.trim().to_owned(),
            dew_point: dew_point.trim().to_owned(),
            report_type: report_type.trim().to_owned(),
            ..Self::default()
        }
    }

    /// Builder method to fill one of the automated present weather slots, `0..4`. Out of range
    /// slots are ignored.
    pub fn with_automated(mut self, slot: usize, value: &str) -> Self {
        if let Some(target) = self.automated.get_mut(slot) {
            *target = value.trim().to_owned();
        }
        self
    }

    /// Builder method to fill one of the manual present weather slots, `0..6`. Out of range slots
    /// are ignored.
    pub fn with_manual(mut self, slot: usize, value: &str) -> Self {
        if let Some(target) = self.manual.get_mut(slot) {
            *target = value.trim().to_owned();
        }
        self
    }

    /// Whether this is a daily summary rather than an hourly report.
    pub fn is_summary_of_day(&self) -> bool {
        self.report_type == SUMMARY_OF_DAY
    }

    /// Iterate over the categories of every filled present weather slot, automated first.
    pub fn slot_categories(&self) -> impl Iterator<Item = PrecipCategory> + '_ {
        let automated = self
            .automated
            .iter()
            .map(|slot| (CodeSystem::Automated, slot));
        let manual = self.manual.iter().map(|slot| (CodeSystem::Manual, slot));

        automated
            .chain(manual)
            .filter_map(|(system, slot)| decode_slot(system, slot))
    }

    /// Decode into an observation.
    ///
    /// Returns `Ok(None)` for records that are valid but not wanted in the dataset: daily summaries
    /// and reports without a usable precipitation type. Returns an error if the date, temperature,
    /// or dew point is blank or can't be parsed.
    pub fn decode(&self) -> Result<Option<SurfaceObservation>> {
        if self.is_summary_of_day() {
            return Ok(None);
        }

        let timestamp = NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|_| DatasetError::InvalidTimestamp(self.date.clone()))?;
        let temperature = decode_temperature("TMP", &self.temperature)?;
        let dew_point = decode_temperature("DEW", &self.dew_point)?;

        let precip_type = reconcile_slots(self.slot_categories());
        if !precip_type.is_known() {
            return Ok(None);
        }

        Ok(Some(SurfaceObservation::new(
            timestamp,
            temperature,
            dew_point,
            precip_type,
        )))
    }
}

/// Decode a single present weather slot.
///
/// Returns `None` for a blank slot or one without a quality flag, otherwise the category of the
/// code. A bad quality flag makes the slot `Unknown` whatever its code.
pub fn decode_slot(system: CodeSystem, slot: &str) -> Option<PrecipCategory> {
    let mut tokens = slot.split(',').map(str::trim);

    let code = tokens.next().filter(|code| !code.is_empty())?;
    let quality = match tokens.next() {
        Some(quality) => quality,
        None => {
            debug!(system = system.prefix(), slot, "present weather slot without quality flag");
            return None;
        }
    };

    if BAD_QUALITY_FLAGS.contains(&quality) {
        Some(PrecipCategory::Unknown)
    } else {
        Some(system.category(code))
    }
}

/// Decode a temperature group such as `-0012,1` into degrees Celsius. Placeholder values decode to
/// missing.
pub fn decode_temperature(field: &'static str, value: &str) -> Result<Optioned<Celsius>> {
    let first = value
        .split(',')
        .next()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(DatasetError::MissingField(field))?;

    let tenths: f64 = first
        .parse()
        .map_err(|_| DatasetError::malformed(field, value))?;

    Ok(screen_missing(optional::some(Celsius(tenths / 10.0))))
}

// Column layout of the surface observation files. Only the columns named here are read.
#[derive(Debug, Deserialize)]
struct RawSurfaceRow {
    #[serde(rename = "DATE", default)]
    date: String,
    #[serde(rename = "TMP", default)]
    tmp: String,
    #[serde(rename = "DEW", default)]
    dew: String,
    #[serde(rename = "REPORT_TYPE", default)]
    report_type: String,
    #[serde(rename = "AW1", default)]
    aw1: String,
    #[serde(rename = "AW2", default)]
    aw2: String,
    #[serde(rename = "AW3", default)]
    aw3: String,
    #[serde(rename = "AW4", default)]
    aw4: String,
    #[serde(rename = "MW1", default)]
    mw1: String,
    #[serde(rename = "MW2", default)]
    mw2: String,
    #[serde(rename = "MW3", default)]
    mw3: String,
    #[serde(rename = "MW4", default)]
    mw4: String,
    #[serde(rename = "MW5", default)]
    mw5: String,
    #[serde(rename = "MW6", default)]
    mw6: String,
}

impl From<RawSurfaceRow> for SurfaceRecord {
    fn from(row: RawSurfaceRow) -> Self {
        let automated = [row.aw1, row.aw2, row.aw3, row.aw4];
        let manual = [row.mw1, row.mw2, row.mw3, row.mw4, row.mw5, row.mw6];

        SurfaceRecord {
            date: row.date.trim().to_owned(),
            temperature: row.tmp.trim().to_owned(),
            dew_point: row.dew.trim().to_owned(),
            report_type: row.report_type.trim().to_owned(),
            automated: automated.map(|s| s.trim().to_owned()),
            manual: manual.map(|s| s.trim().to_owned()),
        }
    }
}

/// Read a delimited surface observation file with a header row.
///
/// Rows that can't be read or decoded are logged and skipped. The returned observations are
/// sorted by time, and only contain reports with a known precipitation type.
pub fn read_surface_csv<R: Read>(reader: R) -> Result<Vec<SurfaceObservation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut obs = Vec::new();
    let mut skipped = 0usize;
    let mut filtered = 0usize;

    for (row_num, row) in rdr.deserialize::<RawSurfaceRow>().enumerate() {
        let record: SurfaceRecord = match row {
            Ok(row) => row.into(),
            Err(err) => {
                debug!(row = row_num, %err, "skipping unreadable surface row");
                skipped += 1;
                continue;
            }
        };

        match record.decode() {
            Ok(Some(ob)) => obs.push(ob),
            Ok(None) => filtered += 1,
            Err(err) => {
                debug!(row = row_num, %err, "skipping undecodable surface row");
                skipped += 1;
            }
        }
    }

    obs.sort_by_key(|ob| ob.timestamp());

    info!(
        kept = obs.len(),
        filtered, skipped, "decoded surface observations"
    );

    Ok(obs)
}
