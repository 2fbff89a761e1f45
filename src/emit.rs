//! Writing the aligned dataset, and the intermediate tables, as delimited text.
//!
//! Temperatures are written with the shortest representation that parses back to the same value,
//! always with a decimal point, e.g. `-1.0` and `0.7`.

use crate::{
    error::Result,
    join::JoinedRecord,
    sounding::ReducedSounding,
    surface::{SurfaceObservation, DATE_FORMAT},
};
use chrono::NaiveDateTime;
use metfor::{Celsius, Quantity};
use optional::Optioned;
use std::io::Write;

/// Column names of the aligned dataset.
pub const DATASET_HEADER: [&str; 8] = [
    "date",
    "sfc_t",
    "sfc_td",
    "t925",
    "td925",
    "t850",
    "td850",
    "precip_type",
];

/// Column names of the reduced soundings table.
pub const SOUNDING_HEADER: [&str; 5] = ["date", "t925", "td925", "t850", "td850"];

/// Column names of the filtered surface observations table.
pub const SURFACE_HEADER: [&str; 4] = ["date", "tmp", "dew", "precip_type"];

const HOUR_FORMAT: &str = "%Y-%m-%dT%H:00:00";

/// Write the aligned dataset with a header row.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use metfor::Celsius;
/// use sounding_surface_join::{write_dataset, JoinedRecord, PrecipCategory};
///
/// let rec = JoinedRecord {
///     timestamp: NaiveDate::from_ymd(2023, 1, 15).and_hms(0, 0, 0),
///     sfc_temperature: Celsius(-1.0),
///     sfc_dew_point: Celsius(-3.0),
///     t925: Celsius(-2.5),
///     td925: Celsius(-4.0),
///     t850: Celsius(-6.1),
///     td850: Celsius(-10.0),
///     precip_type: PrecipCategory::Mixed,
/// };
///
/// let mut buf = vec![];
/// write_dataset(&mut buf, &[rec]).unwrap();
///
/// assert_eq!(
///     String::from_utf8(buf).unwrap(),
///     "date,sfc_t,sfc_td,t925,td925,t850,td850,precip_type\n\
///      2023-01-15T00:00:00,-1.0,-3.0,-2.5,-4.0,-6.1,-10.0,1\n"
/// );
/// ```
pub fn write_dataset<W: Write>(writer: W, records: &[JoinedRecord]) -> Result<()> {
    let mut wtr = csv_writer(writer);
    wtr.write_record(&DATASET_HEADER)?;

    for rec in records {
        wtr.write_record(&[
            format_hour(rec.timestamp),
            format_celsius(rec.sfc_temperature),
            format_celsius(rec.sfc_dew_point),
            format_celsius(rec.t925),
            format_celsius(rec.td925),
            format_celsius(rec.t850),
            format_celsius(rec.td850),
            rec.precip_type.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write reduced soundings with a header row.
pub fn write_reduced_soundings<W: Write>(writer: W, soundings: &[ReducedSounding]) -> Result<()> {
    let mut wtr = csv_writer(writer);
    wtr.write_record(&SOUNDING_HEADER)?;

    for snd in soundings {
        wtr.write_record(&[
            format_hour(snd.launch_time),
            format_celsius(snd.t925),
            format_celsius(snd.td925),
            format_celsius(snd.t850),
            format_celsius(snd.td850),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write decoded surface observations with a header row. Missing values are left blank.
pub fn write_surface_observations<W: Write>(
    writer: W,
    observations: &[SurfaceObservation],
) -> Result<()> {
    let mut wtr = csv_writer(writer);
    wtr.write_record(&SURFACE_HEADER)?;

    for ob in observations {
        wtr.write_record(&[
            ob.timestamp().format(DATE_FORMAT).to_string(),
            format_optioned(ob.temperature()),
            format_optioned(ob.dew_point()),
            ob.precip_type().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

fn format_hour(time: NaiveDateTime) -> String {
    time.format(HOUR_FORMAT).to_string()
}

// Debug formatting of f64 is the shortest round trip representation and keeps the ".0".
fn format_celsius(val: Celsius) -> String {
    format!("{:?}", val.unpack())
}

fn format_optioned(val: Optioned<Celsius>) -> String {
    val.into_option().map(format_celsius).unwrap_or_default()
}
