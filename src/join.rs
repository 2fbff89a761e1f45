//! Matching reduced soundings with surface observations.
//!
//! Both inputs are sorted by time, so a single forward sweep over the surface observations serves
//! every sounding. A cursor into the surface observations only ever moves forward. For each
//! sounding the scan starts at the cursor and collects every observation within the match radius
//! into a window, then stops at the first observation that is at least the stop radius in the
//! future. Observations further away than the match radius but closer than the stop radius are
//! neither collected nor a reason to stop.
//!
//! From the window the nearest valid temperature and the nearest valid dew point are chosen
//! independently, so they may come from different observations. The precipitation type is
//! reconciled over the whole window.

use crate::{
    config::JoinConfig,
    precip_type::{reconcile_window, PrecipCategory},
    sounding::ReducedSounding,
    surface::SurfaceObservation,
};
use chrono::{Duration, NaiveDateTime, Timelike};
use itertools::Itertools;
use metfor::Celsius;
use tracing::{debug, info};

/// A sounding paired with the surface conditions at the time it was launched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JoinedRecord {
    /// Launch time truncated to the hour.
    pub timestamp: NaiveDateTime,
    /// Surface temperature
    pub sfc_temperature: Celsius,
    /// Surface dew point
    pub sfc_dew_point: Celsius,
    /// Temperature at 925 hPa
    pub t925: Celsius,
    /// Dew point at 925 hPa
    pub td925: Celsius,
    /// Temperature at 850 hPa
    pub t850: Celsius,
    /// Dew point at 850 hPa
    pub td850: Celsius,
    /// Rain, mixed, or frozen, never `Unknown`.
    pub precip_type: PrecipCategory,
}

/// Counts of what happened to each sounding during a join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinSummary {
    /// Soundings offered to the join.
    pub soundings: usize,
    /// Soundings that produced a record.
    pub matched: usize,
    /// Soundings with no surface observation in range.
    pub no_window: usize,
    /// Soundings with observations in range, but none with a valid temperature or dew point.
    pub missing_values: usize,
    /// Soundings whose observations only had unknown precipitation types.
    pub unknown_precip: usize,
}

/// Join soundings with surface observations, one record per sounding with a usable match.
///
/// Both slices must be sorted by time.
pub fn join(
    soundings: &[ReducedSounding],
    surface_obs: &[SurfaceObservation],
    config: &JoinConfig,
) -> Vec<JoinedRecord> {
    join_with_summary(soundings, surface_obs, config).0
}

/// Same as `join`, but also reports how many soundings were dropped and why.
pub fn join_with_summary(
    soundings: &[ReducedSounding],
    surface_obs: &[SurfaceObservation],
    config: &JoinConfig,
) -> (Vec<JoinedRecord>, JoinSummary) {
    debug_assert!(soundings
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.launch_time <= b.launch_time));
    debug_assert!(surface_obs
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.timestamp() <= b.timestamp()));

    let mut records = Vec::with_capacity(soundings.len());
    let mut summary = JoinSummary {
        soundings: soundings.len(),
        ..JoinSummary::default()
    };

    let mut start_j = 0;
    let mut window: Vec<(Duration, &SurfaceObservation)> = vec![];

    for snd in soundings {
        window.clear();
        start_j = fill_window(snd.launch_time, surface_obs, start_j, config, &mut window);

        match resolve_window(snd, &window) {
            Ok(record) => {
                summary.matched += 1;
                records.push(record);
            }
            Err(reason) => {
                debug!(launch_time = %snd.launch_time, ?reason, "no surface match for sounding");
                match reason {
                    DropReason::NoWindow => summary.no_window += 1,
                    DropReason::MissingValues => summary.missing_values += 1,
                    DropReason::UnknownPrecip => summary.unknown_precip += 1,
                }
            }
        }
    }

    info!(
        soundings = summary.soundings,
        matched = summary.matched,
        no_window = summary.no_window,
        missing_values = summary.missing_values,
        unknown_precip = summary.unknown_precip,
        "joined soundings with surface observations"
    );

    (records, summary)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DropReason {
    NoWindow,
    MissingValues,
    UnknownPrecip,
}

// Collect the observations within the match radius of `time` into `window`, starting at
// `start_j`. Returns where the scan for the next sounding should start.
fn fill_window<'a>(
    time: NaiveDateTime,
    surface_obs: &'a [SurfaceObservation],
    mut start_j: usize,
    config: &JoinConfig,
    window: &mut Vec<(Duration, &'a SurfaceObservation)>,
) -> usize {
    for (j, ob) in surface_obs.iter().enumerate().skip(start_j) {
        let ob_time = ob.timestamp();
        let delta = abs_diff(time, ob_time);

        if delta <= config.match_radius() {
            window.push((delta, ob));
            start_j = j;
        }

        if delta >= config.stop_radius() && ob_time > time {
            start_j = j;
            break;
        }
    }

    start_j
}

fn resolve_window(
    snd: &ReducedSounding,
    window: &[(Duration, &SurfaceObservation)],
) -> Result<JoinedRecord, DropReason> {
    if window.is_empty() {
        return Err(DropReason::NoWindow);
    }

    let sfc_temperature = nearest_valid(window, |ob| ob.temperature().into_option());
    let sfc_dew_point = nearest_valid(window, |ob| ob.dew_point().into_option());

    let (sfc_temperature, sfc_dew_point) = match (sfc_temperature, sfc_dew_point) {
        (Some(t), Some(td)) => (t, td),
        _ => return Err(DropReason::MissingValues),
    };

    let precip_type = reconcile_window(window.iter().map(|(_, ob)| ob.precip_type()));
    if !precip_type.is_known() {
        return Err(DropReason::UnknownPrecip);
    }

    Ok(JoinedRecord {
        timestamp: truncate_to_hour(snd.launch_time),
        sfc_temperature,
        sfc_dew_point,
        t925: snd.t925,
        td925: snd.td925,
        t850: snd.t850,
        td850: snd.td850,
        precip_type,
    })
}

// The value from the observation closest in time that has one. Only a strictly closer observation
// replaces the current choice, so ties go to the one scanned first.
fn nearest_valid<F>(window: &[(Duration, &SurfaceObservation)], value: F) -> Option<Celsius>
where
    F: Fn(&SurfaceObservation) -> Option<Celsius>,
{
    let mut best: Option<(Duration, Celsius)> = None;

    for &(delta, ob) in window {
        if let Some(val) = value(ob) {
            match best {
                Some((best_delta, _)) if delta >= best_delta => {}
                _ => best = Some((delta, val)),
            }
        }
    }

    best.map(|(_, val)| val)
}

fn abs_diff(a: NaiveDateTime, b: NaiveDateTime) -> Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

fn truncate_to_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.date().and_hms_opt(time.hour(), 0, 0).unwrap_or(time)
}
