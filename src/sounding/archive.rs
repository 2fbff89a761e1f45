//! Reading soundings from a fixed width archive.
//!
//! An archive is a sequence of soundings. Each starts with a marker line, the station identifier
//! prefixed with `#` followed by white space separated year, month, day, nominal hour, and release
//! time (HHMM), e.g. `#USM00072645 2023 01 15 00 2305 ...`. Every data line up to the next marker
//! is one level of that sounding.

use super::{level::SoundingLevel, Sounding};
use crate::{
    config::ArchiveConfig,
    error::{DatasetError, Result},
};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::BufRead;
use tracing::{debug, info, warn};

const MISSING_HOUR: u32 = 99;
const MISSING_RELEASE_TIME: u32 = 9999;

/// Parse a marker line into the station identifier and the launch time.
///
/// When the nominal hour is missing (99) the hour of the release time is used instead.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use sounding_surface_join::parse_marker;
///
/// let (station, time) = parse_marker("#USM00072645 2023 01 15 99 2305   48").unwrap();
/// assert_eq!(station, "USM00072645");
/// assert_eq!(time, NaiveDate::from_ymd(2023, 1, 15).and_hms(23, 0, 0));
/// ```
pub fn parse_marker(line: &str) -> Result<(String, NaiveDateTime)> {
    let malformed = || DatasetError::MalformedMarker(line.to_owned());

    let mut tokens = line.split_whitespace();

    let station = tokens
        .next()
        .and_then(|token| token.strip_prefix('#'))
        .filter(|id| !id.is_empty())
        .ok_or_else(malformed)?;

    let mut next_num = || -> Result<u32> {
        tokens
            .next()
            .and_then(|token| token.parse::<u32>().ok())
            .ok_or_else(malformed)
    };

    let year = next_num()?;
    let month = next_num()?;
    let day = next_num()?;
    let nominal_hour = next_num()?;
    let release_time = next_num().unwrap_or(MISSING_RELEASE_TIME);

    let hour = if nominal_hour != MISSING_HOUR {
        nominal_hour
    } else if release_time != MISSING_RELEASE_TIME {
        release_time / 100
    } else {
        return Err(DatasetError::InvalidTimestamp(line.to_owned()));
    };

    let launch_time = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .ok_or_else(|| DatasetError::InvalidTimestamp(line.to_owned()))?;

    Ok((station.to_owned(), launch_time))
}

fn is_marker(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Read every sounding in an archive.
///
/// Soundings are returned in file order. Levels with missing pressure, or pressure at or above the
/// configured top, are not kept. A sounding whose marker can't be parsed is skipped entirely, as are
/// soundings from stations other than the configured one. A line that isn't valid UTF-8 is skipped,
/// and if it looks like a marker its whole sounding is skipped too. Only I/O errors are returned.
pub fn read_sounding_archive<R: BufRead>(
    mut reader: R,
    config: &ArchiveConfig,
) -> Result<Vec<Sounding>> {
    let top = config.top_pressure();

    let mut soundings: Vec<Sounding> = vec![];
    // None while skipping lines that don't belong to a wanted sounding.
    let mut current: Option<Sounding> = None;
    let mut bad_markers = 0usize;
    let mut bad_lines = 0usize;

    let mut buf: Vec<u8> = vec![];
    let mut line_num = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_num += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(|c: char| c == '\n' || c == '\r'),
            Err(err) => {
                if is_marker_bytes(&buf) {
                    soundings.extend(current.take());
                    warn!(line = line_num, %err, "skipping sounding with undecodable marker");
                    bad_markers += 1;
                } else {
                    debug!(line = line_num, %err, "skipping undecodable line");
                    bad_lines += 1;
                }
                continue;
            }
        };

        if is_marker(line) {
            soundings.extend(current.take());

            match parse_marker(line.trim()) {
                Ok((station, launch_time)) => {
                    if config.station().map_or(true, |wanted| wanted == station) {
                        current = Some(Sounding::new(launch_time).with_station(station));
                    } else {
                        debug!(line = line_num, %station, "skipping sounding from other station");
                    }
                }
                Err(err) => {
                    warn!(line = line_num, %err, "skipping sounding with bad marker");
                    bad_markers += 1;
                }
            }
        } else if line.trim().is_empty() {
            continue;
        } else if let Some(snd) = current.as_mut() {
            let level = SoundingLevel::parse(line);
            match level.pressure.into_option() {
                Some(p) if p > top => snd.push_level(level),
                _ => {}
            }
        }
    }
    soundings.extend(current.take());

    info!(
        soundings = soundings.len(),
        bad_markers, bad_lines, "read sounding archive"
    );

    Ok(soundings)
}

fn is_marker_bytes(line: &[u8]) -> bool {
    line.iter()
        .find(|b| !b.is_ascii_whitespace())
        .map_or(false, |&b| b == b'#')
}

#[cfg(test)]
mod test {
    use super::*;
    use metfor::{Celsius, HectoPascal};

    const ARCHIVE: &str = "\
#USM00072645 2023 01 15 00 2305   6 ncdc-gts ncdc-gts  445336  -880967
21 -9999 100400   213B   12B  880    15 -9999 -9999
10  1520  92500B  762B  -15B  934    12   250    51
10  3620  85000B 1451B  -40B  832    25   265    83
20  5000  60000B 4200B -180B  300   100   270   150
10  8030   5000 20973B -552B  208   116    36    51
31 -9999  -9999   218 -9999 -9999 -9999   315    60
#USM00072645 2023 01 15 12 1105   2 ncdc-gts ncdc-gts  445336  -880967
21 -9999  99800   213B   -5B  900    10 -9999 -9999
10  1520  92500B  762B  -35B  934    12   250    51
";

    #[test]
    fn test_parse_marker() {
        let (stn, time) = parse_marker("#USM00072645 2023 01 15 12 1105   2").unwrap();
        assert_eq!(stn, "USM00072645");
        assert_eq!(time, NaiveDate::from_ymd(2023, 1, 15).and_hms(12, 0, 0));

        // Nominal hour missing, fall back to the release time.
        let (_, time) = parse_marker("#USM00072645 1940 01 01 99 1500").unwrap();
        assert_eq!(time, NaiveDate::from_ymd(1940, 1, 1).and_hms(15, 0, 0));

        assert!(matches!(
            parse_marker("#USM00072645 1940 01 01 99 9999"),
            Err(DatasetError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            parse_marker("#USM00072645 1940 01 01 99"),
            Err(DatasetError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            parse_marker("#USM00072645 2023 02 30 00 2305"),
            Err(DatasetError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            parse_marker("#USM00072645 2023 xx 15 00"),
            Err(DatasetError::MalformedMarker(_))
        ));
        assert!(matches!(
            parse_marker("# 2023 01 15 00"),
            Err(DatasetError::MalformedMarker(_))
        ));
    }

    #[test]
    fn test_read_archive() {
        let snds = read_sounding_archive(ARCHIVE.as_bytes(), &ArchiveConfig::default()).unwrap();

        assert_eq!(snds.len(), 2);

        let first = &snds[0];
        assert_eq!(first.station(), Some("USM00072645"));
        assert_eq!(
            first.launch_time(),
            NaiveDate::from_ymd(2023, 1, 15).and_hms(0, 0, 0)
        );
        // 600 hPa and above plus the missing pressure are dropped.
        assert_eq!(first.levels().len(), 3);
        assert_eq!(first.levels()[0].pressure.unwrap(), HectoPascal(1004.0));
        assert_eq!(first.levels()[2].pressure.unwrap(), HectoPascal(850.0));

        assert_eq!(snds[1].levels().len(), 2);
    }

    #[test]
    fn test_read_archive_station_filter() {
        let text = format!(
            "{}#USM00072786 2023 01 15 00 2305   1\n10  1520  92500B  762B  -15B  934    12\n",
            ARCHIVE
        );

        let all = read_sounding_archive(text.as_bytes(), &ArchiveConfig::default()).unwrap();
        assert_eq!(all.len(), 3);

        let cfg = ArchiveConfig::new().with_station("USM00072786".to_owned());
        let one = read_sounding_archive(text.as_bytes(), &cfg).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].station(), Some("USM00072786"));
        assert_eq!(one[0].levels().len(), 1);
    }

    #[test]
    fn test_read_archive_skips_undecodable_level() {
        let mut bytes: Vec<u8> = vec![];
        bytes.extend_from_slice(b"#USM00072645 2023 01 15 00 2305   3\n");
        bytes.extend_from_slice(b"10  1520  92500B  762B  -15B  934    12   250    51\n");
        bytes.extend_from_slice(b"10  9999  70000B 3000B \xff\xfeB  500    30\n");
        bytes.extend_from_slice(b"10  3620  85000B 1451B  -40B  832    25   265    83\n");
        bytes.extend_from_slice(b"#USM00072645 2023 01 15 12 1105   1\n");
        bytes.extend_from_slice(b"10  1520  92500B  762B  -35B  934    12   250    51\n");

        let snds = read_sounding_archive(&bytes[..], &ArchiveConfig::default()).unwrap();

        assert_eq!(snds.len(), 2);
        assert_eq!(snds[0].levels().len(), 2);
        assert_eq!(snds[0].levels()[1].pressure.unwrap(), HectoPascal(850.0));
        assert_eq!(
            snds[1].launch_time(),
            NaiveDate::from_ymd(2023, 1, 15).and_hms(12, 0, 0)
        );
        assert_eq!(snds[1].levels().len(), 1);
    }

    #[test]
    fn test_read_archive_undecodable_marker_skips_sounding() {
        let mut bytes: Vec<u8> = vec![];
        bytes.extend_from_slice(b"#USM00072645 2023 01 15 00 2305   1\n");
        bytes.extend_from_slice(b"10  1520  92500B  762B  -15B  934    12   250    51\n");
        bytes.extend_from_slice(b"#USM000\xff2645 2023 01 15 12 1105   1\n");
        bytes.extend_from_slice(b"10  1520  92500B  762B  -35B  934    12   250    51\n");
        bytes.extend_from_slice(b"#USM00072645 2023 01 16 00 2305   1\r\n");
        bytes.extend_from_slice(b"10  1520  92500B  762B  -25B  934    12   250    51\r\n");

        let snds = read_sounding_archive(&bytes[..], &ArchiveConfig::default()).unwrap();

        // The levels after the bad marker don't leak into the sounding before it.
        assert_eq!(snds.len(), 2);
        assert_eq!(snds[0].levels().len(), 1);
        assert_eq!(
            snds[1].launch_time(),
            NaiveDate::from_ymd(2023, 1, 16).and_hms(0, 0, 0)
        );
        assert_eq!(snds[1].levels()[0].temperature.unwrap(), Celsius(-2.5));
    }

    #[test]
    fn test_read_archive_bad_marker_skips_sounding() {
        let text = "\
10  1520  92500B  762B  -15B  934    12
#USM00072645 2023 13 15 00 2305   1
10  1520  92500B  762B  -15B  934    12
#USM00072645 2023 01 16 00 2305   1
10  1520  92500B  762B  -15B  934    12
";
        let snds = read_sounding_archive(text.as_bytes(), &ArchiveConfig::default()).unwrap();

        assert_eq!(snds.len(), 1);
        assert_eq!(
            snds[0].launch_time(),
            NaiveDate::from_ymd(2023, 1, 16).and_hms(0, 0, 0)
        );
        assert_eq!(snds[0].levels().len(), 1);
    }
}
