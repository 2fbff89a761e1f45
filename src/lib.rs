#![warn(missing_docs)]
//! Types and functions for building a precipitation type dataset by pairing upper air soundings
//! with the surface weather reported at the time they were launched.
//!
//! The pipeline has four steps:
//!
//! 1. Decode surface reports into `SurfaceObservation`s, reconciling the present weather codes of
//!    each report into a single `PrecipCategory`.
//! 2. Read soundings from a fixed width archive and reduce each one to the temperature and dew
//!    point at 925 and 850 hPa, a `ReducedSounding`.
//! 3. Join the two time series with a single forward sweep, choosing the nearest valid surface
//!    temperature and dew point for each sounding and labelling it with the reconciled
//!    precipitation type of all the observations close in time.
//! 4. Write the `JoinedRecord`s as a delimited table.
//!
//! # Examples
//!
//! ```rust
//! use sounding_surface_join::{
//!     join, read_sounding_archive, read_surface_csv, reduce_soundings, write_dataset,
//!     ArchiveConfig, JoinConfig, ReductionConfig,
//! };
//!
//! let surface = "\
//! DATE,REPORT_TYPE,TMP,DEW,AW1,MW1
//! 2023-01-14T23:30:00,FM-15,\"-0010,1\",\"-0030,1\",\"61,1\",
//! 2023-01-15T00:45:00,FM-15,\"-0015,1\",\"-0035,1\",\"71,1\",
//! ";
//!
//! let archive = "\
//! #USM00072645 2023 01 15 00 2305   2
//! 10  1520  92500B  762B  -15B  934    12   250    51
//! 10  3620  85000B 1451B  -40B  832    25   265    83
//! ";
//!
//! let obs = read_surface_csv(surface.as_bytes()).unwrap();
//! let snds = read_sounding_archive(archive.as_bytes(), &ArchiveConfig::default()).unwrap();
//! let snds = reduce_soundings(&snds, &ReductionConfig::default());
//!
//! let records = join(&snds, &obs, &JoinConfig::default());
//!
//! let mut buf = vec![];
//! write_dataset(&mut buf, &records).unwrap();
//! assert_eq!(
//!     String::from_utf8(buf).unwrap(),
//!     "date,sfc_t,sfc_td,t925,td925,t850,td850,precip_type\n\
//!      2023-01-15T00:00:00,-1.0,-3.0,-1.5,-2.7,-4.0,-6.5,1\n"
//! );
//! ```

//
// API
//
pub use crate::{
    config::{ArchiveConfig, JoinConfig, ReductionConfig},
    emit::{
        write_dataset, write_reduced_soundings, write_surface_observations, DATASET_HEADER,
        SOUNDING_HEADER, SURFACE_HEADER,
    },
    error::{DatasetError, Result},
    join::{join, join_with_summary, JoinSummary, JoinedRecord},
    precip_type::{reconcile_slots, reconcile_window, PrecipCategory},
    sounding::{
        parse_marker, read_sounding_archive, reduce_soundings, ReducedSounding, Sounding,
        SoundingLevel, LOWER_LEVEL, UPPER_LEVEL,
    },
    surface::{
        decode_slot, decode_temperature, read_surface_csv, CodeSystem, SurfaceObservation,
        SurfaceRecord, MISSING_THRESHOLD,
    },
};

pub mod met_formulas;

//
// Internal use only
//

// Modules
mod config;
mod emit;
mod error;
mod join;
mod precip_type;
mod sounding;
mod surface;
mod utility;
