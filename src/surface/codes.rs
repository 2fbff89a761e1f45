//! Lookup tables from present weather codes to precipitation categories.
//!
//! Automated stations report with the codes from WMO table 4680, manual observers with WMO table
//! 4677. The code spaces overlap but mean different things, so each has its own table. Codes that
//! don't describe liquid or frozen precipitation (fog, haze, thunder without precipitation, hail,
//! ...) map to `Unknown`.
//!
//! Two codes outside the precipitation ranges are mapped as well: automated `02` is rain and
//! manual `18` is snow. The neighbouring low codes (clouds, haze, smoke, thunder without
//! precipitation) stay `Unknown`.

use crate::precip_type::PrecipCategory::{self, *};

/// Quality flags that mark a present weather report as unusable.
pub(crate) const BAD_QUALITY_FLAGS: &[&str] = &["3", "7"];

/// Which reporting system a present weather slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSystem {
    /// Automated present weather, the `AW` columns.
    Automated,
    /// Manual present weather, the `MW` columns.
    Manual,
}

impl CodeSystem {
    /// Map a two digit present weather code to a category.
    pub fn category(self, code: &str) -> PrecipCategory {
        match parse_code(code) {
            Some(code) => match self {
                CodeSystem::Automated => automated_category(code),
                CodeSystem::Manual => manual_category(code),
            },
            None => Unknown,
        }
    }

    /// Column name prefix in the surface observation files.
    pub fn prefix(self) -> &'static str {
        match self {
            CodeSystem::Automated => "AW",
            CodeSystem::Manual => "MW",
        }
    }
}

// Codes are always written with two digits, "2" is not the same as "02".
fn parse_code(code: &str) -> Option<u8> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit()) {
        code.parse().ok()
    } else {
        None
    }
}

fn automated_category(code: u8) -> PrecipCategory {
    match code {
        2 | 23 | 25 | 43 | 44 | 50..=66 | 81..=84 => Rain,
        67 | 68 => Mixed,
        24 | 45 | 46 | 70..=78 | 85..=87 => Frozen,
        _ => Unknown,
    }
}

fn manual_category(code: u8) -> PrecipCategory {
    match code {
        20 | 21 | 23 | 25 | 50..=67 | 80..=82 => Rain,
        26 | 68 | 69 | 83 | 84 => Mixed,
        18 | 22 | 70..=79 | 85 | 86 => Frozen,
        _ => Unknown,
    }
}
