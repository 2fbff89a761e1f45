//! This module contains the coarse precipitation type categories used as the label in the aligned
//! dataset, and the rules for reconciling several category reports into one.
//!
//! Surface stations report present weather with detailed codes (see the `surface` module for the
//! lookup tables). Those are collapsed into three classes: liquid, frozen, and a mix of the two.
//! When several reports disagree the disagreement itself is taken as evidence of a transition
//! between liquid and frozen precipitation, so the result is `Mixed`.

use std::{collections::BTreeSet, fmt::Display};
use strum_macros::EnumIter;

/// Precipitation category. The discriminants are the labels written to the output dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Hash, PartialOrd, Ord)]
#[repr(i8)]
pub enum PrecipCategory {
    /// A bad quality read or a code that doesn't describe liquid or frozen precipitation.
    Unknown = -1,
    /// Rain or drizzle, freezing or not.
    Rain = 0,
    /// Rain and snow together, or a transition between them.
    Mixed = 1,
    /// Snow, ice pellets, snow grains, ice crystals.
    Frozen = 2,
}

impl PrecipCategory {
    /// The numeric label used in output files.
    #[inline]
    pub fn code(self) -> i8 {
        self as i8
    }

    /// Whether this is one of the three labels allowed in the output dataset.
    #[inline]
    pub fn is_known(self) -> bool {
        self != PrecipCategory::Unknown
    }
}

impl Display for PrecipCategory {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "{}", self.code())
    }
}

/// Reconcile the categories reported by the present weather slots of a single surface report.
///
/// Only the set of distinct categories matters:
///  - no reports at all is `Unknown`,
///  - a single distinct category is returned as is,
///  - exactly two distinct categories where one is `Unknown` returns the other one, the bad read is
///    treated as uninformative,
///  - anything else is `Mixed`.
pub fn reconcile_slots<I>(categories: I) -> PrecipCategory
where
    I: IntoIterator<Item = PrecipCategory>,
{
    let distinct: BTreeSet<PrecipCategory> = categories.into_iter().collect();

    match distinct.len() {
        0 => PrecipCategory::Unknown,
        1 => single(&distinct),
        2 if distinct.contains(&PrecipCategory::Unknown) => distinct
            .iter()
            .cloned()
            .find(|&cat| cat.is_known())
            .unwrap_or(PrecipCategory::Unknown),
        _ => PrecipCategory::Mixed,
    }
}

/// Reconcile the categories of all the surface observations matched to one sounding.
///
/// Any disagreement means the sounding was taken during a transition period, so it is `Mixed`.
/// An empty window has no category and returns `Unknown`.
pub fn reconcile_window<I>(categories: I) -> PrecipCategory
where
    I: IntoIterator<Item = PrecipCategory>,
{
    let distinct: BTreeSet<PrecipCategory> = categories.into_iter().collect();

    match distinct.len() {
        0 => PrecipCategory::Unknown,
        1 => single(&distinct),
        _ => PrecipCategory::Mixed,
    }
}

fn single(distinct: &BTreeSet<PrecipCategory>) -> PrecipCategory {
    distinct
        .iter()
        .next()
        .cloned()
        .unwrap_or(PrecipCategory::Unknown)
}
