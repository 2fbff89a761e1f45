//! Small helpers shared by the decoders.

/// Round to the nearest tenth, halfway cases away from zero.
#[inline]
pub(crate) fn round_to_tenths(val: f64) -> f64 {
    (val * 10.0).round() / 10.0
}

/// Parse an integer field that may carry a trailing one character source or quality flag, e.g.
/// `20973B`. Surrounding white space is ignored.
///
/// Returns `None` for a blank field or one that still isn't an integer after removing the flag.
pub(crate) fn parse_flagged_int(field: &str) -> Option<i32> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }

    field.parse::<i32>().ok().or_else(|| {
        let mut chars = field.chars();
        chars.next_back();
        chars.as_str().trim_end().parse::<i32>().ok()
    })
}
