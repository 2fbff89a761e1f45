//! Meteorological formulas that are not available from `metfor` in the form this dataset was
//! built with.
use metfor::{Celsius, Quantity};

const ES0: f64 = 611.2; // Pa, saturation vapor pressure at 0C
const CONST_A: f64 = 2.53e11; // Pa
const CONST_B: f64 = 5.42e3; // K

/// Calculate the dew point from temperature and relative humidity (in percent, 0-100).
///
/// Saturation vapor pressure uses the Magnus form with coefficients over water above freezing and
/// over ice at or below freezing. The dew point is then found from the vapor pressure with the
/// Clausius-Clapeyron relation assuming a constant latent heat, which makes it less accurate far
/// from standard surface pressure.
///
/// Returns `None` if the relative humidity is not positive.
pub fn dew_point_from_rh(temperature: Celsius, rh: f64) -> Option<Celsius> {
    if rh.is_nan() || rh <= 0.0 {
        return None;
    }

    let t = temperature.unpack();
    let (k1, k2) = if t > 0.0 {
        (17.62, 243.12)
    } else {
        (22.46, 272.62)
    };

    let es = (ES0.ln() + k1 * t / (k2 + t)).exp();
    let e = rh / 100.0 * es;

    let td = -CONST_B / (e / CONST_A).ln() - 273.15;

    if td.is_finite() {
        Some(Celsius(td))
    } else {
        None
    }
}
