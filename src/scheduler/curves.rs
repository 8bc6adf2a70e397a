//! Response curves combined into utilities.
//!
//! All curves are total over finite inputs and return finite values.

/// Smoothstep ramp from 0 at `low` to 1 at `high`.
///
/// Inputs at or below `low` yield exactly 0, which lets a ramp act as a
/// hard gate inside a [`geometric_mean`].
pub fn smooth_ramp(x: f64, low: f64, high: f64) -> f64 {
    if x <= low {
        return 0.0;
    }
    if x >= high {
        return 1.0;
    }
    let t = (x - low) / (high - low);
    t * t * (3.0 - 2.0 * t)
}

/// Logistic curve centred at 0.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `half / (half + n)`: 1 for an empty population, 0.5 at `half`.
pub fn diminishing_returns(n: u32, half: f64) -> f64 {
    half / (half + n as f64)
}

/// Geometric mean of factors in [0, 1]; 0 if any factor is not positive.
pub fn geometric_mean(factors: &[f64]) -> f64 {
    if factors.is_empty() || factors.iter().any(|&f| f.is_nan() || f <= 0.0) {
        return 0.0;
    }
    let log_sum: f64 = factors.iter().map(|f| f.ln()).sum();
    (log_sum / factors.len() as f64).exp()
}

/// Inverse of the income ratio, clamped at `floor` so the result stays
/// bounded when income collapses.
pub fn scarcity_multiplier(income_ratio: f64, floor: f64) -> f64 {
    let ratio = if income_ratio.is_finite() {
        income_ratio
    } else {
        0.0
    };
    1.0 / ratio.max(floor)
}

/// Clamps a utility into `[0, max]`, mapping NaN to 0.
pub fn bounded(utility: f64, max: f64) -> f64 {
    if utility.is_nan() {
        0.0
    } else {
        utility.clamp(0.0, max)
    }
}
