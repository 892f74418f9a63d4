// src/numerics/angles.rs
// Azimuthal angle helpers. Correlation histograms use the (-π/2, 3π/2)
// convention so that the near side (Δφ ≈ 0) and the away side (Δφ ≈ π)
// both sit away from the range edges.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Lower edge of the Δφ range.
pub const DELTA_PHI_MIN: f64 = -FRAC_PI_2;

/// Upper edge of the Δφ range.
pub const DELTA_PHI_MAX: f64 = 3.0 * FRAC_PI_2;

/// Map an azimuth into `[0, 2π)`.
pub fn normalize_phi(phi: f64) -> f64 {
    let wrapped = phi.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Shift a raw azimuthal difference by at most one turn into
/// `[-π/2, 3π/2)`.
///
/// Inputs are expected in `(-2π, 2π)`, which is what the difference of two
/// normalised azimuths produces.
pub fn wrap_delta_phi(delta_phi: f64) -> f64 {
    if delta_phi < DELTA_PHI_MIN {
        delta_phi + TAU
    } else if delta_phi >= DELTA_PHI_MAX {
        delta_phi - TAU
    } else {
        delta_phi
    }
}

/// Smallest opening angle between two azimuths, in `[0, π]`.
pub fn azimuthal_separation(phi_a: f64, phi_b: f64) -> f64 {
    let d = (phi_a - phi_b).rem_euclid(TAU);
    if d > PI {
        TAU - d
    } else {
        d
    }
}
