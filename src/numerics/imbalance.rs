// src/numerics/imbalance.rs
// Momentum-imbalance observables between an associated particle and the
// trigger.

/// Projection of the associated momentum on the trigger direction,
/// `x_E = -(pT_assoc / pT_trig) cos Δφ`.
pub fn x_e(pt_assoc: f64, pt_trig: f64, delta_phi: f64) -> f64 {
    -(pt_assoc / pt_trig) * delta_phi.cos()
}

/// Plain momentum ratio, `z_T = pT_assoc / pT_trig`.
pub fn z_t(pt_assoc: f64, pt_trig: f64) -> f64 {
    pt_assoc / pt_trig
}

/// Hump-backed plateau variable `ln(1/x)`; defined only for positive `x`.
pub fn hump_backed_plateau(x: f64) -> Option<f64> {
    (x > 0.0).then(|| (1.0 / x).ln())
}
