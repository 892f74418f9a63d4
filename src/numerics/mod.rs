// src/numerics/mod.rs
// Top-level numerics module: azimuthal bookkeeping and momentum-imbalance
// observables shared by the correlation code.

pub mod angles;
pub mod imbalance;

pub use angles::{azimuthal_separation, normalize_phi, wrap_delta_phi, DELTA_PHI_MAX, DELTA_PHI_MIN};
pub use imbalance::{hump_backed_plateau, x_e, z_t};
