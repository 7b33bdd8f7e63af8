//! Blackbody spectral radiance.

/// Planck constant (erg s)
pub(crate) const PLANCK: f64 = 6.62606957e-27;
/// Speed of light (cm/s)
pub(crate) const LIGHT_SPEED: f64 = 2.99792458e10;
/// Boltzmann constant (erg/K)
pub(crate) const BOLTZMANN: f64 = 1.3806488e-16;

/// Planck function per unit wavenumber.
///
/// For a wavenumber `w` in units such that `w * wn_factor` is in cm⁻¹, and a
/// temperature `t` in K, compute the blackbody radiance in erg/s/sr/cm:
///
/// B = 2 h c² ν̄³ / (exp(h c ν̄ / (k T)) - 1)
pub(crate) fn planck_wavenumber(w: f64, wn_factor: f64, t: f64) -> f64 {
    let nu = w * wn_factor;
    2. * PLANCK * LIGHT_SPEED.powi(2) * nu.powi(3)
        / f64::exp_m1(PLANCK * LIGHT_SPEED * nu / (BOLTZMANN * t))
}
