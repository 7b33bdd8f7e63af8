//! Eclipse emergent spectrum computation
//!
//! Integrates optical depth and the Planck-weighted emergent intensity across
//! the radius grid of a planetary atmosphere, for each wavenumber and viewing
//! angle, and combines the intensities into a flux spectrum.
//!
//! The numerical work lives in [`rtm`]. With the `python` feature, the crate
//! is also a Python extension module exposing `compute_eclipse`.

pub mod error;
pub mod rtm;

#[cfg(feature = "python")]
mod python;

pub use error::EclipseError;
pub use rtm::{Atmosphere, EclipseOutputs, EclipseParameters, OutputFiles, Progress};
