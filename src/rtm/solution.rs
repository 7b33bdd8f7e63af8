//! Pluggable ray solutions.
//!
//! A ray solution pairs an optical-depth calculation with the matching
//! emergent-intensity calculation for one viewing geometry.

use std::str::FromStr;

use crate::error::EclipseError;

use super::eclipse::EclipsePath;

/// Per-angle inputs to [`RaySolution::intensity`].
#[derive(Debug, Clone, Copy)]
pub struct RayContext<'a> {
    /// Temperature profile in K, from the bottom of the atmosphere to the top.
    pub temperature: &'a [f64],
    /// Factor converting wavenumbers to cm⁻¹.
    pub wn_factor: f64,
    /// Viewing angle in degrees.
    pub angle: f64,
}

/// The two calculations that make up a viewing geometry.
pub trait RaySolution: std::fmt::Debug + Sync {
    /// Name used to select this solution.
    fn name(&self) -> &'static str;

    /// Optical depth from `height` up to the top of the atmosphere.
    ///
    /// `radius` is the radius grid (bottom to top) and `extinction` the
    /// extinction coefficient at each radius for one wavenumber. The result is
    /// in units of the radius grid; the caller converts it.
    fn optical_depth(
        &self,
        radius: &[f64],
        extinction: &[f64],
        height: f64,
    ) -> Result<f64, EclipseError>;

    /// Emergent intensity for one wavenumber.
    ///
    /// `tau` is the optical depth at each layer from the top down, and `last`
    /// the deepest layer that takes part in the integral.
    fn intensity(
        &self,
        tau: &[f64],
        wavenumber: f64,
        last: usize,
        toomuch: f64,
        ray: &RayContext<'_>,
    ) -> Result<f64, EclipseError>;
}

/// Viewing geometries that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Geometry {
    /// Rays travel radially out of each layer toward the observer.
    #[default]
    Eclipse,
}

impl Geometry {
    /// The ray solution implementing this geometry.
    pub fn solution(self) -> &'static dyn RaySolution {
        match self {
            Geometry::Eclipse => &EclipsePath,
        }
    }
}

impl FromStr for Geometry {
    type Err = EclipseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eclipse" => Ok(Geometry::Eclipse),
            other => Err(EclipseError::UnknownGeometry(other.to_owned())),
        }
    }
}
