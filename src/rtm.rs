//! Emergent intensity and flux of a planetary atmosphere in eclipse geometry

mod core;
mod eclipse;
mod interp;
mod output;
mod planck;
mod simpson;
mod solution;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use self::core::{emergent_intens, flux};
use crate::error::EclipseError;
use log::info;
use ndarray::{Array1, Array2, ArrayView2};
use smallvec::SmallVec;

pub use self::core::OpticalDepth;
pub use self::eclipse::EclipsePath;
pub use self::output::{flux_table, intensity_table, OutputFiles};
pub use self::solution::{Geometry, RayContext, RaySolution};

/// Default maximum optical depth.
pub const DEFAULT_TOOMUCH: f64 = 20.0;

/// Input parameters for the RTM that are constant.
#[derive(Debug, Clone)]
pub struct EclipseParameters {
    /// Incidence angles in degrees, strictly increasing within [0, 90).
    angles: SmallVec<[f64; 8]>,
    /// Optical depth past which deeper layers are ignored.
    toomuch: f64,
    /// Radius units in cm, to convert optical depths.
    radius_factor: f64,
    /// Factor converting wavenumbers to cm⁻¹.
    wavenumber_factor: f64,
    /// Ray solution for the viewing geometry.
    geometry: Geometry,
}

/// Atmosphere profiles for the RTM.
#[derive(Debug)]
pub struct Atmosphere {
    /// Radius grid, strictly increasing from the bottom of the atmosphere.
    radius: Vec<f64>,
    /// Temperature profile in K, aligned with `radius`.
    temperature: Vec<f64>,
    /// Wavenumbers, strictly increasing.
    wavenumber: Vec<f64>,
    /// Extinction coefficient with shape (`num_wavenumbers`, `num_layers`), in
    /// inverse units of `radius_factor`.
    extinction: Array2<f64>,
}

/// Outputs from the RTM.
#[derive(Debug)]
pub struct EclipseOutputs {
    /// Emergent intensity in erg/s/sr/cm with shape (`num_angles`,
    /// `num_wavenumbers`).
    pub intensity: Array2<f64>,
    /// Emergent flux in erg/s/cm for each wavenumber.
    pub flux: Array1<f64>,
    /// Optical depth used for the intensities.
    pub depth: OpticalDepth,
}

/// Progress of a run.
///
/// Shared with whoever is watching the run so it can report progress or ask
/// for an early stop. Every wavenumber counts once for the optical depth and
/// once more for each angle, so a full run completes
/// [`Atmosphere::num_steps`] steps.
#[derive(Debug, Default)]
pub struct Progress {
    completed: AtomicUsize,
    cancelled: AtomicBool,
    finished: AtomicBool,
}

impl Progress {
    /// Number of steps finished so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Mark the run as over, whether it succeeded or not.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }

    /// Whether the run is over.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// Ask the computation to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether a stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl EclipseParameters {
    /// Validate the configuration.
    ///
    /// `geometry` names the ray solution, e.g. `"eclipse"`.
    pub fn new(
        angles: &[f64],
        toomuch: f64,
        radius_factor: f64,
        wavenumber_factor: f64,
        geometry: &str,
    ) -> Result<Self, EclipseError> {
        if angles.is_empty()
            || !angles.iter().all(|a| (0.0..90.0).contains(a))
            || !angles.windows(2).all(|a| a[0] < a[1])
        {
            return Err(EclipseError::InvalidAngles);
        }
        if toomuch.is_nan() || toomuch <= 0. {
            return Err(EclipseError::InvalidParameter("toomuch"));
        }
        if !(radius_factor.is_finite() && radius_factor > 0.) {
            return Err(EclipseError::InvalidParameter("radius_factor"));
        }
        if !(wavenumber_factor.is_finite() && wavenumber_factor > 0.) {
            return Err(EclipseError::InvalidParameter("wavenumber_factor"));
        }

        Ok(Self {
            angles: SmallVec::from_slice(angles),
            toomuch,
            radius_factor,
            wavenumber_factor,
            geometry: geometry.parse()?,
        })
    }

    /// Incidence angles in degrees.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }
}

impl Atmosphere {
    /// Check and copy the atmosphere profiles.
    ///
    /// `radius` and `temperature` have length `num_layers`, `wavenumber` has
    /// length `num_wavenumbers`, and `extinction` is dimensioned as
    /// (`num_wavenumbers`, `num_layers`).
    pub fn new(
        radius: &[f64],
        temperature: &[f64],
        wavenumber: &[f64],
        extinction: ArrayView2<'_, f64>,
    ) -> Result<Self, EclipseError> {
        let num_layers = radius.len();
        if num_layers < 3 {
            return Err(EclipseError::TooFewPoints { given: num_layers });
        }
        if temperature.len() != num_layers
            || wavenumber.is_empty()
            || extinction.dim() != (wavenumber.len(), num_layers)
        {
            return Err(EclipseError::InconsistentInputs);
        }
        if !radius.windows(2).all(|r| r[0] < r[1]) || !wavenumber.windows(2).all(|w| w[0] < w[1])
        {
            return Err(EclipseError::NotIncreasing);
        }

        Ok(Self {
            radius: radius.to_vec(),
            temperature: temperature.to_vec(),
            wavenumber: wavenumber.to_vec(),
            extinction: extinction.as_standard_layout().into_owned(),
        })
    }

    /// Number of layers in the radius grid.
    pub fn num_layers(&self) -> usize {
        self.radius.len()
    }

    /// Number of wavenumbers.
    pub fn num_wavenumbers(&self) -> usize {
        self.wavenumber.len()
    }

    /// Number of progress steps in a run with `parameters`.
    pub fn num_steps(&self, parameters: &EclipseParameters) -> usize {
        self.num_wavenumbers() * (1 + parameters.angles.len())
    }

    /// Apply the RTM for the given parameters.
    pub fn run(
        &self,
        parameters: &EclipseParameters,
        output: &OutputFiles,
    ) -> Result<EclipseOutputs, EclipseError> {
        self.run_with_progress(parameters, output, &Progress::default())
    }

    /// Apply the RTM, reporting through `progress`.
    ///
    /// Both the optical depth and the intensity stages stop early with
    /// [`EclipseError::Cancelled`] once `progress` is cancelled. `progress` is
    /// marked finished on return.
    pub fn run_with_progress(
        &self,
        parameters: &EclipseParameters,
        output: &OutputFiles,
        progress: &Progress,
    ) -> Result<EclipseOutputs, EclipseError> {
        let outputs = self.run_stages(parameters, output, progress);
        progress.finish();
        outputs
    }

    fn run_stages(
        &self,
        parameters: &EclipseParameters,
        output: &OutputFiles,
        progress: &Progress,
    ) -> Result<EclipseOutputs, EclipseError> {
        info!(
            "Processing {} ray solution for {} layers, {} wavenumbers and {} angles",
            parameters.geometry.solution().name(),
            self.num_layers(),
            self.num_wavenumbers(),
            parameters.angles.len()
        );

        let depth = OpticalDepth::compute(self, parameters, progress)?;

        let mut intensity = Array2::zeros([parameters.angles.len(), self.num_wavenumbers()]);
        for angle_index in 0..parameters.angles.len() {
            emergent_intens(
                self,
                &depth,
                parameters,
                angle_index,
                &mut intensity,
                output,
                progress,
            )?;
        }

        let flux = flux(&self.wavenumber, parameters, intensity.view(), output)?;

        Ok(EclipseOutputs {
            intensity,
            flux,
            depth,
        })
    }
}
