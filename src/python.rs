//! Python interface
//!
//! NOTE: this module is intended for the interface between Rust and Python. The
//! real work happens in the other modules, and they do not use `pyo3`, its
//! only used here.

use std::{path::PathBuf, time::Duration};

use log::{debug, info};
use ndarray::{Array1, Array2};
use numpy::prelude::*;
use numpy::{PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::EclipseError;
use crate::rtm::{Atmosphere, EclipseParameters, OutputFiles, Progress, DEFAULT_TOOMUCH};

impl From<EclipseError> for PyErr {
    fn from(e: EclipseError) -> Self {
        match e {
            EclipseError::Io(e) => e.into(),
            e => PyValueError::new_err(e.to_string()),
        }
    }
}

/// Eclipse spectrum.
///
/// This is just a container of multiple numpy arrays.
#[pyclass]
struct EclipseSpectrum {
    intensity: Array2<f64>,
    flux: Array1<f64>,
    tau: Array2<f64>,
    last: Vec<u64>,
}

/// Implement all the "getters" for the Python properties
#[pymethods]
impl EclipseSpectrum {
    #[getter]
    fn intensity<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.intensity.to_pyarray(py)
    }

    #[getter]
    fn flux<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.flux.to_pyarray(py)
    }

    #[getter]
    fn tau<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.tau.to_pyarray(py)
    }

    #[getter]
    fn last<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u64>> {
        self.last.to_pyarray(py)
    }
}

/// Compute the emergent intensity and flux of an atmosphere.
///
/// `radius`: radius grid from the bottom of the atmosphere up, in units of
/// `radius_factor` cm, with shape (`num_layers`, )
///
/// `temperature`: temperature in K at each radius, with shape (`num_layers`, )
///
/// `extinction`: extinction coefficient in inverse radius units, with shape
/// (`num_wavenumbers`, `num_layers`)
///
/// `wavenumber`: wavenumbers in units of `wavenumber_factor` cm⁻¹, with shape
/// (`num_wavenumbers`, )
///
/// `angles`: viewing angles in degrees, increasing within [0, 90)
///
/// `toomuch`: optical depth past which deeper layers are ignored
///
/// `geometry`: name of the ray solution, only "eclipse" for now
///
/// `intensity_file`, `flux_file`: optional paths of the output tables, with
/// "-" meaning standard output
///
/// The returned intensity is dimensioned as (`num_angles`, `num_wavenumbers`)
/// and the flux as (`num_wavenumbers`, ).
///
/// The number of worker threads is controlled by `num_threads`. It must be a
/// positive integer, or `None` to automatically choose the number of threads.
#[pyfunction]
#[pyo3(signature = (radius, temperature, extinction, wavenumber, angles, toomuch=DEFAULT_TOOMUCH, radius_factor=1.0, wavenumber_factor=1.0, geometry="eclipse", num_threads=None, intensity_file=None, flux_file=None))]
#[allow(clippy::too_many_arguments)]
fn compute_eclipse(
    py: Python<'_>,
    radius: PyReadonlyArray1<'_, f64>,
    temperature: PyReadonlyArray1<'_, f64>,
    extinction: PyReadonlyArray2<'_, f64>,
    wavenumber: PyReadonlyArray1<'_, f64>,
    angles: PyReadonlyArray1<'_, f64>,
    toomuch: f64,
    radius_factor: f64,
    wavenumber_factor: f64,
    geometry: &str,
    num_threads: Option<usize>,
    intensity_file: Option<PathBuf>,
    flux_file: Option<PathBuf>,
) -> PyResult<EclipseSpectrum> {
    let parameters = EclipseParameters::new(
        angles.as_slice()?,
        toomuch,
        radius_factor,
        wavenumber_factor,
        geometry,
    )?;
    let atmosphere = Atmosphere::new(
        radius.as_slice()?,
        temperature.as_slice()?,
        wavenumber.as_slice()?,
        extinction.as_array(),
    )?;
    debug!("input shapes are consistent");

    let output = OutputFiles {
        intensity: intensity_file,
        flux: flux_file,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let num_steps = atmosphere.num_steps(&parameters);
    let progress = Progress::default();
    let mut result = None;

    pool.in_place_scope(|s| -> Result<(), PyErr> {
        s.spawn(|_| {
            result = Some(atmosphere.run_with_progress(&parameters, &output, &progress));
        });

        // The work is done in the thread pool, but back here in the main
        // thread, handle progress reporting and checking for early
        // cancellation
        while !progress.is_cancelled() {
            if let Err(e) = py.check_signals() {
                progress.cancel();
                return Err(e);
            }

            let num_completed = progress.completed();
            let percent = num_completed as f32 / num_steps as f32 * 100.;
            info!("Completed {num_completed}/{num_steps} steps ({percent:0.2}%)");

            if progress.is_finished() {
                break;
            }

            py.allow_threads(|| {
                std::thread::sleep(Duration::from_secs(5));
            });
        }

        Ok(())
    })?;

    let outputs = result.ok_or(EclipseError::Cancelled)??;

    Ok(EclipseSpectrum {
        intensity: outputs.intensity,
        flux: outputs.flux,
        tau: outputs.depth.tau,
        last: outputs.depth.last.iter().map(|&l| l as u64).collect(),
    })
}

/// A Python module implemented in Rust.
#[pymodule]
fn eclipse_rtm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(compute_eclipse, m)?)?;
    m.add_class::<EclipseSpectrum>()?;
    Ok(())
}
