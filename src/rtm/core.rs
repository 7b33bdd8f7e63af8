//! Core eclipse RTM stages: optical depth, intensity, and flux.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::atomic::Ordering;

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

use super::output::OutputFiles;
use super::solution::{RayContext, RaySolution};
use super::{Atmosphere, EclipseParameters, Progress};
use crate::error::EclipseError;

/// Optical depth per wavenumber, as seen from the top of the atmosphere.
#[derive(Debug, Clone)]
pub struct OpticalDepth {
    /// Optical depth with shape (`num_wavenumbers`, `num_layers`). Along each
    /// row, index 0 is the top layer. Entries past `last` are zero.
    pub tau: Array2<f64>,
    /// For each wavenumber, the first layer (from the top) where the optical
    /// depth exceeds `toomuch`, or the bottom layer if it never does.
    pub last: Vec<usize>,
    /// Maximum optical depth computed.
    pub toomuch: f64,
}

impl OpticalDepth {
    /// Compute the optical depth for every wavenumber of `atmosphere`.
    ///
    /// Wavenumbers are handled in parallel on the current rayon pool. Each
    /// finished wavenumber is counted in `progress`, and setting its cancel
    /// flag stops the computation early.
    pub fn compute(
        atmosphere: &Atmosphere,
        parameters: &EclipseParameters,
        progress: &Progress,
    ) -> Result<Self, EclipseError> {
        let solution = parameters.geometry.solution();
        let num_wavenumbers = atmosphere.wavenumber.len();
        let num_layers = atmosphere.radius.len();

        let mut columns = Vec::new();
        (0..num_wavenumbers)
            .into_par_iter()
            .map(|wn_index| -> Result<_, EclipseError> {
                if progress.is_cancelled() {
                    return Err(EclipseError::Cancelled);
                }
                let extinction = atmosphere
                    .extinction
                    .index_axis(Axis(0), wn_index)
                    .to_slice()
                    .ok_or(EclipseError::NotContiguous)?;

                tau_column(
                    solution,
                    &atmosphere.radius,
                    extinction,
                    parameters.toomuch,
                    parameters.radius_factor,
                )
            })
            .inspect(|_| {
                progress.completed.fetch_add(1, Ordering::Relaxed);
            })
            .collect_into_vec(&mut columns);

        let mut tau = Array2::zeros([num_wavenumbers, num_layers]);
        let mut last = Vec::with_capacity(num_wavenumbers);
        for (mut row, column) in tau.rows_mut().into_iter().zip(columns) {
            let (column, column_last) = column?;
            row.assign(&ndarray::ArrayView1::from(column.as_slice()));
            last.push(column_last);
        }
        debug!("optical depth computed for {num_wavenumbers} wavenumbers");

        Ok(Self {
            tau,
            last,
            toomuch: parameters.toomuch,
        })
    }
}

/// Optical depth of one wavenumber at each layer, from the top down.
///
/// The walk stops at the first layer whose optical depth exceeds `toomuch`;
/// the returned index is that layer, or the bottom layer if none does.
fn tau_column(
    solution: &dyn RaySolution,
    radius: &[f64],
    extinction: &[f64],
    toomuch: f64,
    radius_factor: f64,
) -> Result<(Vec<f64>, usize), EclipseError> {
    let num_layers = radius.len();
    let mut tau = vec![0.; num_layers];

    for (k, &height) in radius.iter().rev().enumerate() {
        tau[k] = radius_factor * solution.optical_depth(radius, extinction, height)?;
        if tau[k] > toomuch {
            return Ok((tau, k));
        }
    }

    Ok((tau, num_layers - 1))
}

/// Compute the emergent intensity at every wavenumber for one angle.
///
/// Fills row `angle_index` of `intensity`, which has shape (`num_angles`,
/// `num_wavenumbers`). Once the last angle is done, the intensity table is
/// handed to `output`. Each wavenumber is counted in `progress`, and setting
/// its cancel flag stops the loop early.
pub(crate) fn emergent_intens(
    atmosphere: &Atmosphere,
    depth: &OpticalDepth,
    parameters: &EclipseParameters,
    angle_index: usize,
    intensity: &mut Array2<f64>,
    output: &OutputFiles,
    progress: &Progress,
) -> Result<(), EclipseError> {
    let solution = parameters.geometry.solution();
    let angle = parameters.angles[angle_index];
    let num_wavenumbers = atmosphere.wavenumber.len();
    let ray = RayContext {
        temperature: &atmosphere.temperature,
        wn_factor: parameters.wavenumber_factor,
        angle,
    };

    info!("Integrating over {num_wavenumbers} wavenumbers at {angle} degrees");

    let step = (num_wavenumbers / 10).max(1);
    let mut out = intensity.index_axis_mut(Axis(0), angle_index);
    for (w, ((out, &wavenumber), (tau, &last))) in out
        .iter_mut()
        .zip(&atmosphere.wavenumber)
        .zip(depth.tau.rows().into_iter().zip(&depth.last))
        .enumerate()
    {
        if progress.is_cancelled() {
            return Err(EclipseError::Cancelled);
        }
        let tau = tau.to_slice().ok_or(EclipseError::NotContiguous)?;
        *out = solution.intensity(tau, wavenumber, last, depth.toomuch, &ray)?;
        progress.completed.fetch_add(1, Ordering::Relaxed);

        if (w + 1) % step == 0 {
            debug!("{}% done", 100 * (w + 1) / num_wavenumbers);
        }
    }

    if angle_index == parameters.angles.len() - 1 {
        output.write_intensity(
            &atmosphere.wavenumber,
            parameters.wavenumber_factor,
            &parameters.angles,
            intensity.view(),
        )?;
    }

    Ok(())
}

/// Combine the intensity at each angle into the flux spectrum.
///
/// Each angle stands for the ring of the disk between the midpoints to its
/// neighbors (0° and 90° at the ends), weighted by its projected area:
///
/// F = π Σ_i I_i (sin²θ_upper - sin²θ_lower)
pub(crate) fn flux(
    wavenumber: &[f64],
    parameters: &EclipseParameters,
    intensity: ArrayView2<'_, f64>,
    output: &OutputFiles,
) -> Result<Array1<f64>, EclipseError> {
    let angles = &parameters.angles;
    if intensity.dim() != (angles.len(), wavenumber.len()) {
        return Err(EclipseError::InconsistentInputs);
    }

    let mut area_grid = Vec::with_capacity(angles.len() + 1);
    area_grid.push(0.);
    area_grid.extend(angles.windows(2).map(|a| (0.5 * (a[0] + a[1])).to_radians()));
    area_grid.push(FRAC_PI_2);

    let mut flux = Array1::zeros(wavenumber.len());
    for (bounds, row) in area_grid.windows(2).zip(intensity.rows()) {
        let area = bounds[1].sin().powi(2) - bounds[0].sin().powi(2);
        flux.scaled_add(PI * area, &row);
    }

    output.write_flux(wavenumber, parameters.wavenumber_factor, flux.view())?;

    Ok(flux)
}
