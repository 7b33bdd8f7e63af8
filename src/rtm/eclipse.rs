//! Eclipse geometry.
//!
//! In eclipse geometry each layer emits radially toward the observer, so the
//! path length between two layers is just their radius difference.

use smallvec::SmallVec;

use super::interp::{bin_search_below, interp_parab};
use super::planck::planck_wavenumber;
use super::simpson::simpson;
use super::solution::{RayContext, RaySolution};
use crate::error::EclipseError;

/// The eclipse ray solution.
#[derive(Debug, Clone, Copy, Default)]
pub struct EclipsePath;

impl RaySolution for EclipsePath {
    fn name(&self) -> &'static str {
        "eclipse"
    }

    /// Integrate extinction from `height` to the top layer.
    ///
    /// The extinction at `height` is re-estimated with a parabola through the
    /// nearest three samples. With only two samples left above `height`, a
    /// third is made up halfway between them so Simpson's rule still applies.
    fn optical_depth(
        &self,
        radius: &[f64],
        extinction: &[f64],
        height: f64,
    ) -> Result<f64, EclipseError> {
        let num_layers = radius.len();
        if extinction.len() != num_layers {
            return Err(EclipseError::InconsistentInputs);
        }
        if num_layers < 3 {
            return Err(EclipseError::TooFewPoints { given: num_layers });
        }

        let rs = bin_search_below(radius, height)?;

        // Nothing above the top layer
        if rs == num_layers - 1 {
            return Ok(0.0);
        }

        let mut rad: SmallVec<[f64; 64]> = SmallVec::from_slice(&radius[rs..]);
        let mut ex: SmallVec<[f64; 64]> = SmallVec::from_slice(&extinction[rs..]);

        // Near the top there's no third point above, so borrow the one below
        let start = if rad.len() == 2 { rs - 1 } else { rs };
        let near = |v: &[f64]| [v[start], v[start + 1], v[start + 2]];
        ex[0] = interp_parab(near(radius), near(extinction), height);
        rad[0] = height;

        if rad.len() == 2 {
            rad.insert(1, 0.5 * (rad[0] + rad[1]));
            ex.insert(1, 0.5 * (ex[0] + ex[1]));
        }

        // Distance along the path
        let path: SmallVec<[f64; 64]> = rad.iter().map(|r| r - rad[0]).collect();

        simpson(&path, &ex)
    }

    /// Integrate the transmission-weighted Planck function over optical depth.
    ///
    /// Layers `0..=last` contribute. If the ray saturates before reaching the
    /// bottom, one extra zero sample is placed one unit of optical depth past
    /// `last` so the integrand falls off smoothly. Layers with the same optical
    /// depth as the one above them are merged into it.
    fn intensity(
        &self,
        tau: &[f64],
        wavenumber: f64,
        last: usize,
        _toomuch: f64,
        ray: &RayContext<'_>,
    ) -> Result<f64, EclipseError> {
        let num_layers = tau.len();
        if ray.temperature.len() != num_layers || last >= num_layers {
            return Err(EclipseError::InconsistentInputs);
        }

        let num_points = (last + 2).min(num_layers);
        if num_points < 3 {
            return Err(EclipseError::TooFewPoints { given: num_points });
        }

        let cos_angle = ray.angle.to_radians().cos();

        // `tau` runs from the top down while temperature runs from the bottom up
        let mut points: SmallVec<[(f64, f64); 64]> = tau[..=last]
            .iter()
            .zip(ray.temperature.iter().rev())
            .map(|(&tau, &t)| {
                let b = planck_wavenumber(wavenumber, ray.wn_factor, t);
                (tau, b * f64::exp(-tau / cos_angle))
            })
            .collect();

        if num_points > last + 1 {
            points.push((tau[last] + 1., 0.));
        }

        // Transparent layers repeat the same `tau`, and a zero-width step adds
        // nothing to the integral
        points.dedup_by_key(|&mut (tau, _)| tau);

        let integral = match points.as_slice() {
            [] | [_] => 0.,
            [(x0, y0), (x1, y1)] => 0.5 * (y0 + y1) * (x1 - x0),
            _ => {
                let (abscissa, integrand): (SmallVec<[f64; 64]>, SmallVec<[f64; 64]>) =
                    points.iter().copied().unzip();
                simpson(&abscissa, &integrand)?
            }
        };

        Ok(integral / cos_angle)
    }
}
