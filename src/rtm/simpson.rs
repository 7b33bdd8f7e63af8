//! Simpson's rule for unevenly spaced samples.
//!
//! The abscissa is split into consecutive pairs of intervals and each pair is
//! integrated with the parabola through its three points. With an even number
//! of samples the last interval is left over; it is integrated with the
//! parabola through the final three samples instead.

use smallvec::SmallVec;

use crate::error::EclipseError;

/// Stack-local scratch for the per-interval quantities.
type Scratch = SmallVec<[f64; 64]>;

/// Interval widths and the per-pair coefficients derived from them.
#[derive(Debug)]
pub(crate) struct SimpsonWeights {
    /// Interval widths, `h[i] = x[i+1] - x[i]`.
    h: Scratch,
    /// Width of each pair of intervals, `h[2i] + h[2i+1]`.
    hsum: Scratch,
    /// Ratio within each pair, `h[2i+1] / h[2i]`.
    hratio: Scratch,
    /// Middle-point weight of each pair, `hsum² / (h[2i] h[2i+1])`.
    hfactor: Scratch,
}

impl SimpsonWeights {
    /// Prepare the weights for the abscissa `x`.
    ///
    /// `x` needs at least 3 strictly increasing values.
    pub(crate) fn new(x: &[f64]) -> Result<Self, EclipseError> {
        if x.len() < 3 {
            return Err(EclipseError::TooFewPoints { given: x.len() });
        }

        let h: Scratch = x.windows(2).map(|w| w[1] - w[0]).collect();
        // Also rejects NaN widths
        if !h.iter().all(|&h| h > 0.) {
            return Err(EclipseError::NotIncreasing);
        }

        let pairs = h.len() / 2;
        let hsum = (0..pairs).map(|i| h[2 * i] + h[2 * i + 1]).collect();
        let hratio = (0..pairs).map(|i| h[2 * i + 1] / h[2 * i]).collect();
        let hfactor = (0..pairs)
            .map(|i| (h[2 * i] + h[2 * i + 1]).powi(2) / (h[2 * i] * h[2 * i + 1]))
            .collect();

        Ok(Self {
            h,
            hsum,
            hratio,
            hfactor,
        })
    }

    /// Number of samples the weights were built for.
    pub(crate) fn len(&self) -> usize {
        self.h.len() + 1
    }

    /// Integrate the samples `y`, which must line up with the abscissa.
    pub(crate) fn integrate(&self, y: &[f64]) -> Result<f64, EclipseError> {
        let n = self.len();
        if y.len() != n {
            return Err(EclipseError::InconsistentInputs);
        }

        let pairs: f64 = self
            .hsum
            .iter()
            .zip(&self.hratio)
            .zip(&self.hfactor)
            .zip(y.windows(3).step_by(2))
            .map(|(((hsum, hratio), hfactor), y)| {
                hsum * (y[0] * (2. - hratio) + y[1] * hfactor + y[2] * (2. - 1. / hratio))
            })
            .sum::<f64>()
            / 6.;

        if n % 2 == 1 {
            return Ok(pairs);
        }

        // Leftover last interval, from the parabola through the last three points
        let a = self.h[n - 3];
        let b = self.h[n - 2];
        let tail = y[n - 1] * b * (2. * b + 3. * a) / (6. * (a + b))
            + y[n - 2] * b * (b + 3. * a) / (6. * a)
            - y[n - 3] * b.powi(3) / (6. * a * (a + b));

        Ok(pairs + tail)
    }
}

/// Integrate `y` over the unevenly spaced abscissa `x`.
pub(crate) fn simpson(x: &[f64], y: &[f64]) -> Result<f64, EclipseError> {
    SimpsonWeights::new(x)?.integrate(y)
}
