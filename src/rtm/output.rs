//! Text tables for the intensity grid and flux spectrum.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use ndarray::{ArrayView1, ArrayView2};

/// Where to write the output tables.
///
/// A table with no path is not written. The path `-` means standard output.
#[derive(Debug, Clone, Default)]
pub struct OutputFiles {
    /// Destination of the intensity table.
    pub intensity: Option<PathBuf>,
    /// Destination of the flux table.
    pub flux: Option<PathBuf>,
}

impl OutputFiles {
    /// Write the intensity table, if it has a destination.
    pub fn write_intensity(
        &self,
        wavenumber: &[f64],
        wn_factor: f64,
        angles: &[f64],
        intensity: ArrayView2<'_, f64>,
    ) -> io::Result<()> {
        let Some(path) = &self.intensity else {
            info!("No intensity file");
            return Ok(());
        };
        info!("Printing intensity in '{}'", path.display());
        with_destination(path, |out| {
            intensity_table(out, wavenumber, wn_factor, angles, intensity)
        })
    }

    /// Write the flux table, if it has a destination.
    pub fn write_flux(
        &self,
        wavenumber: &[f64],
        wn_factor: f64,
        flux: ArrayView1<'_, f64>,
    ) -> io::Result<()> {
        let Some(path) = &self.flux else {
            info!("No flux file");
            return Ok(());
        };
        info!("Printing flux in '{}'", path.display());
        with_destination(path, |out| flux_table(out, wavenumber, wn_factor, flux))
    }
}

fn with_destination(
    path: &Path,
    write: impl FnOnce(&mut dyn Write) -> io::Result<()>,
) -> io::Result<()> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write(&mut out)?;
        out.flush()
    } else {
        let mut out = BufWriter::new(File::create(path)?);
        write(&mut out)?;
        out.flush()
    }
}

/// Wavelength in microns for a wavenumber.
fn wavelength_um(wavenumber: f64, wn_factor: f64) -> f64 {
    1e4 / (wavenumber * wn_factor)
}

/// Write the intensity at each angle (columns) and wavelength (rows).
pub fn intensity_table(
    out: &mut dyn Write,
    wavenumber: &[f64],
    wn_factor: f64,
    angles: &[f64],
    intensity: ArrayView2<'_, f64>,
) -> io::Result<()> {
    write!(out, "#wvl {:10}", "")?;
    for angle in angles {
        write!(out, "I[{angle:4.1} deg]{:7}", "")?;
    }
    write!(out, "\n#[um]{:10}", "")?;
    for _ in angles {
        write!(out, "[erg/s/cm/sr]{:5}", "")?;
    }
    writeln!(out)?;

    for (w, &wavenumber) in wavenumber.iter().enumerate() {
        write!(out, "{:<15.8}", wavelength_um(wavenumber, wn_factor))?;
        for value in intensity.column(w) {
            write!(out, "{value:<18.9e}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the flux at each wavelength.
pub fn flux_table(
    out: &mut dyn Write,
    wavenumber: &[f64],
    wn_factor: f64,
    flux: ArrayView1<'_, f64>,
) -> io::Result<()> {
    writeln!(out, "#wvl [um]{:6}Flux [erg/s/cm]", "")?;
    for (&wavenumber, value) in wavenumber.iter().zip(flux) {
        writeln!(
            out,
            "{:<15.8}{value:<18.9e}",
            wavelength_um(wavenumber, wn_factor)
        )?;
    }
    Ok(())
}
