use std::f64::consts::PI;

use approx::assert_relative_eq;
use ndarray::{array, Array2};

use super::planck::planck_wavenumber;
use super::*;

/// Isothermal, optically thick column with `num_layers` unit-spaced layers.
fn thick_atmosphere(num_layers: usize, wavenumber: &[f64], extinction: f64) -> Atmosphere {
    let radius: Vec<f64> = (0..num_layers).map(|i| 100. + i as f64).collect();
    let temperature = vec![1300.; num_layers];
    let extinction = Array2::from_elem([wavenumber.len(), num_layers], extinction);
    Atmosphere::new(&radius, &temperature, wavenumber, extinction.view()).unwrap()
}

#[test]
fn parameter_validation() {
    assert!(EclipseParameters::new(&[0., 20., 40.], 20., 1., 1., "eclipse").is_ok());
    let bad_angles: [&[f64]; 5] = [&[], &[20., 10.], &[10., 10.], &[-5.], &[90.]];
    for angles in bad_angles {
        assert!(matches!(
            EclipseParameters::new(angles, 20., 1., 1., "eclipse"),
            Err(EclipseError::InvalidAngles)
        ));
    }
    assert!(matches!(
        EclipseParameters::new(&[0.], 0., 1., 1., "eclipse"),
        Err(EclipseError::InvalidParameter("toomuch"))
    ));
    assert!(matches!(
        EclipseParameters::new(&[0.], 20., -1., 1., "eclipse"),
        Err(EclipseError::InvalidParameter("radius_factor"))
    ));
    assert!(matches!(
        EclipseParameters::new(&[0.], 20., 1., f64::NAN, "eclipse"),
        Err(EclipseError::InvalidParameter("wavenumber_factor"))
    ));
    assert!(matches!(
        EclipseParameters::new(&[0.], 20., 1., 1., "transit"),
        Err(EclipseError::UnknownGeometry(_))
    ));
}

#[test]
fn atmosphere_validation() {
    let extinction = array![[0.1, 0.05, 0.0]];
    assert!(Atmosphere::new(&[1., 1.5, 2.], &[900.; 3], &[1000.], extinction.view()).is_ok());
    assert!(matches!(
        Atmosphere::new(&[1., 2.], &[900.; 2], &[1000.], array![[0.1, 0.]].view()),
        Err(EclipseError::TooFewPoints { given: 2 })
    ));
    assert!(matches!(
        Atmosphere::new(&[1., 1.5, 2.], &[900.; 2], &[1000.], extinction.view()),
        Err(EclipseError::InconsistentInputs)
    ));
    assert!(matches!(
        Atmosphere::new(&[1., 1.5, 2.], &[900.; 3], &[1000., 2000.], extinction.view()),
        Err(EclipseError::InconsistentInputs)
    ));
    assert!(matches!(
        Atmosphere::new(&[1., 2.5, 2.], &[900.; 3], &[1000.], extinction.view()),
        Err(EclipseError::NotIncreasing)
    ));
}

#[test]
fn transposed_extinction_is_accepted() {
    let by_layer = array![[0.1, 0.2], [0.05, 0.1], [0.0, 0.0]];
    let atmosphere =
        Atmosphere::new(&[1., 1.5, 2.], &[900.; 3], &[1000., 2000.], by_layer.t()).unwrap();
    let parameters = EclipseParameters::new(&[0.], 20., 1., 1., "eclipse").unwrap();
    let outputs = atmosphere.run(&parameters, &OutputFiles::default()).unwrap();
    assert_relative_eq!(outputs.depth.tau[[0, 2]], 0.05, epsilon = 1e-12);
    assert_relative_eq!(outputs.depth.tau[[1, 2]], 0.1, epsilon = 1e-12);
}

#[test]
fn thick_isothermal_flux() {
    let wavenumber = [800., 1600., 2400.];
    let atmosphere = thick_atmosphere(201, &wavenumber, 0.2);
    let parameters = EclipseParameters::new(&[15., 45., 75.], 20., 1., 1., "eclipse").unwrap();

    let outputs = atmosphere.run(&parameters, &OutputFiles::default()).unwrap();

    assert_eq!(outputs.intensity.dim(), (3, 3));
    for (w, &wavenumber) in wavenumber.iter().enumerate() {
        let blackbody = planck_wavenumber(wavenumber, 1., 1300.);
        for angle_index in 0..3 {
            assert_relative_eq!(
                outputs.intensity[[angle_index, w]],
                blackbody,
                max_relative = 0.02
            );
        }
        assert_relative_eq!(outputs.flux[w], PI * blackbody, max_relative = 0.02);
    }
}

#[test]
fn flux_is_area_weighted_intensity() {
    let wavenumber = [1000., 1100.];
    let atmosphere = thick_atmosphere(40, &wavenumber, 0.05);
    let angles = [10., 40., 70.];
    let parameters = EclipseParameters::new(&angles, 20., 1., 1., "eclipse").unwrap();

    let outputs = atmosphere.run(&parameters, &OutputFiles::default()).unwrap();

    let bounds = [0., 25., 55., 90.].map(|b: f64| b.to_radians().sin().powi(2));
    for w in 0..wavenumber.len() {
        let expected: f64 = (0..3)
            .map(|i| PI * (bounds[i + 1] - bounds[i]) * outputs.intensity[[i, w]])
            .sum();
        assert_relative_eq!(outputs.flux[w], expected, max_relative = 1e-12);
    }

    // Thin column: slanted rays see more of the hot atmosphere
    assert!(outputs.intensity[[2, 0]] > outputs.intensity[[0, 0]]);
}

#[test]
fn saturation_needs_three_points() {
    // The second layer from the top is already past `toomuch`
    let wavenumber = [1000.];
    let atmosphere = thick_atmosphere(5, &wavenumber, 50.);
    let parameters = EclipseParameters::new(&[0.], 20., 1., 1., "eclipse").unwrap();

    let outputs = atmosphere.run(&parameters, &OutputFiles::default()).unwrap();
    assert_eq!(outputs.depth.last, vec![1]);
    assert!(outputs.intensity[[0, 0]] > 0.);

    // With the top layer alone saturated, there is nothing to integrate
    let radius = [1., 2., 3.];
    let depth = OpticalDepth {
        tau: array![[25., 0., 0.]],
        last: vec![0],
        toomuch: 20.,
    };
    let atmosphere =
        Atmosphere::new(&radius, &[900.; 3], &wavenumber, array![[1., 1., 1.]].view()).unwrap();
    let mut intensity = Array2::zeros([1, 1]);
    assert!(matches!(
        super::core::emergent_intens(
            &atmosphere,
            &depth,
            &parameters,
            0,
            &mut intensity,
            &OutputFiles::default(),
            &Progress::default(),
        ),
        Err(EclipseError::TooFewPoints { given: 2 })
    ));
}

#[test]
fn transparent_upper_layers() {
    let parameters = EclipseParameters::new(&[0.], 20., 1., 1., "eclipse").unwrap();

    // No extinction in the two top layers
    let atmosphere = Atmosphere::new(
        &[1., 2., 3., 4.],
        &[1000.; 4],
        &[1000.],
        array![[0.1, 0.05, 0.0, 0.0]].view(),
    )
    .unwrap();
    let outputs = atmosphere.run(&parameters, &OutputFiles::default()).unwrap();
    assert_eq!(outputs.depth.tau[[0, 0]], 0.);
    assert_eq!(outputs.depth.tau[[0, 1]], 0.);
    let intensity = outputs.intensity[[0, 0]];
    assert!(intensity.is_finite() && intensity > 0.);
    // Thin column, well short of a blackbody
    assert!(intensity < 0.5 * planck_wavenumber(1000., 1., 1000.));

    // Nothing absorbs, so nothing is emitted
    let atmosphere = Atmosphere::new(
        &[1., 2., 3.],
        &[1000.; 3],
        &[1000., 2000.],
        Array2::<f64>::zeros([2, 3]).view(),
    )
    .unwrap();
    let outputs = atmosphere.run(&parameters, &OutputFiles::default()).unwrap();
    assert_eq!(outputs.depth.last, vec![2, 2]);
    assert!(outputs.intensity.iter().all(|&i| i == 0.));
    assert!(outputs.flux.iter().all(|&f| f == 0.));
}

#[test]
fn progress_covers_every_stage() {
    let wavenumber = [1000., 2000., 3000.];
    let atmosphere = thick_atmosphere(11, &wavenumber, 0.5);
    let parameters = EclipseParameters::new(&[0., 30., 60.], 20., 1., 1., "eclipse").unwrap();

    let progress = Progress::default();
    atmosphere
        .run_with_progress(&parameters, &OutputFiles::default(), &progress)
        .unwrap();
    assert_eq!(atmosphere.num_steps(&parameters), 12);
    assert_eq!(progress.completed(), 12);
    assert!(progress.is_finished());

    let progress = Progress::default();
    progress.cancel();
    assert!(matches!(
        atmosphere.run_with_progress(&parameters, &OutputFiles::default(), &progress),
        Err(EclipseError::Cancelled)
    ));
    assert!(progress.is_finished());
}

#[test]
fn tables_are_written() {
    let dir = std::env::temp_dir().join(format!("eclipse_rtm_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let output = OutputFiles {
        intensity: Some(dir.join("intensity.dat")),
        flux: Some(dir.join("flux.dat")),
    };

    let wavenumber = [1000., 2000.];
    let atmosphere = thick_atmosphere(21, &wavenumber, 1.);
    let parameters = EclipseParameters::new(&[0., 60.], 20., 1., 1., "eclipse").unwrap();
    atmosphere.run(&parameters, &output).unwrap();

    let intensity = std::fs::read_to_string(dir.join("intensity.dat")).unwrap();
    assert_eq!(intensity.lines().count(), 2 + wavenumber.len());
    assert!(intensity.contains("I[60.0 deg]"));

    let flux = std::fs::read_to_string(dir.join("flux.dat")).unwrap();
    assert_eq!(flux.lines().count(), 1 + wavenumber.len());

    std::fs::remove_dir_all(&dir).unwrap();
}
