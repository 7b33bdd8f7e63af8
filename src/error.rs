//! Error types for the eclipse RTM.

/// Possible eclipse RTM errors.
#[derive(Debug)]
pub enum EclipseError {
    /// The inputs don't have the expected shape(s)
    InconsistentInputs,
    /// A grid that must be strictly increasing is not
    NotIncreasing,
    /// Fewer than 3 points are available for Simpson integration
    TooFewPoints {
        /// Number of points that were available
        given: usize,
    },
    /// The requested altitude is below the bottom of the radius grid
    AltitudeOutOfRange,
    /// Incidence angles must be strictly increasing and within [0, 90) degrees
    InvalidAngles,
    /// A scalar configuration value is out of range
    InvalidParameter(&'static str),
    /// The ray-solution geometry name is not known
    UnknownGeometry(String),
    /// An array is not contiguous when it was assumed to be
    NotContiguous,
    /// The operation was aborted early
    Cancelled,
    /// Writing an output table failed
    Io(std::io::Error),
}

impl std::fmt::Display for EclipseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EclipseError::InconsistentInputs => {
                write!(f, "inputs to RTM have the wrong shape")
            }
            EclipseError::NotIncreasing => {
                write!(f, "grid values are not strictly increasing")
            }
            EclipseError::TooFewPoints { given } => write!(
                f,
                "less than 3 items ({given} given) for radial integration"
            ),
            EclipseError::AltitudeOutOfRange => {
                write!(f, "altitude is below the bottom of the radius grid")
            }
            EclipseError::InvalidAngles => write!(
                f,
                "incidence angles must be increasing and within [0, 90) degrees"
            ),
            EclipseError::InvalidParameter(name) => write!(f, "invalid value for `{name}`"),
            EclipseError::UnknownGeometry(name) => write!(f, "unknown ray solution '{name}'"),
            EclipseError::NotContiguous => write!(f, "array slice not contiguous in memory"),
            EclipseError::Cancelled => write!(f, "operation cancelled early"),
            EclipseError::Io(e) => write!(f, "failed to write output: {e}"),
        }
    }
}

impl std::error::Error for EclipseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EclipseError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EclipseError {
    fn from(e: std::io::Error) -> Self {
        EclipseError::Io(e)
    }
}
