use std::fmt;
use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors that stop a terrain build.
///
/// A flat raster is not an error; it produces flat terrain.
#[derive(Debug)]
pub enum TerrainError {
    /// The raster file could not be opened or decoded.
    RasterLoad {
        path: PathBuf,
        source: image::ImageError,
    },
    /// The decoded raster has no pixels.
    EmptyRaster { width: u32, height: u32 },
    /// The background load ended without reporting a result.
    RasterLoadAborted,
    /// A build parameter failed validation.
    InvalidConfig(ConfigError),
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainError::RasterLoad { path, source } => {
                write!(f, "failed to load elevation raster {}: {source}", path.display())
            }
            TerrainError::EmptyRaster { width, height } => {
                write!(f, "elevation raster is empty ({width}x{height})")
            }
            TerrainError::RasterLoadAborted => write!(f, "elevation raster load was aborted"),
            TerrainError::InvalidConfig(e) => write!(f, "invalid terrain configuration: {e}"),
        }
    }
}

impl std::error::Error for TerrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerrainError::RasterLoad { source, .. } => Some(source),
            TerrainError::InvalidConfig(e) => Some(e),
            TerrainError::EmptyRaster { .. } | TerrainError::RasterLoadAborted => None,
        }
    }
}

impl From<ConfigError> for TerrainError {
    fn from(e: ConfigError) -> Self {
        TerrainError::InvalidConfig(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_raster_path() {
        let err = TerrainError::RasterLoad {
            path: PathBuf::from("assets/dem/missing.png"),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "not found",
            )),
        };
        let msg = err.to_string();
        assert!(msg.contains("assets/dem/missing.png"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn config_errors_convert() {
        let err: TerrainError = ConfigError::ZeroSegments.into();
        assert!(matches!(err, TerrainError::InvalidConfig(ConfigError::ZeroSegments)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
