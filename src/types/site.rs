use bon::bon;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("latitude {0} degrees is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("elevation {0} m is not plausible for a surface station")]
    ElevationOutOfRange(f64),

    #[error("anemometer height {0} m must be positive")]
    WindHeightNotPositive(f64),
}

/// Station siting metadata needed by the physical-formula collaborators.
///
/// Validated on construction: configuration problems are fatal before any
/// correction begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    latitude_deg: f64,
    elevation_m: f64,
    wind_height_m: f64,
}

#[bon]
impl SiteConfig {
    /// Builds and validates a site configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use agweather_qc::SiteConfig;
    ///
    /// let site = SiteConfig::builder()
    ///     .latitude_deg(46.7)
    ///     .elevation_m(362.0)
    ///     .wind_height_m(2.0)
    ///     .build()
    ///     .unwrap();
    /// assert!((site.latitude_rad() - 0.8151).abs() < 1e-3);
    /// ```
    #[builder]
    pub fn new(
        latitude_deg: f64,
        elevation_m: f64,
        wind_height_m: f64,
    ) -> Result<Self, ConfigError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(ConfigError::LatitudeOutOfRange(latitude_deg));
        }
        if !(-450.0..=9000.0).contains(&elevation_m) {
            return Err(ConfigError::ElevationOutOfRange(elevation_m));
        }
        if wind_height_m <= 0.0 {
            return Err(ConfigError::WindHeightNotPositive(wind_height_m));
        }
        Ok(SiteConfig {
            latitude_deg,
            elevation_m,
            wind_height_m,
        })
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    /// Latitude in radians, the unit the physical formulas expect.
    pub fn latitude_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }

    pub fn wind_height_m(&self) -> f64 {
        self.wind_height_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_latitude() {
        let result = SiteConfig::builder()
            .latitude_deg(120.0)
            .elevation_m(100.0)
            .wind_height_m(2.0)
            .build();
        assert!(matches!(result, Err(ConfigError::LatitudeOutOfRange(_))));
    }

    #[test]
    fn rejects_non_positive_wind_height() {
        let result = SiteConfig::builder()
            .latitude_deg(40.0)
            .elevation_m(100.0)
            .wind_height_m(0.0)
            .build();
        assert!(matches!(result, Err(ConfigError::WindHeightNotPositive(_))));
    }
}
