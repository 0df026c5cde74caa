use georef_linalg::Point2D;

use crate::error::ProjError;
use crate::mercator::{
    lat_lon_to_meters, meters_to_lat_lon, resolution, LatLon, MIN_ZOOM_OFFSET, ORIGIN_SHIFT,
    TILE_SIZE,
};

/// Projection constants derived from the loaded overlay image.
///
/// The maximum zoom level is the level at which the full-resolution image
/// is displayed. It is computed once from the image's largest dimension and
/// must be rebuilt when another image is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectorConfig {
    max_dimension: f64,
    max_zoom: i32,
}

impl ProjectorConfig {
    /// Build the config from the largest pixel dimension of the image.
    ///
    /// `max_zoom = ceil(log2(max_dimension / 256)) + 3`
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::InvalidImageSize`] unless the dimension is positive and finite.
    pub fn from_max_dimension(max_dimension: f64) -> Result<Self, ProjError> {
        if !(max_dimension.is_finite() && max_dimension > 0.0) {
            return Err(ProjError::InvalidImageSize(max_dimension));
        }
        let max_zoom = (max_dimension / TILE_SIZE).log2().ceil() as i32 + MIN_ZOOM_OFFSET;
        log::debug!("projector config: max dimension {max_dimension}, max zoom {max_zoom}");
        Ok(Self {
            max_dimension,
            max_zoom,
        })
    }

    /// Build the config from the image `(width, height)`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::InvalidImageSize`] unless the larger side is positive and finite.
    pub fn from_image_size(width: f64, height: f64) -> Result<Self, ProjError> {
        Self::from_max_dimension(width.max(height))
    }

    /// The largest image dimension in pixels.
    pub fn max_dimension(&self) -> f64 {
        self.max_dimension
    }

    /// The zoom level of the full-resolution image.
    pub fn max_zoom(&self) -> i32 {
        self.max_zoom
    }

    /// Web-Mercator meters to pixels at the maximum zoom level.
    ///
    /// The pixel origin is the top-left corner of the world map, with y
    /// pointing down.
    pub fn meters_to_pixels(&self, meters: Point2D) -> Point2D {
        let res = resolution(self.max_zoom);
        Point2D::new(
            (meters.x + ORIGIN_SHIFT) / res,
            (-meters.y + ORIGIN_SHIFT) / res,
        )
    }

    /// Pixels to Web-Mercator meters at `zoom`, or at the maximum zoom level when `None`.
    pub fn pixels_to_meters(&self, pixels: Point2D, zoom: Option<i32>) -> Point2D {
        let res = resolution(zoom.unwrap_or(self.max_zoom));
        Point2D::new(pixels.x * res - ORIGIN_SHIFT, -(pixels.y * res) + ORIGIN_SHIFT)
    }

    /// Geographic position to pixels at the maximum zoom level.
    pub fn lat_lon_to_pixel(&self, lat_lon: LatLon) -> Point2D {
        self.meters_to_pixels(lat_lon_to_meters(lat_lon))
    }

    /// Pixels at `zoom` (default: maximum zoom level) to a geographic position.
    pub fn pixels_to_lat_lon(&self, pixels: Point2D, zoom: Option<i32>) -> LatLon {
        meters_to_lat_lon(self.pixels_to_meters(pixels, zoom))
    }
}

/// Session-scoped projector that holds the config of the current overlay.
///
/// Pixel conversions fail with [`ProjError::Uninitialized`] until an image
/// size has been loaded.
#[derive(Debug, Clone, Default)]
pub struct CoordinateProjector {
    config: Option<ProjectorConfig>,
}

impl CoordinateProjector {
    /// Create an uninitialized projector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the config from the largest image dimension, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::InvalidImageSize`] for a non-positive dimension;
    /// the previous config is kept in that case.
    pub fn initialize(&mut self, max_dimension: f64) -> Result<&ProjectorConfig, ProjError> {
        let config = ProjectorConfig::from_max_dimension(max_dimension)?;
        Ok(self.config.insert(config))
    }

    /// Compute the config from the image `(width, height)`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::InvalidImageSize`] for a non-positive size.
    pub fn initialize_from_image_size(
        &mut self,
        width: f64,
        height: f64,
    ) -> Result<&ProjectorConfig, ProjError> {
        self.initialize(width.max(height))
    }

    /// The current config.
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::Uninitialized`] before the first successful initialization.
    pub fn config(&self) -> Result<&ProjectorConfig, ProjError> {
        self.config.as_ref().ok_or(ProjError::Uninitialized)
    }

    /// See [`ProjectorConfig::meters_to_pixels`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::Uninitialized`] before initialization.
    pub fn meters_to_pixels(&self, meters: Point2D) -> Result<Point2D, ProjError> {
        Ok(self.config()?.meters_to_pixels(meters))
    }

    /// See [`ProjectorConfig::pixels_to_meters`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::Uninitialized`] before initialization.
    pub fn pixels_to_meters(
        &self,
        pixels: Point2D,
        zoom: Option<i32>,
    ) -> Result<Point2D, ProjError> {
        Ok(self.config()?.pixels_to_meters(pixels, zoom))
    }

    /// See [`ProjectorConfig::lat_lon_to_pixel`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::Uninitialized`] before initialization.
    pub fn lat_lon_to_pixel(&self, lat_lon: LatLon) -> Result<Point2D, ProjError> {
        Ok(self.config()?.lat_lon_to_pixel(lat_lon))
    }

    /// See [`ProjectorConfig::pixels_to_lat_lon`].
    ///
    /// # Errors
    ///
    /// Returns [`ProjError::Uninitialized`] before initialization.
    pub fn pixels_to_lat_lon(
        &self,
        pixels: Point2D,
        zoom: Option<i32>,
    ) -> Result<LatLon, ProjError> {
        Ok(self.config()?.pixels_to_lat_lon(pixels, zoom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_max_zoom() -> Result<(), ProjError> {
        // 256 px fits one tile at zoom 0
        assert_eq!(ProjectorConfig::from_max_dimension(256.0)?.max_zoom(), 3);
        assert_eq!(ProjectorConfig::from_max_dimension(257.0)?.max_zoom(), 4);
        assert_eq!(ProjectorConfig::from_max_dimension(4000.0)?.max_zoom(), 7);
        assert_eq!(ProjectorConfig::from_image_size(3000.0, 5000.0)?.max_zoom(), 8);
        // smaller than a tile
        assert_eq!(ProjectorConfig::from_max_dimension(100.0)?.max_zoom(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_size() {
        for d in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ProjectorConfig::from_max_dimension(d),
                Err(ProjError::InvalidImageSize(_))
            ));
        }
    }

    #[test]
    fn test_meters_to_pixels_origin() -> Result<(), ProjError> {
        let config = ProjectorConfig::from_max_dimension(256.0)?;
        // the projection origin sits in the middle of the 2^3 * 256 pixel world
        let p = config.meters_to_pixels(Point2D::new(0.0, 0.0));
        assert_relative_eq!(p.x, 1024.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 1024.0, epsilon = 1e-9);
        // north is up: positive meters map to smaller pixel rows
        let p = config.meters_to_pixels(Point2D::new(0.0, 1000.0));
        assert!(p.y < 1024.0);
        Ok(())
    }

    #[test]
    fn test_pixels_meters_roundtrip() -> Result<(), ProjError> {
        let config = ProjectorConfig::from_max_dimension(2048.0)?;
        let m = Point2D::new(-13_580_977.9, 4_497_745.9);
        let back = config.pixels_to_meters(config.meters_to_pixels(m), None);
        assert_relative_eq!(back.x, m.x, epsilon = 1e-6);
        assert_relative_eq!(back.y, m.y, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_pixels_to_meters_explicit_zoom() -> Result<(), ProjError> {
        let config = ProjectorConfig::from_max_dimension(256.0)?;
        let world_center_z0 = config.pixels_to_meters(Point2D::new(128.0, 128.0), Some(0));
        assert_relative_eq!(world_center_z0.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(world_center_z0.y, 0.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_lat_lon_pixel_roundtrip() -> Result<(), ProjError> {
        let config = ProjectorConfig::from_image_size(5616.0, 3744.0)?;
        let cases = [
            LatLon::new(37.4220, -122.0841),
            LatLon::new(-12.5, 45.25),
            LatLon::new(60.0, 10.0),
            LatLon::new(0.0, 0.0),
        ];
        for ll in cases {
            let back = config.pixels_to_lat_lon(config.lat_lon_to_pixel(ll), None);
            assert_relative_eq!(back.lat, ll.lat, epsilon = 1e-9);
            assert_relative_eq!(back.lon, ll.lon, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_projector_requires_initialization() -> Result<(), ProjError> {
        let mut projector = CoordinateProjector::new();
        let ll = LatLon::new(10.0, 20.0);
        assert_eq!(projector.lat_lon_to_pixel(ll), Err(ProjError::Uninitialized));
        assert_eq!(
            projector.pixels_to_lat_lon(Point2D::new(1.0, 1.0), None),
            Err(ProjError::Uninitialized)
        );

        projector.initialize_from_image_size(1024.0, 768.0)?;
        assert_eq!(projector.config()?.max_zoom(), 5);
        let px = projector.lat_lon_to_pixel(ll)?;
        let back = projector.pixels_to_lat_lon(px, None)?;
        assert_relative_eq!(back.lat, ll.lat, epsilon = 1e-9);

        // a failed reload keeps the previous image's config
        assert!(projector.initialize(0.0).is_err());
        assert_eq!(projector.config()?.max_zoom(), 5);
        Ok(())
    }
}
