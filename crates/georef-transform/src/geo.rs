//! Compositions of a fitted transform with the Web-Mercator projection.

use georef_linalg::Point2D;
use georef_proj::{meters_to_lat_lon, CoordinateProjector, LatLon};

use crate::error::TransformError;
use crate::transform::Transform;

/// Map an image pixel to a geographic position.
///
/// The transform is expected to output Web-Mercator meters.
pub fn forward_pixel_to_lat_lon(transform: &Transform, pixel: Point2D) -> LatLon {
    meters_to_lat_lon(transform.forward(pixel))
}

/// Map a position on the overlay's own pixel grid, addressed by lat/lon, to
/// its georeferenced position.
///
/// Positive longitudes are shifted by -360 degrees first so that points east
/// of the image-space antimeridian project onto the overlay.
///
/// # Errors
///
/// Returns [`TransformError::Proj`] if the projector has no image loaded.
pub fn forward_lat_lon(
    transform: &Transform,
    projector: &CoordinateProjector,
    lat_lon: LatLon,
) -> Result<LatLon, TransformError> {
    let lat_lon = if lat_lon.lon > 0.0 {
        LatLon::new(lat_lon.lat, lat_lon.lon - 360.0)
    } else {
        lat_lon
    };
    let pixel = projector.lat_lon_to_pixel(lat_lon)?;
    Ok(forward_pixel_to_lat_lon(transform, pixel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Affine, TransformModel};
    use approx::assert_relative_eq;
    use georef_proj::{lat_lon_to_meters, ProjError};

    #[test]
    fn test_pixel_to_lat_lon() -> Result<(), TransformError> {
        // 10 m per pixel, north up, anchored on a known position
        let anchor = lat_lon_to_meters(LatLon::new(40.0, -105.0));
        let t: Transform =
            Affine::from_params(&[10.0, 0.0, anchor.x, 0.0, -10.0, anchor.y])?.into();

        let ll = forward_pixel_to_lat_lon(&t, Point2D::new(0.0, 0.0));
        assert_relative_eq!(ll.lat, 40.0, epsilon = 1e-9);
        assert_relative_eq!(ll.lon, -105.0, epsilon = 1e-9);

        let south_east = forward_pixel_to_lat_lon(&t, Point2D::new(100.0, 100.0));
        assert!(south_east.lat < 40.0);
        assert!(south_east.lon > -105.0);
        Ok(())
    }

    #[test]
    fn test_forward_lat_lon_wraps_longitude() -> Result<(), TransformError> {
        let identity: Transform = Affine::from_params(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0])?.into();
        let mut projector = CoordinateProjector::new();
        assert!(matches!(
            forward_lat_lon(&identity, &projector, LatLon::new(0.0, 0.0)),
            Err(TransformError::Proj(ProjError::Uninitialized))
        ));

        projector.initialize_from_image_size(4096.0, 2048.0)?;
        let config = *projector.config()?;
        // an identity transform maps the overlay pixel back into meters at
        // the pixel's numeric value; compare both longitudes on that basis
        let east = forward_lat_lon(&identity, &projector, LatLon::new(10.0, 20.0))?;
        let expected = forward_pixel_to_lat_lon(
            &identity,
            config.lat_lon_to_pixel(LatLon::new(10.0, -340.0)),
        );
        assert_relative_eq!(east.lat, expected.lat, epsilon = 1e-12);
        assert_relative_eq!(east.lon, expected.lon, epsilon = 1e-12);

        let west = forward_lat_lon(&identity, &projector, LatLon::new(10.0, -20.0))?;
        let expected = forward_pixel_to_lat_lon(
            &identity,
            config.lat_lon_to_pixel(LatLon::new(10.0, -20.0)),
        );
        assert_relative_eq!(west.lon, expected.lon, epsilon = 1e-12);
        Ok(())
    }
}
