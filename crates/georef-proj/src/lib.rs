#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Conversions between geographic coordinates, spherical Web-Mercator meters
//! (EPSG:3857) and the pixel grid of a 256-pixel tile pyramid. Pixel
//! conversions depend on the maximum zoom level of the loaded overlay image,
//! carried explicitly by [`ProjectorConfig`].

mod config;
mod error;
mod mercator;
mod tile;

pub use config::{CoordinateProjector, ProjectorConfig};
pub use error::ProjError;
pub use mercator::{
    lat_lon_to_meters, meters_to_lat_lon, resolution, LatLon, EARTH_RADIUS, INITIAL_RESOLUTION,
    MIN_ZOOM_OFFSET, ORIGIN_SHIFT, TILE_SIZE,
};
pub use tile::{normalized_tile, TileCoord};
