use serde::{Deserialize, Serialize};

/// Index of a map tile at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column, increasing east.
    pub x: i64,
    /// Row, increasing south.
    pub y: i64,
}

impl TileCoord {
    /// Create a new tile index.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Bring a tile index into the valid range of a zoom level.
///
/// With `2^zoom` tiles per axis, the column wraps around the antimeridian
/// while a row outside the map yields `None`. Zoom levels of 63 and above
/// have more tiles than an `i64` can index and also yield `None`.
///
/// # Example
///
/// ```
/// use georef_proj::{normalized_tile, TileCoord};
///
/// assert_eq!(normalized_tile(-1, 2, 3), Some(TileCoord::new(7, 2)));
/// assert_eq!(normalized_tile(0, 8, 3), None);
/// ```
#[must_use]
pub fn normalized_tile(tile_x: i64, tile_y: i64, zoom: u32) -> Option<TileCoord> {
    let tile_range = 1i64.checked_shl(zoom).filter(|range| *range > 0)?;
    if !(0..tile_range).contains(&tile_y) {
        return None;
    }
    Some(TileCoord::new(tile_x.rem_euclid(tile_range), tile_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_columns() {
        assert_eq!(normalized_tile(9, 0, 3), Some(TileCoord::new(1, 0)));
        assert_eq!(normalized_tile(-1, 4, 3), Some(TileCoord::new(7, 4)));
        assert_eq!(normalized_tile(-17, 4, 3), Some(TileCoord::new(7, 4)));
    }

    #[test]
    fn test_rows_out_of_range() {
        assert_eq!(normalized_tile(0, 8, 3), None);
        assert_eq!(normalized_tile(0, -1, 3), None);
        assert_eq!(normalized_tile(0, 1, 0), None);
    }

    #[test]
    fn test_zoom_limit() {
        let last = (1i64 << 62) - 1;
        assert_eq!(normalized_tile(-1, last, 62), Some(TileCoord::new(last, last)));
        assert_eq!(normalized_tile(0, 0, 63), None);
        assert_eq!(normalized_tile(0, 0, 64), None);
        assert_eq!(normalized_tile(0, 0, u32::MAX), None);
    }

    #[test]
    fn test_passthrough() {
        for x in 0..8 {
            for y in 0..8 {
                assert_eq!(normalized_tile(x, y, 3), Some(TileCoord::new(x, y)));
            }
        }
        assert_eq!(normalized_tile(0, 0, 0), Some(TileCoord::new(0, 0)));
    }
}
