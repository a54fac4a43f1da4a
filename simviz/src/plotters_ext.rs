use plotters::element::{Drawable, PointCollection};
use plotters::style::{Color, ShapeStyle, BLACK};
use plotters_backend::{BackendCoord, DrawingBackend, DrawingErrorKind};

use crate::tile::{Tile, GOLD, GREY};

// Map tile element, spanning the square between two corners
pub struct TileGlyph<Coord> {
    corners: [Coord; 2],
    tile: Tile,
}

impl<Coord> TileGlyph<Coord> {
    pub fn new(upper_left: Coord, bottom_right: Coord, tile: Tile) -> Self {
        Self {
            corners: [upper_left, bottom_right],
            tile: tile,
        }
    }
}

impl<'a, Coord> PointCollection<'a, Coord> for &'a TileGlyph<Coord> {
    type Point = &'a Coord;
    type IntoIter = &'a [Coord];
    fn point_iter(self) -> &'a [Coord] {
        &self.corners
    }
}

impl<Coord, DB: DrawingBackend> Drawable<DB> for TileGlyph<Coord> {
    fn draw<I: Iterator<Item = BackendCoord>>(
        &self,
        mut points: I,
        backend: &mut DB,
        _: (u32, u32),
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let (a, b) = match (points.next(), points.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Ok(()),
        };
        let outline = Into::<ShapeStyle>::into(&BLACK);

        match self.tile {
            Tile::Path => backend.draw_rect(a, b, &outline, false),
            Tile::Wall => backend.draw_rect(a, b, &GREY.filled(), true),
            Tile::Gold => {
                backend.draw_rect(a, b, &outline, false)?;
                // coin inset by a fifth of the tile on every side
                let size = (b.0 - a.0).min(b.1 - a.1);
                let inset = size / 5;
                let center = ((a.0 + b.0) / 2, (a.1 + b.1) / 2);
                let radius = ((size - 2 * inset) / 2).max(0) as u32;
                backend.draw_circle(center, radius, &GOLD.filled(), true)
            }
            Tile::Robot => {
                backend.draw_rect(a, b, &outline, false)?;
                backend.draw_rect(a, b, &BLACK.filled(), true)
            }
            Tile::Unknown(_) => Ok(()),
        }
    }
}
