use bracket_geometry::prelude::{Bresenham, Point};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, field_of_view};

use super::Grid;

/// True when every cell after `from` on the Bresenham line up to and including
/// `to` is open floor.
pub fn line_of_sight(grid: &Grid, from: Point, to: Point) -> bool {
    if from == to {
        return true;
    }
    Bresenham::new(from, to)
        .skip(1)
        .all(|point| grid.is_open(point))
        && grid.is_open(to)
}

struct SightView<'a> {
    grid: &'a Grid,
}

impl BaseMap for SightView<'_> {
    fn is_opaque(&self, idx: usize) -> bool {
        self.grid.cells()[idx].hardness > 0
    }
}

impl Algorithm2D for SightView<'_> {
    fn dimensions(&self) -> Point {
        Point::new(self.grid.width(), self.grid.height())
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.grid.in_bounds(point)
    }
}

/// Cells lit from `origin` within `radius`.
pub fn visible_cells(grid: &Grid, origin: Point, radius: i32) -> Vec<Point> {
    let view = SightView { grid };
    field_of_view(origin, radius, &view)
        .into_iter()
        .filter(|point| grid.in_bounds(*point))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{IMMUTABLE_HARDNESS, Terrain};

    fn corridor() -> Grid {
        let mut grid = Grid::new(20, 5);
        for x in 1..19 {
            grid.carve(Point::new(x, 2), Terrain::Corridor);
        }
        grid
    }

    #[test]
    fn sees_down_an_open_corridor() {
        let grid = corridor();
        assert!(line_of_sight(&grid, Point::new(1, 2), Point::new(18, 2)));
        assert!(line_of_sight(&grid, Point::new(18, 2), Point::new(1, 2)));
        assert!(line_of_sight(&grid, Point::new(4, 2), Point::new(4, 2)));
    }

    #[test]
    fn rock_blocks_sight() {
        let mut grid = corridor();
        grid.set_hardness(Point::new(10, 2), 90);
        assert!(!line_of_sight(&grid, Point::new(1, 2), Point::new(18, 2)));
        grid.set_hardness(Point::new(10, 2), IMMUTABLE_HARDNESS);
        assert!(!line_of_sight(&grid, Point::new(18, 2), Point::new(1, 2)));
        assert!(line_of_sight(&grid, Point::new(1, 2), Point::new(9, 2)));
    }

    #[test]
    fn field_of_view_stays_on_board() {
        let grid = corridor();
        let visible = visible_cells(&grid, Point::new(5, 2), 3);
        assert!(visible.contains(&Point::new(8, 2)));
        assert!(!visible.contains(&Point::new(12, 2)));
        assert!(visible.iter().all(|point| grid.in_bounds(*point)));
    }
}
