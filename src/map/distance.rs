use std::{cmp::Reverse, collections::BinaryHeap};

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg};
use smallvec::SmallVec;
use tracing::trace;

use super::{Grid, UNREACHABLE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Only open cells are passable and every step costs 1.
    NonTunneling,
    /// Any mutable cell is passable at a hardness-dependent cost.
    Tunneling,
}

impl FieldKind {
    pub const ALL: [FieldKind; 2] = [FieldKind::NonTunneling, FieldKind::Tunneling];

    /// Cost of stepping into a cell of the given hardness, `None` when impassable.
    pub fn entry_cost(self, hardness: u8) -> Option<u32> {
        match self {
            FieldKind::NonTunneling => (hardness == 0).then_some(1),
            FieldKind::Tunneling => tunneling_cost(hardness),
        }
    }
}

/// Open cells cost the same as the softest rock tier.
pub fn tunneling_cost(hardness: u8) -> Option<u32> {
    match hardness {
        0..=84 => Some(1),
        85..=170 => Some(2),
        171..=254 => Some(3),
        _ => None,
    }
}

/// Pathing view of the grid under one passability rule.
pub struct FieldView<'a> {
    grid: &'a Grid,
    kind: FieldKind,
}

impl<'a> FieldView<'a> {
    pub fn new(grid: &'a Grid, kind: FieldKind) -> Self {
        Self { grid, kind }
    }
}

impl BaseMap for FieldView<'_> {
    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let point = self.grid.point_at(idx);
        self.grid
            .neighbors(point)
            .filter_map(|neighbor| {
                let cost = self.kind.entry_cost(self.grid.hardness(neighbor))?;
                Some((self.grid.idx(neighbor)?, cost as f32))
            })
            .collect()
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Chebyshev.distance2d(p1, p2)
    }
}

impl Algorithm2D for FieldView<'_> {
    fn dimensions(&self) -> Point {
        Point::new(self.grid.width(), self.grid.height())
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.grid.in_bounds(point)
    }
}

/// Single-source shortest distances from `source` under `kind`.
pub fn compute(grid: &Grid, source: Point, kind: FieldKind) -> Vec<u32> {
    let view = FieldView::new(grid, kind);
    shortest_paths(&view, grid.cells().len(), grid.idx(source))
}

/// Dijkstra over the map's exits. Decrease-key is done by pushing the improved
/// entry and skipping stale ones as they surface.
fn shortest_paths<M: BaseMap>(map: &M, len: usize, source: Option<usize>) -> Vec<u32> {
    let mut distances = vec![UNREACHABLE; len];
    let Some(source) = source else {
        return distances;
    };
    distances[source] = 0;
    let mut frontier = BinaryHeap::new();
    frontier.push(Reverse((0u32, source)));

    while let Some(Reverse((distance, idx))) = frontier.pop() {
        if distance > distances[idx] {
            continue;
        }
        for (next, cost) in map.get_available_exits(idx) {
            let candidate = distance.saturating_add(cost as u32);
            if candidate < distances[next] {
                distances[next] = candidate;
                frontier.push(Reverse((candidate, next)));
            }
        }
    }
    distances
}

/// Recomputes both fields from `source` and stores them on the cells.
pub fn refresh(grid: &mut Grid, source: Point) {
    for kind in FieldKind::ALL {
        let values = compute(grid, source, kind);
        grid.store_distances(kind, &values);
    }
    trace!(x = source.x, y = source.y, "distance fields refreshed");
}

/// Neighbour with the lowest stored distance, if it improves on `from`.
/// Ties keep the first neighbour in scan order.
pub fn downhill_step(grid: &Grid, from: Point, kind: FieldKind) -> Option<Point> {
    let mut best = grid.distance(from, kind);
    let mut step = None;
    for neighbor in grid.neighbors(from) {
        let distance = grid.distance(neighbor, kind);
        if distance < best {
            best = distance;
            step = Some(neighbor);
        }
    }
    step
}
