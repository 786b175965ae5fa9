pub mod distance;
pub mod generator;
pub mod persistence;
pub mod sight;

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use specs::Entity;

use crate::data::dice::roll_between;

pub use distance::FieldKind;

pub const IMMUTABLE_HARDNESS: u8 = 255;
pub const DEFAULT_ROCK_HARDNESS: u8 = 200;
/// Hardness removed from a rock cell by one turn of tunneling.
pub const DIG_DECREMENT: u8 = 85;
pub const UNREACHABLE: u32 = u32::MAX;

/// Scan order used wherever the original board walked a cell's surroundings:
/// south, south-west, south-east, north, north-east, north-west, east, west.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (-1, 1),
    (1, 1),
    (0, -1),
    (1, -1),
    (-1, -1),
    (1, 0),
    (-1, 0),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    Room,
    Corridor,
    Rock,
    UpStair,
    DownStair,
}

impl Terrain {
    pub fn glyph(&self) -> char {
        match self {
            Terrain::Room => '.',
            Terrain::Corridor => '#',
            Terrain::Rock => ' ',
            Terrain::UpStair => '<',
            Terrain::DownStair => '>',
        }
    }

    pub fn is_stair(&self) -> bool {
        matches!(self, Terrain::UpStair | Terrain::DownStair)
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub point: Point,
    pub hardness: u8,
    pub terrain: Terrain,
    pub tunneling_distance: u32,
    pub non_tunneling_distance: u32,
    /// Back-reference only; the actor table owns the monster.
    pub monster: Option<Entity>,
    pub object: Option<Entity>,
}

impl Cell {
    fn rock(point: Point, hardness: u8) -> Self {
        Self {
            point,
            hardness,
            terrain: Terrain::Rock,
            tunneling_distance: UNREACHABLE,
            non_tunneling_distance: UNREACHABLE,
            monster: None,
            object: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.hardness == 0
    }

    pub fn is_immutable(&self) -> bool {
        self.hardness == IMMUTABLE_HARDNESS
    }

    pub fn distance(&self, kind: FieldKind) -> u32 {
        match kind {
            FieldKind::Tunneling => self.tunneling_distance,
            FieldKind::NonTunneling => self.non_tunneling_distance,
        }
    }
}

/// Inclusive rectangle of room floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Room {
    pub start: Point,
    pub end: Point,
    pub explored: bool,
}

impl Room {
    pub fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            start: Point::new(x, y),
            end: Point::new(x + width - 1, y + height - 1),
            explored: false,
        }
    }

    pub fn width(&self) -> i32 {
        self.end.x - self.start.x + 1
    }

    pub fn height(&self) -> i32 {
        self.end.y - self.start.y + 1
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.start.x + (self.end.x - self.start.x) / 2,
            self.start.y + (self.end.y - self.start.y) / 2,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.start.x..=self.end.x).contains(&point.x)
            && (self.start.y..=self.end.y).contains(&point.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::with_exact(self.start.x, self.start.y, self.end.x, self.end.y)
    }

    /// True when `other` touches this room or the one-cell ring of rock around it.
    pub fn crowds(&self, other: &Room) -> bool {
        let padded = Rect::with_exact(
            self.start.x - 1,
            self.start.y - 1,
            self.end.x + 1,
            self.end.y + 1,
        );
        padded.intersect(&other.rect())
    }

    pub fn random_point(&self, rng: &mut RandomNumberGenerator) -> Point {
        Point::new(
            roll_between(rng, self.start.x, self.end.x),
            roll_between(rng, self.start.y, self.end.y),
        )
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (self.start.y..=self.end.y)
            .flat_map(move |y| (self.start.x..=self.end.x).map(move |x| Point::new(x, y)))
    }
}

/// What a single dig did to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigOutcome {
    AlreadyOpen,
    Immutable,
    Weakened { remaining: u8 },
    Broken,
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    pub rooms: Vec<Room>,
}

impl Grid {
    /// Solid board: interior rock of default hardness inside an immutable ring.
    pub fn new(width: i32, height: i32) -> Self {
        let mut cells = Vec::with_capacity((width * height).max(0) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::rock(Point::new(x, y), DEFAULT_ROCK_HARDNESS));
            }
        }
        let mut grid = Self {
            width,
            height,
            cells,
            rooms: Vec::new(),
        };
        grid.seal_border();
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn point_at(&self, idx: usize) -> Point {
        let idx = idx as i32;
        Point::new(idx % self.width, idx / self.width)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn is_border(&self, point: Point) -> bool {
        self.in_bounds(point)
            && (point.x == 0
                || point.y == 0
                || point.x == self.width - 1
                || point.y == self.height - 1)
    }

    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.idx(point).map(|idx| &self.cells[idx])
    }

    pub fn cell_mut(&mut self, point: Point) -> Option<&mut Cell> {
        self.idx(point).map(move |idx| &mut self.cells[idx])
    }

    /// Out-of-bounds reads as immutable.
    pub fn hardness(&self, point: Point) -> u8 {
        self.cell(point)
            .map_or(IMMUTABLE_HARDNESS, |cell| cell.hardness)
    }

    pub fn is_open(&self, point: Point) -> bool {
        self.hardness(point) == 0
    }

    pub fn terrain(&self, point: Point) -> Option<Terrain> {
        self.cell(point).map(|cell| cell.terrain)
    }

    /// Sets raw hardness, keeping terrain consistent: open cells become corridor,
    /// anything harder becomes rock. Stairs and room floor keep their terrain when
    /// left open.
    pub fn set_hardness(&mut self, point: Point, hardness: u8) {
        if let Some(cell) = self.cell_mut(point) {
            cell.hardness = hardness;
            if hardness > 0 {
                cell.terrain = Terrain::Rock;
            } else if cell.terrain == Terrain::Rock {
                cell.terrain = Terrain::Corridor;
            }
        }
    }

    /// Opens a cell as the given terrain. The border ring is never carved.
    pub fn carve(&mut self, point: Point, terrain: Terrain) -> bool {
        if self.is_border(point) {
            return false;
        }
        match self.cell_mut(point) {
            Some(cell) => {
                cell.hardness = 0;
                cell.terrain = terrain;
                true
            }
            None => false,
        }
    }

    pub fn seal_border(&mut self) {
        for idx in 0..self.cells.len() {
            let point = self.cells[idx].point;
            if self.is_border(point) {
                let cell = &mut self.cells[idx];
                cell.hardness = IMMUTABLE_HARDNESS;
                cell.terrain = Terrain::Rock;
            }
        }
    }

    pub fn add_room(&mut self, room: Room) {
        for point in room.points() {
            self.carve(point, Terrain::Room);
        }
        self.rooms.push(room);
    }

    /// One turn of tunneling against `point`.
    pub fn dig(&mut self, point: Point, amount: u8) -> DigOutcome {
        let Some(cell) = self.cell_mut(point) else {
            return DigOutcome::Immutable;
        };
        if cell.is_immutable() {
            return DigOutcome::Immutable;
        }
        if cell.is_open() {
            return DigOutcome::AlreadyOpen;
        }
        let remaining = cell.hardness.saturating_sub(amount);
        if remaining == 0 {
            cell.hardness = 0;
            cell.terrain = Terrain::Corridor;
            DigOutcome::Broken
        } else {
            cell.hardness = remaining;
            DigOutcome::Weakened { remaining }
        }
    }

    pub fn room_index_containing(&self, point: Point) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(point))
    }

    pub fn open_points(&self) -> Vec<Point> {
        self.cells
            .iter()
            .filter(|cell| cell.is_open())
            .map(|cell| cell.point)
            .collect()
    }

    /// In-bounds 8-way neighbours in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| Point::new(point.x + dx, point.y + dy))
            .filter(move |neighbor| self.in_bounds(*neighbor))
    }

    pub fn monster_at(&self, point: Point) -> Option<Entity> {
        self.cell(point).and_then(|cell| cell.monster)
    }

    pub fn set_monster(&mut self, point: Point, monster: Option<Entity>) {
        if let Some(cell) = self.cell_mut(point) {
            cell.monster = monster;
        }
    }

    pub fn object_at(&self, point: Point) -> Option<Entity> {
        self.cell(point).and_then(|cell| cell.object)
    }

    pub fn set_object(&mut self, point: Point, object: Option<Entity>) {
        if let Some(cell) = self.cell_mut(point) {
            cell.object = object;
        }
    }

    pub fn distance(&self, point: Point, kind: FieldKind) -> u32 {
        self.cell(point)
            .map_or(UNREACHABLE, |cell| cell.distance(kind))
    }

    pub(crate) fn store_distances(&mut self, kind: FieldKind, values: &[u32]) {
        for (cell, &value) in self.cells.iter_mut().zip(values) {
            match kind {
                FieldKind::Tunneling => cell.tunneling_distance = value,
                FieldKind::NonTunneling => cell.non_tunneling_distance = value,
            }
        }
    }
}
