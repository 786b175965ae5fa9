//! Flat binary dungeon files: a 12-byte marker, big-endian version and total size,
//! the row-major hardness raster, then one `x, y, width, height` byte record per room.

use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::{debug, info};

use super::{Grid, Room, Terrain};
use crate::error::PersistenceError;

pub const FILE_MARKER: &[u8; 12] = b"RLG327-S2017";
pub const FILE_VERSION: u32 = 0;
const HEADER_LEN: usize = 20;
const ROOM_RECORD_LEN: usize = 4;

pub fn encode(grid: &Grid) -> Result<Vec<u8>, PersistenceError> {
    if grid.width() > 255 || grid.height() > 255 {
        return Err(PersistenceError::Unrepresentable {
            width: grid.width(),
            height: grid.height(),
        });
    }
    let total = HEADER_LEN + grid.cells().len() + ROOM_RECORD_LEN * grid.rooms.len();
    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(FILE_MARKER);
    bytes.extend_from_slice(&FILE_VERSION.to_be_bytes());
    bytes.extend_from_slice(&(total as u32).to_be_bytes());
    bytes.extend(grid.cells().iter().map(|cell| cell.hardness));
    for room in &grid.rooms {
        bytes.extend_from_slice(&[
            room.start.x as u8,
            room.start.y as u8,
            room.width() as u8,
            room.height() as u8,
        ]);
    }
    Ok(bytes)
}

/// Rebuilds a grid of the given size. Open cells come back as corridor and room
/// rectangles are repainted; stairs are not stored and must be placed again.
pub fn decode(bytes: &[u8], width: i32, height: i32) -> Result<Grid, PersistenceError> {
    if bytes.len() < HEADER_LEN {
        return Err(PersistenceError::Truncated {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let (marker, rest) = bytes.split_at(FILE_MARKER.len());
    if marker != FILE_MARKER {
        return Err(PersistenceError::BadMarker(
            String::from_utf8_lossy(marker).into_owned(),
        ));
    }
    let version = read_u32(&rest[0..4]);
    if version != FILE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(version));
    }
    let declared = read_u32(&rest[4..8]);
    if declared as usize != bytes.len() {
        return Err(PersistenceError::SizeMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let mut grid = Grid::new(width, height);
    let raster_len = grid.cells().len();
    let raster_end = HEADER_LEN + raster_len;
    if bytes.len() < raster_end {
        return Err(PersistenceError::Truncated {
            expected: raster_end,
            actual: bytes.len(),
        });
    }
    let room_bytes = &bytes[raster_end..];
    if room_bytes.len() % ROOM_RECORD_LEN != 0 {
        return Err(PersistenceError::RoomSection(room_bytes.len()));
    }

    for (idx, &hardness) in bytes[HEADER_LEN..raster_end].iter().enumerate() {
        let point = grid.point_at(idx);
        if hardness == 0 {
            grid.carve(point, Terrain::Corridor);
        } else {
            grid.set_hardness(point, hardness);
        }
    }
    grid.seal_border();

    for (index, record) in room_bytes.chunks_exact(ROOM_RECORD_LEN).enumerate() {
        let room = Room::with_size(
            i32::from(record[0]),
            i32::from(record[1]),
            i32::from(record[2]),
            i32::from(record[3]),
        );
        let inside = room.width() > 0
            && room.height() > 0
            && !grid.is_border(room.start)
            && !grid.is_border(room.end)
            && grid.in_bounds(room.start)
            && grid.in_bounds(room.end);
        if !inside {
            return Err(PersistenceError::RoomOutOfBounds { index });
        }
        grid.add_room(room);
    }
    debug!(rooms = grid.rooms.len(), "decoded dungeon");
    Ok(grid)
}

pub fn save_to_path<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<(), PersistenceError> {
    let bytes = encode(grid)?;
    let mut writer = BufWriter::new(fs::File::create(path.as_ref())?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    info!(path = %path.as_ref().display(), bytes = bytes.len(), "saved dungeon");
    Ok(())
}

pub fn load_from_path<P: AsRef<Path>>(
    path: P,
    width: i32,
    height: i32,
) -> Result<Grid, PersistenceError> {
    let bytes = fs::read(path.as_ref())?;
    let grid = decode(&bytes, width, height)?;
    info!(path = %path.as_ref().display(), rooms = grid.rooms.len(), "loaded dungeon");
    Ok(grid)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_be_bytes(word)
}
