//! Map and tile types.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::sim::{ProvinceId, Resource, TerrainId};

/// A coordinate on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// The neighbouring coordinate in `direction`, if it lies on a
    /// `width` × `height` map.
    #[must_use]
    #[inline]
    pub fn neighbor(self, direction: Direction, width: u16, height: u16) -> Option<Coord> {
        let (dx, dy) = direction.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(Coord::new(x, y))
    }
}

/// One of the eight compass directions. North is towards row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up.
    North,
    /// Up and right.
    NorthEast,
    /// Right.
    East,
    /// Down and right.
    SouthEast,
    /// Down.
    South,
    /// Down and left.
    SouthWest,
    /// Left.
    West,
    /// Up and left.
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Column and row offset.
    #[must_use]
    pub const fn offset(self) -> (i16, i16) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// The border flag for this direction.
    #[must_use]
    pub const fn flag(self) -> BorderFlags {
        match self {
            Direction::North => BorderFlags::NORTH,
            Direction::NorthEast => BorderFlags::NORTH_EAST,
            Direction::East => BorderFlags::EAST,
            Direction::SouthEast => BorderFlags::SOUTH_EAST,
            Direction::South => BorderFlags::SOUTH,
            Direction::SouthWest => BorderFlags::SOUTH_WEST,
            Direction::West => BorderFlags::WEST,
            Direction::NorthWest => BorderFlags::NORTH_WEST,
        }
    }
}

bitflags! {
    /// Directions in which a tile touches another province.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct BorderFlags: u8 {
        /// Border to the north.
        const NORTH = 1 << 0;
        /// Border to the north-east.
        const NORTH_EAST = 1 << 1;
        /// Border to the east.
        const EAST = 1 << 2;
        /// Border to the south-east.
        const SOUTH_EAST = 1 << 3;
        /// Border to the south.
        const SOUTH = 1 << 4;
        /// Border to the south-west.
        const SOUTH_WEST = 1 << 5;
        /// Border to the west.
        const WEST = 1 << 6;
        /// Border to the north-west.
        const NORTH_WEST = 1 << 7;
    }
}

/// A single tile on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain type.
    pub terrain: TerrainId,
    /// Resource on this tile, if any.
    pub resource: Option<Resource>,
    /// Whether the resource has been discovered.
    pub prospected: bool,
    /// Province this tile belongs to (back-reference, not ownership).
    pub province: Option<ProvinceId>,
    /// Directions in which this tile borders another province.
    pub borders: BorderFlags,
    /// River marker.
    pub river: bool,
    /// Road or trail marker.
    pub pathway: bool,
}

impl Tile {
    /// Create a bare tile of the given terrain.
    #[must_use]
    pub const fn new(terrain: TerrainId) -> Self {
        Self {
            terrain,
            resource: None,
            prospected: false,
            province: None,
            borders: BorderFlags::empty(),
            river: false,
            pathway: false,
        }
    }

    /// Create a tile carrying a resource.
    #[must_use]
    pub const fn with_resource(terrain: TerrainId, resource: Resource, prospected: bool) -> Self {
        let mut tile = Self::new(terrain);
        tile.resource = Some(resource);
        tile.prospected = prospected;
        tile
    }
}

/// The world map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldMap {
    /// Width of the map in tiles.
    width: u16,
    /// Height of the map in tiles.
    height: u16,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
}

impl WorldMap {
    /// Create a new map filled with `terrain`.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16, terrain: TerrainId) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            tiles: vec![Tile::new(terrain); size],
        })
    }

    /// Get the width of the map.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the map.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw tiles in row-major order.
    #[must_use]
    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Check if a coordinate is within the map bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn coord_to_index(&self, coord: Coord) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
    }

    /// Get a reference to the tile at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.coord_to_index(coord).map(|idx| &self.tiles[idx])
    }

    /// Get a mutable reference to the tile at the given coordinate.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.coord_to_index(coord).map(|idx| &mut self.tiles[idx])
    }

    /// Set the tile at the given coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, coord: Coord, tile: Tile) -> bool {
        if let Some(idx) = self.coord_to_index(coord) {
            self.tiles[idx] = tile;
            true
        } else {
            false
        }
    }

    /// The tile next to `coord` in `direction`, with its coordinate.
    #[must_use]
    pub fn neighbor(&self, coord: Coord, direction: Direction) -> Option<(Coord, &Tile)> {
        let next = coord.neighbor(direction, self.width, self.height)?;
        self.get(next).map(|tile| (next, tile))
    }

    /// Iterate over all coordinates and tiles.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        let width = usize::from(self.width);
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            // Both quotients are bounded by u16 dimensions.
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, tile)
        })
    }

    /// Tiles assigned to `province`.
    pub fn tiles_of(&self, province: ProvinceId) -> impl Iterator<Item = (Coord, &Tile)> {
        self.iter()
            .filter(move |(_, tile)| tile.province == Some(province))
    }
}
