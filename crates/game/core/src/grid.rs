//! Walkability grid for one floor.
//!
//! [`GridMap`] is rebuilt from every snapshot; nothing in the agent keeps a
//! reference to one across ticks, since the dungeon can regenerate between
//! floors and lives.

use crate::error::SnapshotError;
use crate::geometry::{CellPos, WorldPoint};

/// Kind of a single grid cell, as encoded by the game (0/1/2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
#[strum(serialize_all = "snake_case")]
pub enum CellKind {
    #[default]
    Floor,
    Wall,
    Door,
}

impl CellKind {
    /// Floors and doors can be walked on; walls cannot.
    pub fn is_walkable(self) -> bool {
        matches!(self, CellKind::Floor | CellKind::Door)
    }

    fn from_glyph(glyph: char) -> Result<Self, SnapshotError> {
        match glyph {
            '.' => Ok(CellKind::Floor),
            '#' => Ok(CellKind::Wall),
            '+' => Ok(CellKind::Door),
            other => Err(SnapshotError::UnknownGlyph(other)),
        }
    }
}

impl TryFrom<u8> for CellKind {
    type Error = SnapshotError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CellKind::Floor),
            1 => Ok(CellKind::Wall),
            2 => Ok(CellKind::Door),
            other => Err(SnapshotError::UnknownCell(other)),
        }
    }
}

impl From<CellKind> for u8 {
    fn from(kind: CellKind) -> u8 {
        match kind {
            CellKind::Floor => 0,
            CellKind::Wall => 1,
            CellKind::Door => 2,
        }
    }
}

/// Rectangular cell grid with a fixed world-space cell size.
///
/// Cells are stored row-major; row `y` spans world `z` in
/// `[y * cell_size, (y + 1) * cell_size)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "GridRepr", into = "GridRepr")
)]
pub struct GridMap {
    width: usize,
    height: usize,
    cell_size: f32,
    cells: Vec<CellKind>,
}

/// Wire shape of a grid: nested rows plus the cell size.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct GridRepr {
    cells: Vec<Vec<CellKind>>,
    cell_size: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<GridRepr> for GridMap {
    type Error = SnapshotError;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        GridMap::from_rows(repr.cells, repr.cell_size)
    }
}

#[cfg(feature = "serde")]
impl From<GridMap> for GridRepr {
    fn from(grid: GridMap) -> Self {
        let cells = grid.cells.chunks(grid.width).map(<[_]>::to_vec).collect();
        GridRepr {
            cells,
            cell_size: grid.cell_size,
        }
    }
}

impl GridMap {
    /// Builds a grid from rows of cells.
    ///
    /// Rejects empty and ragged grids and non-positive cell sizes.
    pub fn from_rows(rows: Vec<Vec<CellKind>>, cell_size: f32) -> Result<Self, SnapshotError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SnapshotError::InvalidCellSize(cell_size));
        }
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(SnapshotError::EmptyGrid);
        }
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(SnapshotError::RaggedGrid {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }
        Ok(Self {
            width,
            height,
            cell_size,
            cells,
        })
    }

    /// Builds a grid from ASCII art: `.` floor, `#` wall, `+` door.
    ///
    /// Handy for fixtures and for replaying hand-written scenarios.
    pub fn from_ascii(lines: &[&str], cell_size: f32) -> Result<Self, SnapshotError> {
        let rows = lines
            .iter()
            .map(|line| {
                line.chars()
                    .map(CellKind::from_glyph)
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows, cell_size)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn contains(&self, cell: CellPos) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.height
    }

    /// Cell kind at `cell`, or `None` outside the grid.
    pub fn kind(&self, cell: CellPos) -> Option<CellKind> {
        if self.contains(cell) {
            Some(self.cells[cell.y as usize * self.width + cell.x as usize])
        } else {
            None
        }
    }

    /// Walkability test: inside the grid and a floor or door cell.
    pub fn is_walkable(&self, cell: CellPos) -> bool {
        self.kind(cell).is_some_and(CellKind::is_walkable)
    }

    /// Number of the eight surrounding cells that block movement.
    ///
    /// Cells outside the grid count as walls.
    pub fn adjacent_wall_count(&self, cell: CellPos) -> u8 {
        cell.neighbors8()
            .filter(|&n| !self.is_walkable(n))
            .count() as u8
    }

    /// Cell containing the world point.
    pub fn world_to_grid(&self, point: WorldPoint) -> CellPos {
        CellPos::new(
            (point.x / self.cell_size).floor() as i32,
            (point.z / self.cell_size).floor() as i32,
        )
    }

    /// World-space center of the cell.
    pub fn grid_to_world(&self, cell: CellPos) -> WorldPoint {
        WorldPoint::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Every cell with its kind, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (CellPos, CellKind)> + '_ {
        self.cells.iter().enumerate().map(|(i, &kind)| {
            let pos = CellPos::new((i % self.width) as i32, (i / self.width) as i32);
            (pos, kind)
        })
    }

    /// Walkable cells, row-major.
    pub fn walkable_cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        self.cells()
            .filter(|(_, kind)| kind.is_walkable())
            .map(|(pos, _)| pos)
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|kind| kind.is_walkable()).count()
    }
}
