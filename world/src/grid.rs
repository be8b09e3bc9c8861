//! Grid bounds and adjacency helpers.

use rescue_grid_core::CellCoord;

/// Dimensions of the rescue grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
}

impl Grid {
    pub(crate) const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub(crate) const fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) const fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Number of cells in the grid.
    pub(crate) fn capacity(&self) -> usize {
        let capacity_u64 = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(capacity_u64).unwrap_or(0)
    }

    /// Dense row-major index of an in-bounds cell.
    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    /// In-bounds orthogonal neighbours ordered north, east, south, west.
    pub(crate) fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        let column = cell.column();
        let row = cell.row();
        let candidates = [
            row.checked_sub(1).map(|north| CellCoord::new(column, north)),
            column.checked_add(1).map(|east| CellCoord::new(east, row)),
            row.checked_add(1).map(|south| CellCoord::new(column, south)),
            column.checked_sub(1).map(|west| CellCoord::new(west, row)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |candidate| self.contains(*candidate))
    }
}

/// Reports whether two cells share an edge.
pub(crate) fn is_adjacent(a: CellCoord, b: CellCoord) -> bool {
    a.manhattan_distance(b) == 1
}

/// Reports whether `b` is `a` itself or one of its orthogonal neighbours.
pub(crate) fn within_reach(a: CellCoord, b: CellCoord) -> bool {
    a.manhattan_distance(b) <= 1
}
