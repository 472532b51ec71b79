//! The [`Grid`], a square board of [`Cell`]s with explicit adjacency, plus
//! diff-based render frames ([`Frame`], [`compute_frame`]).
//!
//! Cells are stored in a flat arena indexed by `y * rows + x`; the arena
//! index is the cell identity used throughout the workspace. Neighbor lists
//! are cached per cell and go stale whenever obstacles change; callers must
//! call [`Grid::recompute_all_neighbors`] before searching.

use crate::cell::{Cell, CellState};
use crate::geom::Point;

/// A square board of cells.
///
/// The board always has as many columns as rows. Start and end cells are
/// tracked by designation (arena index) in addition to their cell state, so
/// at most one of each can exist and the designation survives the search
/// overwriting the cell's state.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: i32,
    cell_size: i32,
    cells: Vec<Cell>,
    start: Option<usize>,
    end: Option<usize>,
    fresh: bool,
}

impl Grid {
    /// Build a `rows × rows` board for a square display `pixel_width` wide.
    ///
    /// `cell_size` is `pixel_width / rows` with the remainder discarded, so
    /// a few pixels may go unused at the right and bottom edges at high row
    /// counts. Adjacency starts stale.
    pub fn new(rows: i32, pixel_width: i32) -> Self {
        let rows = rows.max(1);
        let mut cells = Vec::with_capacity((rows * rows) as usize);
        for y in 0..rows {
            for x in 0..rows {
                cells.push(Cell::new(Point::new(x, y)));
            }
        }
        Self {
            rows,
            cell_size: pixel_width / rows,
            cells,
            start: None,
            end: None,
            fresh: false,
        }
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Edge length of one cell on the pixel surface.
    #[inline]
    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `p` is a valid cell coordinate.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.rows && p.y < self.rows
    }

    /// Arena index of `p`, or `None` if out of bounds.
    #[inline]
    pub fn idx(&self, p: Point) -> Option<usize> {
        self.contains(p)
            .then(|| (p.y * self.rows + p.x) as usize)
    }

    /// Inverse of [`idx`](Grid::idx).
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        Point::new(idx as i32 % self.rows, idx as i32 / self.rows)
    }

    /// The cell at `p`, or `None` if out of bounds.
    pub fn cell(&self, p: Point) -> Option<&Cell> {
        self.idx(p).map(|i| &self.cells[i])
    }

    /// The cell at an arena index. Panics on an invalid index.
    #[inline]
    pub fn cell_at(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    /// Mutable cell access by arena index. Panics on an invalid index.
    #[inline]
    pub fn cell_at_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    /// The state of the cell at `p`, or `None` if out of bounds.
    pub fn state(&self, p: Point) -> Option<CellState> {
        self.cell(p).map(Cell::state)
    }

    /// Row-major iterator over all cells.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    // -----------------------------------------------------------------------
    // Designations and editing
    // -----------------------------------------------------------------------

    /// Position of the designated start cell, if any.
    pub fn start(&self) -> Option<Point> {
        self.start.map(|i| self.cells[i].pos())
    }

    /// Position of the designated end cell, if any.
    pub fn end(&self) -> Option<Point> {
        self.end.map(|i| self.cells[i].pos())
    }

    /// Arena index of the designated start cell, if any.
    #[inline]
    pub fn start_index(&self) -> Option<usize> {
        self.start
    }

    /// Arena index of the designated end cell, if any.
    #[inline]
    pub fn end_index(&self) -> Option<usize> {
        self.end
    }

    /// Designate the start cell. Refused on obstacles and on the end cell;
    /// a previous start cell is reset to `Default`.
    pub fn set_start(&mut self, p: Point) -> bool {
        let Some(i) = self.idx(p) else { return false };
        if self.cells[i].is_obstacle() || self.end == Some(i) {
            return false;
        }
        if let Some(old) = self.start.replace(i) {
            if old != i {
                self.cells[old].reset();
            }
        }
        self.cells[i].mark_start();
        true
    }

    /// Designate the end cell. Refused on obstacles and on the start cell;
    /// a previous end cell is reset to `Default`.
    pub fn set_end(&mut self, p: Point) -> bool {
        let Some(i) = self.idx(p) else { return false };
        if self.cells[i].is_obstacle() || self.start == Some(i) {
            return false;
        }
        if let Some(old) = self.end.replace(i) {
            if old != i {
                self.cells[old].reset();
            }
        }
        self.cells[i].mark_end();
        true
    }

    /// Paint an obstacle. Refused on the start and end cells. Marks
    /// adjacency stale.
    pub fn set_obstacle(&mut self, p: Point) -> bool {
        let Some(i) = self.idx(p) else { return false };
        if self.start == Some(i) || self.end == Some(i) {
            return false;
        }
        self.cells[i].mark_obstacle();
        self.fresh = false;
        true
    }

    /// Erase a cell back to `Default`, dropping a start/end designation if
    /// the cell carried one. Marks adjacency stale.
    pub fn erase(&mut self, p: Point) {
        let Some(i) = self.idx(p) else { return };
        if self.start == Some(i) {
            self.start = None;
        }
        if self.end == Some(i) {
            self.end = None;
        }
        self.cells[i].reset();
        self.fresh = false;
    }

    /// Reset every cell and drop the start/end designations.
    pub fn clear(&mut self) {
        for c in &mut self.cells {
            c.reset();
            c.neighbors_mut().clear();
        }
        self.start = None;
        self.end = None;
        self.fresh = false;
    }

    /// Reset search markings (`Frontier` / `Visited` / `Path`) to `Default`
    /// and restore the Start/End marks from the designations.
    ///
    /// Obstacles and designations are untouched, so a recomputed adjacency
    /// stays valid across calls.
    pub fn clear_search_markings(&mut self) {
        for c in &mut self.cells {
            if matches!(
                c.state(),
                CellState::Frontier | CellState::Visited | CellState::Path
            ) {
                c.reset();
            }
        }
        self.restore_markers();
    }

    /// Re-mark the designated start/end cells, whose state a finished
    /// search may have overwritten with `Frontier` or `Visited`.
    pub fn restore_markers(&mut self) {
        if let Some(i) = self.start {
            self.cells[i].mark_start();
        }
        if let Some(i) = self.end {
            self.cells[i].mark_end();
        }
    }

    // -----------------------------------------------------------------------
    // Adjacency
    // -----------------------------------------------------------------------

    /// Whether neighbor lists reflect the current obstacle layout.
    #[inline]
    pub fn adjacency_fresh(&self) -> bool {
        self.fresh
    }

    /// Rebuild every cell's neighbor list.
    ///
    /// Obstacle edits invalidate cached adjacency, and the invalidation is
    /// tracked but not repaired automatically: this must run before each
    /// search. Neighbors are collected in down, up, right, left order,
    /// skipping out-of-bounds cells and obstacles.
    pub fn recompute_all_neighbors(&mut self) {
        let obstacle: Vec<bool> = self.cells.iter().map(Cell::is_obstacle).collect();
        let rows = self.rows;
        for i in 0..self.cells.len() {
            let p = self.point(i);
            let mut list = std::mem::take(self.cells[i].neighbors_mut());
            list.clear();
            for n in p.neighbors_4() {
                if n.x < 0 || n.y < 0 || n.x >= rows || n.y >= rows {
                    continue;
                }
                let ni = (n.y * rows + n.x) as usize;
                if !obstacle[ni] {
                    list.push(ni);
                }
            }
            *self.cells[i].neighbors_mut() = list;
        }
        self.fresh = true;
    }

    // -----------------------------------------------------------------------
    // Pixel mapping
    // -----------------------------------------------------------------------

    /// Map a position on the pixel surface to a cell.
    ///
    /// Returns `None` outside the painted `rows * cell_size` square, which
    /// includes the remainder margin left over by the integer division in
    /// [`new`](Grid::new).
    pub fn locate(&self, pixel: Point) -> Option<Point> {
        if self.cell_size <= 0 || pixel.x < 0 || pixel.y < 0 {
            return None;
        }
        let p = Point::new(pixel.x / self.cell_size, pixel.y / self.cell_size);
        self.contains(p).then_some(p)
    }
}

// ---------------------------------------------------------------------------
// Frame / FrameCell / compute_frame
// ---------------------------------------------------------------------------

/// A single cell that changed between two flushed frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameCell {
    pub pos: Point,
    pub state: CellState,
}

/// A set of cell changes to paint (a diff frame).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    pub cells: Vec<FrameCell>,
    pub rows: i32,
}

impl Frame {
    /// A frame painting every cell, for the initial draw and full repaints.
    pub fn full(grid: &Grid) -> Frame {
        Frame {
            cells: grid
                .iter()
                .map(|c| FrameCell {
                    pos: c.pos(),
                    state: c.state(),
                })
                .collect(),
            rows: grid.rows(),
        }
    }
}

/// Diff the grid against a previous state snapshot.
///
/// `prev` must hold one state per cell in arena order; only cells whose
/// state differs are emitted.
pub fn compute_frame(prev: &[CellState], grid: &Grid) -> Frame {
    let mut cells = Vec::new();
    for (i, c) in grid.iter().enumerate() {
        if prev.get(i).copied() != Some(c.state()) {
            cells.push(FrameCell {
                pos: c.pos(),
                state: c.state(),
            });
        }
    }
    Frame {
        cells,
        rows: grid.rows(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_cell_size_truncation() {
        let g = Grid::new(25, 600);
        assert_eq!(g.rows(), 25);
        assert_eq!(g.cell_size(), 24);
        assert_eq!(g.len(), 625);

        // 600 / 7 = 85, leaving a 5 pixel margin.
        let g = Grid::new(7, 600);
        assert_eq!(g.cell_size(), 85);
    }

    #[test]
    fn idx_point_round_trip() {
        let g = Grid::new(4, 400);
        for i in 0..g.len() {
            assert_eq!(g.idx(g.point(i)), Some(i));
        }
        assert_eq!(g.idx(Point::new(3, 2)), Some(11));
        assert_eq!(g.idx(Point::new(4, 0)), None);
        assert_eq!(g.idx(Point::new(0, -1)), None);
    }

    #[test]
    fn at_most_one_start_and_end() {
        let mut g = Grid::new(5, 500);
        assert!(g.set_start(Point::new(0, 0)));
        assert!(g.set_start(Point::new(1, 1)));
        assert_eq!(g.state(Point::new(0, 0)), Some(CellState::Default));
        assert_eq!(g.start(), Some(Point::new(1, 1)));

        assert!(g.set_end(Point::new(2, 2)));
        assert!(g.set_end(Point::new(3, 3)));
        assert_eq!(g.state(Point::new(2, 2)), Some(CellState::Default));
        assert_eq!(g.end(), Some(Point::new(3, 3)));

        let starts = g.iter().filter(|c| c.is_start()).count();
        let ends = g.iter().filter(|c| c.is_end()).count();
        assert_eq!((starts, ends), (1, 1));
    }

    #[test]
    fn designations_and_obstacles_exclude_each_other() {
        let mut g = Grid::new(5, 500);
        g.set_start(Point::new(0, 0));
        g.set_end(Point::new(4, 4));

        // No obstacle over a marker, no marker over an obstacle.
        assert!(!g.set_obstacle(Point::new(0, 0)));
        assert!(!g.set_obstacle(Point::new(4, 4)));
        assert!(g.set_obstacle(Point::new(2, 2)));
        assert!(!g.set_start(Point::new(2, 2)));
        assert!(!g.set_end(Point::new(2, 2)));

        // Start and end may not share a cell.
        assert!(!g.set_end(Point::new(0, 0)));
    }

    #[test]
    fn erase_clears_designation() {
        let mut g = Grid::new(3, 300);
        g.set_start(Point::new(0, 0));
        g.erase(Point::new(0, 0));
        assert_eq!(g.start(), None);
        assert_eq!(g.state(Point::new(0, 0)), Some(CellState::Default));
    }

    #[test]
    fn obstacle_edits_mark_adjacency_stale() {
        let mut g = Grid::new(3, 300);
        assert!(!g.adjacency_fresh());
        g.recompute_all_neighbors();
        assert!(g.adjacency_fresh());
        g.set_obstacle(Point::new(1, 1));
        assert!(!g.adjacency_fresh());
        g.recompute_all_neighbors();
        assert!(g.adjacency_fresh());
        g.erase(Point::new(1, 1));
        assert!(!g.adjacency_fresh());
    }

    #[test]
    fn neighbor_lists_follow_down_up_right_left_order() {
        let mut g = Grid::new(3, 300);
        g.recompute_all_neighbors();
        // Center cell (1, 1) = index 4: down (1,2)=7, up (1,0)=1,
        // right (2,1)=5, left (0,1)=3.
        assert_eq!(g.cell(Point::new(1, 1)).unwrap().neighbors(), &[7, 1, 5, 3]);
        // Corner (0, 0): down (0,1)=3, right (1,0)=1.
        assert_eq!(g.cell(Point::new(0, 0)).unwrap().neighbors(), &[3, 1]);
    }

    #[test]
    fn recompute_removes_and_restores_obstacles() {
        let mut g = Grid::new(3, 300);
        g.recompute_all_neighbors();
        let center = g.idx(Point::new(1, 1)).unwrap();
        for n in Point::new(1, 1).neighbors_4() {
            assert!(g.cell(n).unwrap().neighbors().contains(&center));
        }

        g.set_obstacle(Point::new(1, 1));
        g.recompute_all_neighbors();
        for n in Point::new(1, 1).neighbors_4() {
            assert!(!g.cell(n).unwrap().neighbors().contains(&center));
        }

        g.erase(Point::new(1, 1));
        g.recompute_all_neighbors();
        for n in Point::new(1, 1).neighbors_4() {
            assert!(g.cell(n).unwrap().neighbors().contains(&center));
        }
    }

    #[test]
    fn clear_drops_everything() {
        let mut g = Grid::new(4, 400);
        g.set_start(Point::new(0, 0));
        g.set_end(Point::new(3, 3));
        g.set_obstacle(Point::new(1, 1));
        g.recompute_all_neighbors();

        g.clear();
        assert_eq!(g.start(), None);
        assert_eq!(g.end(), None);
        assert!(!g.adjacency_fresh());
        assert!(g.iter().all(|c| c.state() == CellState::Default));
    }

    #[test]
    fn clear_search_markings_restores_markers() {
        let mut g = Grid::new(3, 300);
        g.set_start(Point::new(0, 0));
        g.set_end(Point::new(2, 2));

        // Simulate a finished search's leftovers.
        let end = g.idx(Point::new(2, 2)).unwrap();
        g.cell_at_mut(end).mark_frontier();
        let i = g.idx(Point::new(1, 0)).unwrap();
        g.cell_at_mut(i).mark_visited();
        let j = g.idx(Point::new(0, 1)).unwrap();
        g.cell_at_mut(j).mark_path();

        g.clear_search_markings();
        assert_eq!(g.state(Point::new(2, 2)), Some(CellState::End));
        assert_eq!(g.state(Point::new(0, 0)), Some(CellState::Start));
        assert_eq!(g.state(Point::new(1, 0)), Some(CellState::Default));
        assert_eq!(g.state(Point::new(0, 1)), Some(CellState::Default));
    }

    #[test]
    fn locate_maps_pixels_and_rejects_the_margin() {
        let g = Grid::new(7, 600); // cell_size 85, painted area 595 px
        assert_eq!(g.locate(Point::new(0, 0)), Some(Point::new(0, 0)));
        assert_eq!(g.locate(Point::new(84, 84)), Some(Point::new(0, 0)));
        assert_eq!(g.locate(Point::new(85, 0)), Some(Point::new(1, 0)));
        assert_eq!(g.locate(Point::new(594, 594)), Some(Point::new(6, 6)));
        // The 5 px remainder margin maps to no cell.
        assert_eq!(g.locate(Point::new(595, 0)), None);
        assert_eq!(g.locate(Point::new(0, 599)), None);
        assert_eq!(g.locate(Point::new(-1, 0)), None);
    }

    #[test]
    fn compute_frame_emits_only_changes() {
        let mut g = Grid::new(3, 300);
        let prev: Vec<CellState> = g.iter().map(Cell::state).collect();

        g.set_start(Point::new(0, 0));
        g.set_obstacle(Point::new(2, 1));
        let frame = compute_frame(&prev, &g);
        assert_eq!(frame.rows, 3);
        assert_eq!(frame.cells.len(), 2);
        assert!(frame.cells.contains(&FrameCell {
            pos: Point::new(0, 0),
            state: CellState::Start,
        }));
        assert!(frame.cells.contains(&FrameCell {
            pos: Point::new(2, 1),
            state: CellState::Obstacle,
        }));
    }

    #[test]
    fn full_frame_covers_every_cell() {
        let g = Grid::new(4, 400);
        let frame = Frame::full(&g);
        assert_eq!(frame.cells.len(), 16);
        assert!(frame.cells.iter().all(|fc| fc.state == CellState::Default));
    }
}
