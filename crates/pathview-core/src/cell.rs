//! The cell model: [`CellState`] and the arena [`Cell`].

use crate::geom::Point;

/// Traversal state of a single board cell.
///
/// The controller writes `Obstacle`, `Start` and `End` (and resets back to
/// `Default`); the search engine writes `Frontier`, `Visited` and `Path`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Traversable and unexplored.
    #[default]
    Default,
    /// Excluded from all adjacency.
    Obstacle,
    /// The search origin.
    Start,
    /// The search destination.
    End,
    /// Discovered but not yet expanded.
    Frontier,
    /// Expanded by the search.
    Visited,
    /// On the reconstructed shortest path.
    Path,
}

/// One addressable unit of the search grid.
///
/// Cells live in the grid's flat arena and are identified by their arena
/// index (`y * rows + x`); the index is the key wherever cell identity
/// matters, so `Cell` itself deliberately carries no equality.
#[derive(Debug, Clone)]
pub struct Cell {
    pos: Point,
    state: CellState,
    neighbors: Vec<usize>,
}

impl Cell {
    pub(crate) fn new(pos: Point) -> Self {
        Self {
            pos,
            state: CellState::Default,
            neighbors: Vec::new(),
        }
    }

    /// Board position, fixed at construction.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Current traversal state.
    #[inline]
    pub fn state(&self) -> CellState {
        self.state
    }

    /// Arena indices of the traversable cardinal neighbours, in the down,
    /// up, right, left evaluation order.
    ///
    /// Stale until the owning grid's
    /// [`recompute_all_neighbors`](crate::Grid::recompute_all_neighbors)
    /// has run since the last obstacle edit.
    #[inline]
    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    pub(crate) fn neighbors_mut(&mut self) -> &mut Vec<usize> {
        &mut self.neighbors
    }

    // --- state predicates ---

    #[inline]
    pub fn is_obstacle(&self) -> bool {
        self.state == CellState::Obstacle
    }

    #[inline]
    pub fn is_start(&self) -> bool {
        self.state == CellState::Start
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.state == CellState::End
    }

    #[inline]
    pub fn is_frontier(&self) -> bool {
        self.state == CellState::Frontier
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.state == CellState::Visited
    }

    #[inline]
    pub fn is_path(&self) -> bool {
        self.state == CellState::Path
    }

    // --- state transitions ---

    pub fn mark_obstacle(&mut self) {
        self.state = CellState::Obstacle;
    }

    pub fn mark_start(&mut self) {
        self.state = CellState::Start;
    }

    pub fn mark_end(&mut self) {
        self.state = CellState::End;
    }

    pub fn mark_frontier(&mut self) {
        self.state = CellState::Frontier;
    }

    pub fn mark_visited(&mut self) {
        self.state = CellState::Visited;
    }

    pub fn mark_path(&mut self) {
        self.state = CellState::Path;
    }

    /// Reset to the default traversable state.
    pub fn reset(&mut self) {
        self.state = CellState::Default;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_and_predicates() {
        let mut c = Cell::new(Point::new(2, 3));
        assert_eq!(c.state(), CellState::Default);
        assert_eq!(c.pos(), Point::new(2, 3));

        c.mark_obstacle();
        assert!(c.is_obstacle());
        c.mark_start();
        assert!(c.is_start());
        c.mark_end();
        assert!(c.is_end());
        c.mark_frontier();
        assert!(c.is_frontier());
        c.mark_visited();
        assert!(c.is_visited());
        c.mark_path();
        assert!(c.is_path());
        c.reset();
        assert_eq!(c.state(), CellState::Default);
    }
}
