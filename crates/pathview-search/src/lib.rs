//! Shortest-path search for the pathview board.
//!
//! One algorithm lives here: **A\*** over the 4-connected uniform-cost grid
//! ([`Searcher::search`]), driven by the grid's precomputed adjacency and a
//! render callback invoked once per cell expansion and once per revealed
//! path cell, so a front-end can animate the search as it runs.
//!
//! [`Searcher`] owns and reuses its internal node arena so repeated runs
//! incur no allocations after warm-up. Ties on the cost estimate are broken
//! by discovery order (FIFO), making every run reproducible for a given
//! board.

mod astar;
mod distance;

pub use astar::{SearchError, SearchOutcome, Searcher, UNREACHABLE};
pub use distance::manhattan;
