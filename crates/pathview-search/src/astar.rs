use std::collections::BinaryHeap;

use thiserror::Error;

use pathview_core::{Context, Grid, Point};

use crate::distance::manhattan;

/// Sentinel cost meaning "not reached yet".
pub const UNREACHABLE: i32 = i32::MAX;

/// Terminal result of a completed search. All three are normal outcomes,
/// not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A shortest path exists. `path` lists every cell from start to end
    /// inclusive; its length minus one is the path cost.
    PathFound { path: Vec<Point> },
    /// Every route from start to end is blocked by obstacles.
    NoPathExists,
    /// The caller cancelled via the [`Context`] token. The grid keeps
    /// whatever Frontier/Visited markings had accumulated.
    Cancelled,
}

/// A precondition violation detected before the search proper starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no start cell designated")]
    MissingStart,
    #[error("no end cell designated")]
    MissingEnd,
    #[error("neighbor lists are stale; call Grid::recompute_all_neighbors first")]
    StaleAdjacency,
}

// ---------------------------------------------------------------------------
// Internal search state
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Node {
    g: i32,
    f: i32,
    parent: usize,
    generation: u32,
    in_open: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: UNREACHABLE,
            f: UNREACHABLE,
            parent: usize::MAX,
            generation: 0,
            in_open: false,
        }
    }
}

/// Heap entry ordered by smallest `(f, seq)`.
///
/// `f` is the estimate at push time and `seq` the insertion number, so
/// cells with equal estimates pop in discovery order (FIFO among ties).
#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: i32,
    seq: u64,
    idx: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (a max-heap) pops the smallest (f, seq).
        other.f.cmp(&self.f).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Searcher
// ---------------------------------------------------------------------------

/// A* search engine with reusable per-run caches.
///
/// The node arena is lazily invalidated by a generation counter, so a
/// `Searcher` kept across runs allocates only when the board grows.
pub struct Searcher {
    nodes: Vec<Node>,
    generation: u32,
    open: BinaryHeap<OpenEntry>,
    nbuf: Vec<usize>,
}

impl Searcher {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generation: 0,
            open: BinaryHeap::new(),
            nbuf: Vec::with_capacity(4),
        }
    }

    /// Run an A* search from the grid's designated start to its designated
    /// end, invoking `on_step` once per expanded cell and once per revealed
    /// path cell.
    ///
    /// Preconditions: both designations present and
    /// [`Grid::recompute_all_neighbors`] called since the last obstacle
    /// edit; violations surface as a [`SearchError`] before any cell state
    /// changes. A start that equals the end (not constructible through the
    /// grid's designation API) degenerates to an immediate single-cell
    /// `PathFound`.
    ///
    /// On success, the intermediate cells of the path (exclusive of start
    /// and end) are marked `Path`, revealed one per `on_step` call from the
    /// end backwards. On failure the accumulated Visited/Frontier markings
    /// are left in place; the caller clears them via
    /// [`Grid::clear_search_markings`] before the next run.
    pub fn search<F>(
        &mut self,
        grid: &mut Grid,
        ctx: &Context,
        mut on_step: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        F: FnMut(&Grid),
    {
        let start = grid.start_index().ok_or(SearchError::MissingStart)?;
        let end = grid.end_index().ok_or(SearchError::MissingEnd)?;
        if !grid.adjacency_fresh() {
            return Err(SearchError::StaleAdjacency);
        }

        let goal = grid.cell_at(end).pos();
        if start == end {
            return Ok(SearchOutcome::PathFound { path: vec![goal] });
        }

        if self.nodes.len() < grid.len() {
            self.nodes.resize(grid.len(), Node::default());
        }
        self.generation = self.generation.wrapping_add(1);
        let cur_gen = self.generation;
        self.open.clear();

        {
            let node = &mut self.nodes[start];
            node.g = 0;
            node.f = manhattan(grid.cell_at(start).pos(), goal);
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.in_open = true;
        }
        let mut seq: u64 = 0;
        self.open.push(OpenEntry {
            f: self.nodes[start].f,
            seq,
            idx: start,
        });

        loop {
            if ctx.is_done() {
                return Ok(SearchOutcome::Cancelled);
            }
            let Some(entry) = self.open.pop() else { break };
            let ci = entry.idx;
            self.nodes[ci].in_open = false;

            if ci == end {
                return Ok(self.reconstruct(grid, end, &mut on_step));
            }

            let current_g = self.nodes[ci].g;
            self.nbuf.clear();
            self.nbuf.extend_from_slice(grid.cell_at(ci).neighbors());

            for k in 0..self.nbuf.len() {
                let ni = self.nbuf[k];
                let tentative = current_g + 1;
                {
                    let node = &mut self.nodes[ni];
                    if node.generation != cur_gen {
                        node.generation = cur_gen;
                        node.g = UNREACHABLE;
                        node.in_open = false;
                    }
                    if tentative >= node.g {
                        continue;
                    }
                    node.parent = ci;
                    node.g = tentative;
                }
                let f = tentative + manhattan(grid.cell_at(ni).pos(), goal);
                self.nodes[ni].f = f;
                if !self.nodes[ni].in_open {
                    seq += 1;
                    self.nodes[ni].in_open = true;
                    self.open.push(OpenEntry { f, seq, idx: ni });
                    grid.cell_at_mut(ni).mark_frontier();
                }
            }

            on_step(grid);
            if ci != start {
                grid.cell_at_mut(ci).mark_visited();
            }
        }

        Ok(SearchOutcome::NoPathExists)
    }

    /// Walk the parent links backward from the end, marking each
    /// intermediate cell and stepping the callback once per reveal.
    fn reconstruct<F>(&self, grid: &mut Grid, end: usize, on_step: &mut F) -> SearchOutcome
    where
        F: FnMut(&Grid),
    {
        let mut indices = vec![end];
        let mut ci = self.nodes[end].parent;
        while ci != usize::MAX {
            indices.push(ci);
            ci = self.nodes[ci].parent;
        }

        // indices runs end → start; everything strictly between them is
        // path, revealed from the end backwards like the exploration was.
        for &i in &indices[1..indices.len() - 1] {
            grid.cell_at_mut(i).mark_path();
            on_step(grid);
        }

        let path = indices
            .iter()
            .rev()
            .map(|&i| grid.cell_at(i).pos())
            .collect();
        SearchOutcome::PathFound { path }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}
