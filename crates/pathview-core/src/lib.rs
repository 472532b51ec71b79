//! **pathview-core** — board model, input events and driver boundary for the
//! pathview shortest-path visualizer.
//!
//! This crate provides the types shared across the *pathview* workspace: the
//! [`Point`] coordinate, the cell arena ([`Cell`], [`CellState`]), the square
//! [`Grid`] with cached adjacency, diff-based render frames ([`Frame`]),
//! input messages ([`messages::Msg`]), and the back-end boundary
//! ([`Driver`], [`Context`]).

pub mod app;
pub mod cell;
pub mod geom;
pub mod grid;
pub mod messages;
pub mod style;

pub use app::{Context, Driver};
pub use cell::{Cell, CellState};
pub use geom::Point;
pub use grid::{Frame, FrameCell, Grid, compute_frame};
pub use messages::{Key, ModMask, MouseAction, Msg};
pub use style::Color;
