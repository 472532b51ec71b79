//! The interaction controller: input handling, board edits and the render
//! loop.
//!
//! The controller owns the grid, the search engine and the driver. Input
//! arrives as [`Msg`] values on a channel; edits mutate the grid; rendering
//! happens by diffing the grid against the last painted snapshot and
//! flushing the changed cells. While a search runs, the render callback
//! keeps polling input so Escape can interrupt it.

use std::error::Error;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::RngExt;

use pathview_core::{
    CellState, Point,
    app::{Context, Driver},
    grid::{Frame, Grid, compute_frame},
    messages::{Key, MouseAction, Msg},
};
use pathview_search::{SearchOutcome, Searcher};

use crate::recorder::FileRecorder;

const CONTROLS: &str =
    "click: start, end, walls | right-click: erase | space: search | r: scatter | c: clear | q: quit";

/// Runtime options, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub rows: i32,
    pub width: i32,
    pub delay: Duration,
    pub density: f64,
}

/// The application: maps input to board edits and drives searches.
pub struct Controller<D: Driver> {
    opts: Options,
    grid: Grid,
    searcher: Searcher,
    driver: D,
    recorder: Option<FileRecorder>,
    /// Last painted state per cell, for frame diffing.
    prev: Vec<CellState>,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    status: String,
    status_dirty: bool,
    quit: bool,
}

impl<D: Driver> Controller<D> {
    pub fn new(opts: Options, driver: D, recorder: Option<FileRecorder>) -> Self {
        let grid = Grid::new(opts.rows, opts.width);
        let prev = vec![CellState::Default; grid.len()];
        let (tx, rx) = mpsc::channel();
        Self {
            opts,
            grid,
            searcher: Searcher::new(),
            driver,
            recorder,
            prev,
            tx,
            rx,
            status: String::new(),
            status_dirty: false,
            quit: false,
        }
    }

    /// Initialise the driver, run the event loop, restore the terminal.
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        self.driver.init()?;
        let ctx = Context::new();
        let result = self.event_loop(&ctx);
        self.driver.close();
        if let Some(rec) = self.recorder.take() {
            if let Err(e) = rec.finish() {
                warn!("frame recorder flush failed: {e}");
            }
        }
        result
    }

    fn event_loop(&mut self, ctx: &Context) -> Result<(), Box<dyn Error>> {
        self.full_repaint()?;
        self.set_status(CONTROLS);
        self.flush_changes()?;

        while !self.quit {
            self.driver.poll_msgs(ctx, self.tx.clone())?;
            while let Ok(msg) = self.rx.try_recv() {
                self.update(msg)?;
                if self.quit {
                    break;
                }
            }
            self.flush_changes()?;
        }
        Ok(())
    }

    fn update(&mut self, msg: Msg) -> Result<(), Box<dyn Error>> {
        match msg {
            Msg::KeyDown { key, .. } => self.handle_key(key)?,
            Msg::Mouse { action, pos, .. } => self.handle_mouse(action, pos),
            Msg::Screen { .. } => self.full_repaint()?,
            Msg::Init => {}
            Msg::Quit => self.quit = true,
        }
        Ok(())
    }

    fn handle_key(&mut self, key: Key) -> Result<(), Box<dyn Error>> {
        match key {
            Key::Space => self.run_search()?,
            Key::Char('c') => {
                self.grid.clear();
                self.set_status("board cleared");
                debug!("board cleared");
            }
            Key::Char('r') => self.scatter_obstacles(),
            Key::Char('q') | Key::Escape => self.quit = true,
            _ => {}
        }
        Ok(())
    }

    fn handle_mouse(&mut self, action: MouseAction, pos: Point) {
        let Some(cell) = self.cell_under(pos) else {
            return;
        };
        match action {
            MouseAction::Main => self.paint(cell),
            MouseAction::Secondary => self.grid.erase(cell),
            _ => {}
        }
    }

    /// Translate a pointer position in surface coordinates to a cell.
    fn cell_under(&self, pos: Point) -> Option<Point> {
        let cols = self.driver.cell_columns().max(1);
        let p = Point::new(pos.x / cols, pos.y);
        self.grid.contains(p).then_some(p)
    }

    /// The first primary click places the start, the second the end, and
    /// every click after that paints obstacles. Clicks on the markers
    /// themselves do nothing (the grid refuses them).
    fn paint(&mut self, p: Point) {
        if self.grid.start().is_none() {
            self.grid.set_start(p);
        } else if self.grid.end().is_none() && self.grid.start_index() != self.grid.idx(p) {
            self.grid.set_end(p);
        } else {
            self.grid.set_obstacle(p);
        }
    }

    /// Scatter obstacles over empty cells with the configured probability.
    fn scatter_obstacles(&mut self) {
        let mut rng = rand::rng();
        let empty: Vec<Point> = self
            .grid
            .iter()
            .filter(|c| c.state() == CellState::Default)
            .map(|c| c.pos())
            .collect();
        let mut painted = 0usize;
        for p in empty {
            if rng.random_bool(self.opts.density) {
                self.grid.set_obstacle(p);
                painted += 1;
            }
        }
        debug!("scattered {painted} obstacles");
    }

    /// Run the search synchronously, animating through the render callback.
    fn run_search(&mut self) -> Result<(), Box<dyn Error>> {
        if self.grid.start().is_none() || self.grid.end().is_none() {
            self.set_status("designate start and end cells first");
            return Ok(());
        }

        // Leftovers from a previous run would confuse the display, and
        // obstacle edits since the last run have invalidated adjacency.
        self.grid.clear_search_markings();
        self.grid.recompute_all_neighbors();
        self.flush_changes()?;

        let sctx = Context::new();
        let delay = self.opts.delay;
        let started = Instant::now();
        let tx = self.tx.clone();

        let driver = &mut self.driver;
        let prev = &mut self.prev;
        let recorder = &mut self.recorder;
        let rx = &self.rx;
        let quit = &mut self.quit;
        let mut io_err: Option<Box<dyn Error>> = None;

        let outcome = self.searcher.search(&mut self.grid, &sctx, |g| {
            if io_err.is_some() {
                return;
            }
            // Keep pumping input so the search stays interruptible.
            if let Err(e) = driver.poll_msgs(&sctx, tx.clone()) {
                io_err = Some(e);
                sctx.cancel();
                return;
            }
            while let Ok(msg) = rx.try_recv() {
                match msg {
                    Msg::KeyDown {
                        key: Key::Escape, ..
                    } => sctx.cancel(),
                    Msg::KeyDown {
                        key: Key::Char('q'),
                        ..
                    }
                    | Msg::Quit => {
                        *quit = true;
                        sctx.cancel();
                    }
                    // Board edits wait until the search is done.
                    _ => {}
                }
            }

            let frame = compute_frame(prev, g);
            if frame.cells.is_empty() {
                return;
            }
            apply_to_snapshot(prev, &frame);
            if let Some(rec) = recorder.as_mut() {
                if let Err(e) = rec.record(&frame) {
                    io_err = Some(e.into());
                    sctx.cancel();
                    return;
                }
            }
            if let Err(e) = driver.flush(&frame) {
                io_err = Some(e);
                sctx.cancel();
                return;
            }
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        });

        if let Some(e) = io_err {
            return Err(e);
        }

        // Frontier/Visited may have painted over the start/end cells.
        self.grid.restore_markers();

        match outcome {
            Ok(SearchOutcome::PathFound { path }) => {
                let steps = path.len().saturating_sub(1);
                info!("path found: {steps} steps in {:?}", started.elapsed());
                self.set_status(format!("path found (length {steps})"));
            }
            Ok(SearchOutcome::NoPathExists) => {
                info!("no path exists ({:?})", started.elapsed());
                self.set_status("no path exists");
            }
            Ok(SearchOutcome::Cancelled) => {
                info!("search cancelled after {:?}", started.elapsed());
                self.set_status("search cancelled");
            }
            Err(e) => {
                // The guards above should make this unreachable.
                warn!("search precondition violated: {e}");
                self.set_status(e.to_string());
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
        self.status_dirty = true;
    }

    /// Paint every cell and schedule a status repaint.
    fn full_repaint(&mut self) -> Result<(), Box<dyn Error>> {
        let frame = Frame::full(&self.grid);
        apply_to_snapshot(&mut self.prev, &frame);
        if let Some(rec) = &mut self.recorder {
            rec.record(&frame)?;
        }
        self.driver.flush(&frame)?;
        self.status_dirty = true;
        Ok(())
    }

    /// Flush cells that changed since the last paint, plus any pending
    /// status text.
    fn flush_changes(&mut self) -> Result<(), Box<dyn Error>> {
        let frame = compute_frame(&self.prev, &self.grid);
        if !frame.cells.is_empty() {
            apply_to_snapshot(&mut self.prev, &frame);
            if let Some(rec) = &mut self.recorder {
                rec.record(&frame)?;
            }
            self.driver.flush(&frame)?;
        }
        if self.status_dirty {
            self.driver.flush_status(self.grid.rows(), &self.status)?;
            self.status_dirty = false;
        }
        Ok(())
    }
}

/// Fold a flushed frame back into the snapshot used for diffing.
fn apply_to_snapshot(prev: &mut [CellState], frame: &Frame) {
    for fc in &frame.cells {
        let i = (fc.pos.y * frame.rows + fc.pos.x) as usize;
        if let Some(slot) = prev.get_mut(i) {
            *slot = fc.state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NullDriver {
        flushes: usize,
    }

    impl Driver for NullDriver {
        fn init(&mut self) -> Result<(), Box<dyn Error>> {
            Ok(())
        }

        fn poll_msgs(&mut self, _ctx: &Context, _tx: Sender<Msg>) -> Result<(), Box<dyn Error>> {
            Ok(())
        }

        fn flush(&mut self, _frame: &Frame) -> Result<(), Box<dyn Error>> {
            self.flushes += 1;
            Ok(())
        }

        fn flush_status(&mut self, _row: i32, _text: &str) -> Result<(), Box<dyn Error>> {
            Ok(())
        }

        fn close(&mut self) {}
    }

    fn controller(rows: i32) -> Controller<NullDriver> {
        Controller::new(
            Options {
                rows,
                width: rows * 24,
                delay: Duration::ZERO,
                density: 0.0,
            },
            NullDriver::default(),
            None,
        )
    }

    #[test]
    fn primary_clicks_paint_start_end_then_obstacles() {
        let mut c = controller(5);
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_mouse(MouseAction::Main, Point::new(2, 2));
        c.handle_mouse(MouseAction::Main, Point::new(3, 3));
        assert_eq!(c.grid.start(), Some(Point::new(0, 0)));
        assert_eq!(c.grid.end(), Some(Point::new(2, 2)));
        assert_eq!(c.grid.state(Point::new(3, 3)), Some(CellState::Obstacle));
    }

    #[test]
    fn erase_frees_a_marker_for_repainting() {
        let mut c = controller(5);
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_mouse(MouseAction::Main, Point::new(2, 2));
        c.handle_mouse(MouseAction::Secondary, Point::new(2, 2));
        assert_eq!(c.grid.end(), None);
        // The next primary click becomes the new end.
        c.handle_mouse(MouseAction::Main, Point::new(4, 4));
        assert_eq!(c.grid.end(), Some(Point::new(4, 4)));
    }

    #[test]
    fn clicks_outside_the_board_are_ignored() {
        let mut c = controller(3);
        c.handle_mouse(MouseAction::Main, Point::new(9, 9));
        assert_eq!(c.grid.start(), None);
    }

    #[test]
    fn space_requires_both_markers() {
        let mut c = controller(5);
        c.handle_key(Key::Space).unwrap();
        assert_eq!(c.status, "designate start and end cells first");
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_key(Key::Space).unwrap();
        assert_eq!(c.status, "designate start and end cells first");
    }

    #[test]
    fn space_runs_the_search_and_reports_the_length() {
        let mut c = controller(5);
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_mouse(MouseAction::Main, Point::new(4, 4));
        c.handle_key(Key::Space).unwrap();
        assert_eq!(c.status, "path found (length 8)");
        assert!(c.grid.iter().any(|cell| cell.is_path()));
        // Markers repainted after the run.
        assert_eq!(c.grid.state(Point::new(0, 0)), Some(CellState::Start));
        assert_eq!(c.grid.state(Point::new(4, 4)), Some(CellState::End));
        assert!(c.driver.flushes > 0);
    }

    #[test]
    fn walled_off_board_reports_no_path() {
        let mut c = controller(3);
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_mouse(MouseAction::Main, Point::new(2, 0));
        for y in 0..3 {
            c.handle_mouse(MouseAction::Main, Point::new(1, y));
        }
        c.handle_key(Key::Space).unwrap();
        assert_eq!(c.status, "no path exists");
    }

    #[test]
    fn obstacle_edits_between_searches_are_picked_up() {
        let mut c = controller(5);
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_mouse(MouseAction::Main, Point::new(4, 0));
        c.handle_key(Key::Space).unwrap();
        assert_eq!(c.status, "path found (length 4)");

        // Wall off the straight route; the rerun must detour.
        for y in 0..4 {
            c.handle_mouse(MouseAction::Main, Point::new(2, y));
        }
        c.handle_key(Key::Space).unwrap();
        assert_eq!(c.status, "path found (length 12)");
    }

    #[test]
    fn scatter_fills_empty_cells_at_full_density() {
        let mut c = controller(4);
        c.opts.density = 1.0;
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_mouse(MouseAction::Main, Point::new(3, 3));
        c.handle_key(Key::Char('r')).unwrap();
        let obstacles = c.grid.iter().filter(|cell| cell.is_obstacle()).count();
        assert_eq!(obstacles, 14); // everything but the two markers
        assert_eq!(c.grid.state(Point::new(0, 0)), Some(CellState::Start));
        assert_eq!(c.grid.state(Point::new(3, 3)), Some(CellState::End));
    }

    #[test]
    fn clear_and_quit_keys() {
        let mut c = controller(4);
        c.handle_mouse(MouseAction::Main, Point::new(0, 0));
        c.handle_key(Key::Char('c')).unwrap();
        assert_eq!(c.grid.start(), None);
        assert!(!c.quit);
        c.handle_key(Key::Char('q')).unwrap();
        assert!(c.quit);
    }
}
