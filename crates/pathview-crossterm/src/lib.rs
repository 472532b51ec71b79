//! Crossterm terminal back-end for pathview.
//!
//! [`CrosstermDriver`] implements [`pathview_core::Driver`], painting each
//! board cell as a block of [`CELL_WIDTH`] space characters with a
//! background colour from a [`Palette`], and translating terminal input
//! into [`Msg`] values. Pointer positions are reported in raw terminal
//! coordinates; callers divide the column by
//! [`cell_columns`](pathview_core::Driver::cell_columns).

use std::io::{self, Write};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind},
    execute, queue,
    style::{self, Color as CtColor, SetBackgroundColor},
    terminal::{self, ClearType},
};

use pathview_core::{
    CellState, Point,
    app::{Context, Driver},
    grid::Frame,
    messages::{Key, ModMask, MouseAction, Msg},
    style::Color,
};

/// Terminal columns per board cell; two columns make cells roughly square.
pub const CELL_WIDTH: i32 = 2;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Colours used to paint each [`CellState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub empty: Color,
    pub obstacle: Color,
    pub start: Color,
    pub end: Color,
    pub frontier: Color,
    pub visited: Color,
    pub path: Color,
}

impl Palette {
    /// The colour for a cell state.
    pub fn color(&self, state: CellState) -> Color {
        match state {
            CellState::Default => self.empty,
            CellState::Obstacle => self.obstacle,
            CellState::Start => self.start,
            CellState::End => self.end,
            CellState::Frontier => self.frontier,
            CellState::Visited => self.visited,
            CellState::Path => self.path,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            empty: Color::from_rgb(0xFF, 0xFF, 0xFF),
            obstacle: Color::from_rgb(0x00, 0x00, 0x00),
            start: Color::from_rgb(0xFF, 0xA5, 0x00),
            end: Color::from_rgb(0x30, 0xD5, 0xC8),
            frontier: Color::from_rgb(0x00, 0xFF, 0x00),
            visited: Color::from_rgb(0xFF, 0x00, 0x00),
            path: Color::from_rgb(0x8F, 0x00, 0xFF),
        }
    }
}

// ---------------------------------------------------------------------------
// Event translation
// ---------------------------------------------------------------------------

fn to_ct_color(c: Color) -> CtColor {
    CtColor::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}

fn to_mod_mask(mods: KeyModifiers) -> ModMask {
    let mut m = ModMask::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        m = m | ModMask::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        m = m | ModMask::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        m = m | ModMask::ALT;
    }
    m
}

fn to_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        _ => None,
    }
}

fn button_action(btn: MouseButton) -> MouseAction {
    match btn {
        MouseButton::Left => MouseAction::Main,
        MouseButton::Right => MouseAction::Secondary,
        MouseButton::Middle => MouseAction::Auxiliary,
    }
}

// ---------------------------------------------------------------------------
// CrosstermDriver
// ---------------------------------------------------------------------------

/// A terminal back-end using crossterm.
pub struct CrosstermDriver {
    palette: Palette,
    mouse_enabled: bool,
}

impl CrosstermDriver {
    /// Create a new driver with the default palette.
    pub fn new() -> Self {
        Self {
            palette: Palette::default(),
            mouse_enabled: true,
        }
    }

    /// Override the cell palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Configure whether mouse events are captured.
    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse_enabled = enabled;
        self
    }
}

impl Default for CrosstermDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for CrosstermDriver {
    fn init(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        if self.mouse_enabled {
            execute!(stdout, event::EnableMouseCapture)?;
        }
        log::debug!("terminal initialised");
        Ok(())
    }

    fn poll_msgs(
        &mut self,
        ctx: &Context,
        tx: Sender<Msg>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Non-blocking poll: wait briefly for the first event, then drain
        // whatever else is already queued.
        if !event::poll(Duration::from_millis(16))? {
            return Ok(());
        }

        while event::poll(Duration::ZERO)? {
            if ctx.is_done() {
                return Ok(());
            }

            let msg = match event::read()? {
                Event::Key(KeyEvent {
                    code, modifiers, ..
                }) => to_key(code).map(|key| Msg::KeyDown {
                    key,
                    modifiers: to_mod_mask(modifiers),
                    time: Instant::now(),
                }),
                Event::Mouse(me) => {
                    let pos = Point::new(me.column as i32, me.row as i32);
                    let modifiers = to_mod_mask(me.modifiers);
                    let action = match me.kind {
                        // A drag keeps painting with the held button.
                        MouseEventKind::Down(btn) | MouseEventKind::Drag(btn) => {
                            Some(button_action(btn))
                        }
                        MouseEventKind::Up(_) => Some(MouseAction::Release),
                        MouseEventKind::Moved => Some(MouseAction::Move),
                        _ => None,
                    };
                    action.map(|action| Msg::Mouse {
                        action,
                        pos,
                        modifiers,
                        time: Instant::now(),
                    })
                }
                Event::Resize(w, h) => Some(Msg::Screen {
                    width: w as i32,
                    height: h as i32,
                    time: Instant::now(),
                }),
                _ => None,
            };

            if let Some(m) = msg {
                tx.send(m).ok();
            }
        }

        Ok(())
    }

    fn flush(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = io::stdout();

        for fc in &frame.cells {
            let col = (fc.pos.x * CELL_WIDTH) as u16;
            let row = fc.pos.y as u16;
            queue!(
                stdout,
                cursor::MoveTo(col, row),
                SetBackgroundColor(to_ct_color(self.palette.color(fc.state))),
                style::Print("  ")
            )?;
        }

        queue!(stdout, style::ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    fn flush_status(&mut self, row: i32, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = io::stdout();
        queue!(
            stdout,
            style::ResetColor,
            cursor::MoveTo(0, row as u16),
            terminal::Clear(ClearType::CurrentLine),
            style::Print(text)
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn cell_columns(&self) -> i32 {
        CELL_WIDTH
    }

    fn close(&mut self) {
        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = execute!(stdout, event::DisableMouseCapture);
        }
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        log::debug!("terminal restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_maps_every_state() {
        let p = Palette::default();
        assert_eq!(p.color(CellState::Default), p.empty);
        assert_eq!(p.color(CellState::Obstacle), p.obstacle);
        assert_eq!(p.color(CellState::Start), p.start);
        assert_eq!(p.color(CellState::End), p.end);
        assert_eq!(p.color(CellState::Frontier), p.frontier);
        assert_eq!(p.color(CellState::Visited), p.visited);
        assert_eq!(p.color(CellState::Path), p.path);
    }

    #[test]
    fn key_translation() {
        assert_eq!(to_key(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(to_key(KeyCode::Char('c')), Some(Key::Char('c')));
        assert_eq!(to_key(KeyCode::Esc), Some(Key::Escape));
        assert_eq!(to_key(KeyCode::Home), None);
    }

    #[test]
    fn modifier_translation() {
        let m = to_mod_mask(KeyModifiers::SHIFT | KeyModifiers::CONTROL);
        assert!(m.contains(ModMask::SHIFT));
        assert!(m.contains(ModMask::CTRL));
        assert!(!m.contains(ModMask::ALT));
    }
}
