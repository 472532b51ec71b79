//! JSON-lines frame recording.
//!
//! Every flushed [`Frame`] is appended as one JSON object per line, giving
//! a replayable trace of everything painted during a session.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use pathview_core::Frame;

/// A recorder writing to a buffered file.
pub type FileRecorder = FrameRecorder<BufWriter<File>>;

/// Writes frames to a byte-oriented writer, one JSON object per line.
pub struct FrameRecorder<W: Write> {
    writer: W,
}

impl FrameRecorder<BufWriter<File>> {
    /// Create a recorder writing to a fresh file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(FrameRecorder::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> FrameRecorder<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Append one frame.
    pub fn record(&mut self, frame: &Frame) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, frame).map_err(io::Error::from)?;
        self.writer.write_all(b"\n")
    }

    /// Flush the underlying writer.
    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
