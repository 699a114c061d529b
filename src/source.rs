// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Recorded landmark input for offline replay.
//!
//! A recording is a JSON-lines stream: one [`LandmarkFrame`] object per line,
//! in capture order. Blank lines are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{CaptureError, Result};
use crate::landmark::LandmarkFrame;

/// Where a recording is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A JSON-lines file.
    File(PathBuf),
    /// Standard input.
    Stdin,
}

impl Source {
    /// Open the source for reading.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened.
    pub fn open(&self) -> Result<FrameReader<Box<dyn BufRead>>> {
        let reader: Box<dyn BufRead> = match self {
            Self::File(path) => Box::new(BufReader::new(File::open(path)?)),
            Self::Stdin => Box::new(BufReader::new(io::stdin())),
        };
        Ok(FrameReader::new(reader))
    }

    /// Display name used in log output.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Stdin => "<stdin>".to_string(),
        }
    }
}

/// `-` selects standard input; anything else is a file path.
impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if s == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(s))
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Iterator over the frames of a JSON-lines recording.
pub struct FrameReader<R> {
    reader: R,
    line: String,
    line_no: usize,
    frame_idx: usize,
}

impl FrameReader<BufReader<File>> {
    /// Open a recording file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> FrameReader<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            frame_idx: 0,
        }
    }

    /// Number of frames yielded so far.
    #[must_use]
    pub const fn frames_read(&self) -> usize {
        self.frame_idx
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<LandmarkFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(err) => return Some(Err(err.into())),
            }

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }

            let frame = serde_json::from_str::<LandmarkFrame>(text).map_err(|err| {
                CaptureError::FrameError(format!("line {}: {err}", self.line_no))
            });
            if frame.is_ok() {
                self.frame_idx += 1;
            }
            return Some(frame);
        }
    }
}
