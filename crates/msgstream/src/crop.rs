//! Bounded cropping of serialized message streams.
//!
//! A stream is a JSON array of `[tag, payload]` arrays. Cropping keeps the
//! longest run of complete leading elements that fits a byte budget and
//! closes the array again, so the result always parses. Only the first
//! `budget` bytes of the input are ever looked at.

use std::borrow::Cow;
use thiserror::Error;

/// Serialized empty stream.
pub const EMPTY_STREAM: &str = "[]";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("message stream must be `[]` or start with `[[`")]
    MalformedStream,
    #[error("unbalanced `]` at byte {position}")]
    Syntax { position: usize },
}

/// Per-byte scan state.
///
/// `depth` counts open brackets below the outer array, so `0` is the top
/// level between elements. Scanning starts after the leading `[[`, that is
/// inside the first element at depth `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropScanner {
    pub depth: usize,
    pub inside_string: bool,
    pub escaped: bool,
    /// Byte offset of the `]` that closed the last complete element.
    pub last_complete_end: Option<usize>,
}

impl Default for CropScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CropScanner {
    pub fn new() -> Self {
        Self {
            depth: 1,
            inside_string: false,
            escaped: false,
            last_complete_end: None,
        }
    }

    /// Advance over the byte at `position`.
    pub fn step(mut self, position: usize, byte: u8) -> Result<Self, CropError> {
        if self.inside_string {
            // A backslash escapes exactly one byte, so `\\` leaves the
            // following quote live.
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.inside_string = false;
            }
            return Ok(self);
        }
        match byte {
            b'"' => self.inside_string = true,
            b'[' => self.depth += 1,
            b']' => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or(CropError::Syntax { position })?;
                if self.depth == 0 {
                    self.last_complete_end = Some(position);
                }
            }
            _ => {}
        }
        Ok(self)
    }
}

/// Cropped stream plus whether anything was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropOutcome<'a> {
    pub text: Cow<'a, str>,
    pub truncated: bool,
}

impl<'a> CropOutcome<'a> {
    fn unchanged(text: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(text),
            truncated: false,
        }
    }

    fn cropped(text: Cow<'a, str>) -> Self {
        Self {
            text,
            truncated: true,
        }
    }
}

/// Crop `stream` to at most `budget` bytes of complete leading elements.
///
/// - `[]` (or any stream with `budget <= 2`) crops to `[]`.
/// - A stream that already fits is returned unchanged.
/// - Only a stream that must actually be cropped is checked for the `[[`
///   shape.
/// - Otherwise the result is every element that closed before byte
///   `budget - 1`, followed by `]`.
pub fn crop(stream: &str, budget: usize) -> Result<String, CropError> {
    crop_with_outcome(stream, budget).map(|outcome| outcome.text.into_owned())
}

pub fn crop_with_outcome(stream: &str, budget: usize) -> Result<CropOutcome<'_>, CropError> {
    if stream == EMPTY_STREAM {
        return Ok(CropOutcome::unchanged(EMPTY_STREAM));
    }
    if budget <= 2 {
        return Ok(CropOutcome::cropped(Cow::Borrowed(EMPTY_STREAM)));
    }
    if stream.len() <= budget {
        return Ok(CropOutcome::unchanged(stream));
    }
    if !stream.starts_with("[[") {
        return Err(CropError::MalformedStream);
    }

    // Stop one byte short so the appended `]` stays inside the budget.
    let window = &stream.as_bytes()[2..budget - 1];
    let scanner = window
        .iter()
        .enumerate()
        .try_fold(CropScanner::new(), |scanner, (offset, &byte)| {
            scanner.step(offset + 2, byte)
        })?;

    let text = match scanner.last_complete_end {
        // `]` is ASCII, so `end + 1` is a char boundary.
        Some(end) => {
            let mut out = String::with_capacity(end + 2);
            out.push_str(&stream[..=end]);
            out.push(']');
            Cow::Owned(out)
        }
        None => Cow::Borrowed(EMPTY_STREAM),
    };
    Ok(CropOutcome::cropped(text))
}
