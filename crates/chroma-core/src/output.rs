//! Result line format and the buffered writer used by the sink.
//!
//! One line per analyzed image:
//!
//! ```text
//! <url>,#RRGGBB,#RRGGBB,#RRGGBB
//! ```
//!
//! Colors are six uppercase, zero-padded hex digits, most frequent first.

use std::fmt;
use std::str::FromStr;

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::ParseResultError;
use crate::types::{ColorTriple, RGB_MASK};

/// A source URL paired with its dominant colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub url: String,
    pub colors: ColorTriple,
}

impl ResultLine {
    pub fn new(url: impl Into<String>, colors: ColorTriple) -> Self {
        Self {
            url: url.into(),
            colors,
        }
    }
}

impl fmt::Display for ResultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [first, second, third] = self.colors.colors();
        write!(
            f,
            "{},#{:06X},#{:06X},#{:06X}",
            self.url,
            first & RGB_MASK,
            second & RGB_MASK,
            third & RGB_MASK
        )
    }
}

impl FromStr for ResultLine {
    type Err = ParseResultError;

    /// Parse a formatted line. The URL is everything before the last three
    /// fields, so URLs containing commas survive a round trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(['\n', '\r']);
        let mut fields = line.rsplitn(4, ',');
        let third = fields.next().ok_or(ParseResultError::MissingFields)?;
        let second = fields.next().ok_or(ParseResultError::MissingFields)?;
        let first = fields.next().ok_or(ParseResultError::MissingFields)?;
        let url = fields.next().ok_or(ParseResultError::MissingFields)?;
        if url.is_empty() {
            return Err(ParseResultError::EmptyUrl);
        }
        Ok(Self {
            url: url.to_string(),
            colors: ColorTriple([
                parse_color(first)?,
                parse_color(second)?,
                parse_color(third)?,
            ]),
        })
    }
}

fn parse_color(field: &str) -> Result<u32, ParseResultError> {
    let invalid = || ParseResultError::InvalidColor(field.to_string());
    let hex = field.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u32::from_str_radix(hex, 16).map_err(|_| invalid())
}

/// Buffered writer of newline-terminated result lines.
pub struct ResultWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
    lines_written: usize,
}

impl<W: AsyncWrite + Unpin> ResultWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            lines_written: 0,
        }
    }

    /// Write one line followed by `\n`.
    pub async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.lines_written += 1;
        Ok(())
    }

    /// Get the number of lines written.
    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flush buffered lines to the underlying writer.
    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush().await
    }

    /// Flush and close the underlying writer.
    pub async fn close(&mut self) -> std::io::Result<()> {
        self.writer.shutdown().await
    }

    /// Consume the writer and return the underlying writer.
    ///
    /// Unflushed lines are discarded; call [`flush`](Self::flush) first.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}
