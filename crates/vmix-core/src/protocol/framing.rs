//! Stream framing for the vMix TCP API.
//!
//! Wire format:
//! ```text
//! <line>\r\n                    every ordinary reply or event
//! XML <n>\r\n<n bytes of XML>   snapshot reply; the body length includes its own CRLF
//! ```
//!
//! TCP delivers a byte stream, so a single read may hold half a line or
//! several lines at once.  [`decode_frame`] works on an accumulation buffer
//! and reports how many bytes it consumed, mirroring how the relay's reader
//! drains its buffer one logical line at a time.
//!
//! Framing never interprets a line beyond the `XML <n>` header; the
//! classifier in [`crate::protocol::line`] decides what each line means.

use thiserror::Error;

/// Upper bound on a declared snapshot body.
///
/// Real snapshots are a few hundred kilobytes even for large productions.
/// Anything above this is treated as a corrupt header rather than buffered.
pub const MAX_SNAPSHOT_LEN: usize = 16 * 1024 * 1024;

/// Errors that can occur while extracting a frame from the receive buffer.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    /// The buffer does not yet hold a complete frame; read more bytes.
    #[error("incomplete frame: {available} bytes buffered")]
    Incomplete { available: usize },

    /// The frame was complete but not valid UTF-8.  `consumed` bytes must be
    /// dropped from the buffer before decoding the next frame.
    #[error("frame of {consumed} bytes is not valid UTF-8")]
    InvalidUtf8 { consumed: usize },

    /// An `XML <n>` header declared a body larger than [`MAX_SNAPSHOT_LEN`].
    /// Only the header line (`consumed` bytes) is dropped.
    #[error("snapshot header declares {declared} bytes, limit is 16 MiB")]
    TooLarge { declared: usize, consumed: usize },
}

impl FrameError {
    /// Number of bytes the caller must discard before retrying, or `0` when
    /// the buffer simply needs more data.
    pub fn consumed(&self) -> usize {
        match self {
            FrameError::Incomplete { .. } => 0,
            FrameError::InvalidUtf8 { consumed } | FrameError::TooLarge { consumed, .. } => {
                *consumed
            }
        }
    }
}

/// Decodes one logical line from the front of `buf`.
///
/// Returns the line (without its terminator) and the number of bytes
/// consumed.  A length-prefixed snapshot is folded into a single logical
/// line of the form `XML <body>` so the rest of the pipeline can treat every
/// device message as one line.
///
/// # Errors
///
/// Returns [`FrameError::Incomplete`] when more bytes are needed, and the
/// other variants when bytes must be skipped (see [`FrameError::consumed`]).
///
/// # Examples
///
/// ```rust
/// use vmix_core::protocol::framing::decode_frame;
///
/// let buf = b"TALLY OK 012\r\nACTS OK Input 1 1\r\n";
/// let (line, n) = decode_frame(buf).unwrap();
/// assert_eq!(line, "TALLY OK 012");
/// assert_eq!(n, 14);
/// ```
pub fn decode_frame(buf: &[u8]) -> Result<(String, usize), FrameError> {
    let Some(newline) = buf.iter().position(|&b| b == b'\n') else {
        return Err(FrameError::Incomplete {
            available: buf.len(),
        });
    };
    let header_len = newline + 1;

    let header = std::str::from_utf8(trim_line_end(&buf[..newline])).map_err(|_| {
        FrameError::InvalidUtf8 {
            consumed: header_len,
        }
    })?;

    let Some(body_len) = snapshot_body_len(header) else {
        return Ok((header.to_string(), header_len));
    };

    if body_len > MAX_SNAPSHOT_LEN {
        return Err(FrameError::TooLarge {
            declared: body_len,
            consumed: header_len,
        });
    }

    let end = header_len + body_len;
    if buf.len() < end {
        return Err(FrameError::Incomplete {
            available: buf.len(),
        });
    }

    let body = std::str::from_utf8(&buf[header_len..end])
        .map_err(|_| FrameError::InvalidUtf8 { consumed: end })?;

    Ok((format!("XML {}", body.trim_end_matches(['\r', '\n'])), end))
}

/// Parses the byte count from an `XML <n>` header line.
///
/// Returns `None` for every other line, including `XML` followed by
/// anything that is not a plain decimal number.
fn snapshot_body_len(header: &str) -> Option<usize> {
    let rest = header.strip_prefix("XML ")?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
