//! Framing of the raw composite-HID byte stream.
//!
//! The physical keyboard/mouse device node delivers a concatenation of
//! fixed-length reports. The first byte of each report is the report type and
//! fully determines its length:
//!
//! ```text
//! 1  keyboard  9 bytes   [1, modifiers, 0, k0..k5]
//! 2  media     4 bytes   [2, bits1, bits2, bits3]
//! 5  mouse     7 bytes   [5, button, p0, p1, p2, y_scroll, x_scroll]
//! ```
//!
//! An unknown type byte means the stream lost alignment; the reader skips one
//! byte at a time until a known type byte comes around again.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::warn;

use hidswitch_core::report::{
    KEYS_REPORT_ID, KEYS_REPORT_LEN, MEDIA_REPORT_ID, MEDIA_REPORT_LEN, MOUSE_REPORT_ID,
    MOUSE_REPORT_LEN,
};

/// One framed report off the physical device, still undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawReport {
    Keyboard([u8; KEYS_REPORT_LEN]),
    Media([u8; MEDIA_REPORT_LEN]),
    Mouse([u8; MOUSE_REPORT_LEN]),
}

/// Pulls framed reports out of any byte stream.
pub struct ReportStream<R> {
    reader: R,
}

impl<R: AsyncRead + Unpin> ReportStream<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next complete report. Returns `Ok(None)` on a clean end of
    /// stream; an end of stream in the middle of a report is an error.
    pub async fn next_report(&mut self) -> std::io::Result<Option<RawReport>> {
        loop {
            let mut type_byte = [0u8; 1];
            match self.reader.read_exact(&mut type_byte).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e),
            }

            match type_byte[0] {
                KEYS_REPORT_ID => {
                    let mut bytes = [0u8; KEYS_REPORT_LEN];
                    bytes[0] = KEYS_REPORT_ID;
                    self.reader.read_exact(&mut bytes[1..]).await?;
                    return Ok(Some(RawReport::Keyboard(bytes)));
                }
                MEDIA_REPORT_ID => {
                    let mut bytes = [0u8; MEDIA_REPORT_LEN];
                    bytes[0] = MEDIA_REPORT_ID;
                    self.reader.read_exact(&mut bytes[1..]).await?;
                    return Ok(Some(RawReport::Media(bytes)));
                }
                MOUSE_REPORT_ID => {
                    let mut bytes = [0u8; MOUSE_REPORT_LEN];
                    bytes[0] = MOUSE_REPORT_ID;
                    self.reader.read_exact(&mut bytes[1..]).await?;
                    return Ok(Some(RawReport::Mouse(bytes)));
                }
                unknown => {
                    warn!(byte = unknown, "skipping byte with unknown report type");
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
