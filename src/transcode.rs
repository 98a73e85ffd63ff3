//! Text transcoding for stored strings
//!
//! QQWry strings are GBK encoded. The [`Transcoder`] trait keeps the
//! conversion separate from lookup logic so tests and callers with
//! re-encoded databases can swap it out.

use encoding_rs::GBK;

/// Converts raw record bytes into UTF-8 text
///
/// Implementations must not fail: undecodable input is replaced, not
/// rejected.
pub trait Transcoder: Send + Sync {
    /// Decode `bytes` into a `String`
    fn transcode(&self, bytes: &[u8]) -> String;

    /// Short name used in diagnostics
    fn name(&self) -> &'static str;
}

/// GBK decoder (the encoding QQWry files ship with)
#[derive(Debug, Clone, Copy, Default)]
pub struct Gbk;

impl Transcoder for Gbk {
    fn transcode(&self, bytes: &[u8]) -> String {
        // Record strings are GBK even when they start like a BOM.
        // Invalid sequences become U+FFFD
        let (text, had_errors) = GBK.decode_without_bom_handling(bytes);
        if had_errors {
            log::debug!("GBK decoding replaced invalid bytes in {:02x?}", bytes);
        }
        text.into_owned()
    }

    fn name(&self) -> &'static str {
        "gbk"
    }
}

/// Lossy UTF-8 decoder for databases whose strings were re-encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Lossy;

impl Transcoder for Utf8Lossy {
    fn transcode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn name(&self) -> &'static str {
        "utf-8"
    }
}
