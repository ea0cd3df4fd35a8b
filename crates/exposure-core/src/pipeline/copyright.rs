//! Copyright tagging of encoded JPEG streams.
//!
//! A minimal TIFF structure holding a single IFD0 `Copyright` field is written
//! with kamadak-exif and spliced into the JPEG as an `APP1` Exif segment.
//! Embedding is best-effort: on any error the caller gets back the bytes it
//! passed in, untouched, together with the error.

use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use std::io::Cursor;
use std::time::{Duration, Instant};

use crate::error::PipelineError;

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Largest payload a segment length field can describe.
const MAX_SEGMENT_PAYLOAD: usize = 0xFFFF - 2;

/// Result of an embedding attempt.
#[derive(Debug)]
pub struct EmbedOutcome {
    /// Tagged bytes on success, the original bytes otherwise
    pub bytes: Vec<u8>,
    /// Why the tag could not be embedded
    pub error: Option<PipelineError>,
    /// Time spent
    pub elapsed: Duration,
}

impl EmbedOutcome {
    pub fn embedded(&self) -> bool {
        self.error.is_none()
    }
}

/// Writes a fixed copyright string into JPEG metadata.
pub struct CopyrightEmbedder {
    copyright: String,
}

impl CopyrightEmbedder {
    pub fn new(copyright: impl Into<String>) -> Self {
        Self {
            copyright: copyright.into(),
        }
    }

    /// Embed the copyright tag, falling back to the input on failure.
    ///
    /// Never fails: errors are logged and returned alongside the original
    /// buffer so the asset is still written.
    pub fn embed(&self, jpeg: Vec<u8>, name: &str) -> EmbedOutcome {
        let start = Instant::now();
        match self.try_embed(&jpeg, name) {
            Ok(bytes) => EmbedOutcome {
                bytes,
                error: None,
                elapsed: start.elapsed(),
            },
            Err(e) => {
                let elapsed = start.elapsed();
                tracing::error!("{name}: copyright embed failed after {elapsed:?}: {e}");
                EmbedOutcome {
                    bytes: jpeg,
                    error: Some(e),
                    elapsed,
                }
            }
        }
    }

    /// Embed the copyright tag into a new buffer.
    pub fn try_embed(&self, jpeg: &[u8], name: &str) -> Result<Vec<u8>, PipelineError> {
        let fail = |message: String| PipelineError::MetadataEmbed {
            name: name.to_string(),
            message,
        };

        let tiff = self.tiff_block().map_err(|e| fail(e.to_string()))?;
        splice_exif(jpeg, &tiff).map_err(fail)
    }

    /// Serialize the single-tag TIFF structure.
    fn tiff_block(&self) -> Result<Vec<u8>, exif::Error> {
        let field = Field {
            tag: Tag::Copyright,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![self.copyright.as_bytes().to_vec()]),
        };
        let mut writer = Writer::new();
        writer.push_field(&field);

        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, false)?;
        Ok(buf.into_inner())
    }
}

/// Read the Copyright tag back out of a JPEG, if present.
pub fn copyright_of(jpeg: &[u8]) -> Option<String> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(jpeg))
        .ok()?;
    let field = exif.get_field(Tag::Copyright, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|p| String::from_utf8_lossy(p).into_owned()),
        _ => None,
    }
}

/// Insert `tiff` as an `APP1` Exif segment.
///
/// The segment goes right after `SOI`, or after a leading `APP0` (JFIF) so
/// that JFIF stays first. Existing Exif `APP1` segments are dropped. Only the
/// marker segments before the scan are parsed; entropy-coded data is copied
/// through verbatim.
fn splice_exif(jpeg: &[u8], tiff: &[u8]) -> Result<Vec<u8>, String> {
    if jpeg.len() < 4 || jpeg[..2] != SOI {
        return Err("missing SOI marker".to_string());
    }
    let payload_len = EXIF_HEADER.len() + tiff.len();
    if payload_len > MAX_SEGMENT_PAYLOAD {
        return Err(format!(
            "Exif block of {payload_len} bytes exceeds the {MAX_SEGMENT_PAYLOAD}-byte segment limit"
        ));
    }

    let mut head = Vec::new(); // leading APP0 segments
    let mut segments = Vec::new(); // everything else before the scan
    let mut pos = 2;
    loop {
        if pos >= jpeg.len() {
            return Err("stream ended before start of scan".to_string());
        }
        if jpeg[pos] != 0xFF {
            return Err(format!("expected marker at offset {pos}"));
        }
        // Fill bytes
        let mut marker_pos = pos + 1;
        while marker_pos < jpeg.len() && jpeg[marker_pos] == 0xFF {
            marker_pos += 1;
        }
        let Some(&marker) = jpeg.get(marker_pos) else {
            return Err("truncated marker".to_string());
        };
        if marker == SOS || marker == EOI {
            break;
        }
        let standalone = marker == 0x01 || (0xD0..=0xD7).contains(&marker);
        let end = if standalone {
            marker_pos + 1
        } else {
            let len_bytes = jpeg
                .get(marker_pos + 1..marker_pos + 3)
                .ok_or_else(|| format!("truncated length for marker {marker:#04X}"))?;
            let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
            if len < 2 {
                return Err(format!("invalid length {len} for marker {marker:#04X}"));
            }
            let end = marker_pos + 1 + len;
            if end > jpeg.len() {
                return Err(format!("segment {marker:#04X} overruns the stream"));
            }
            end
        };

        let segment = &jpeg[pos..end];
        let is_exif = marker == APP1 && jpeg[marker_pos + 3..end].starts_with(EXIF_HEADER);
        if marker == APP0 && segments.is_empty() {
            head.push(segment);
        } else if !is_exif {
            segments.push(segment);
        }
        pos = end;
    }

    let mut out = Vec::with_capacity(jpeg.len() + payload_len + 4);
    out.extend_from_slice(&SOI);
    for segment in head {
        out.extend_from_slice(segment);
    }
    out.extend_from_slice(&[0xFF, APP1]);
    out.extend_from_slice(&((payload_len + 2) as u16).to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
    for segment in segments {
        out.extend_from_slice(segment);
    }
    out.extend_from_slice(&jpeg[pos..]);
    Ok(out)
}
