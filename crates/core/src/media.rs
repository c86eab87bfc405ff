//! Byte-signature media type detection.
//!
//! Classifies a file by its leading byte pattern, falling back to the
//! file-name extension when no signature matches. Detection is
//! deterministic for a given file and reads only a fixed-size prefix.

use std::path::Path;

use tokio::io::AsyncReadExt;

/// Number of leading bytes inspected for a signature match.
const SNIFF_PREFIX_LEN: usize = 64;

/// MP4 container brands accepted as audio (bytes 8..12 after `ftyp`).
const MP4_AUDIO_BRANDS: [&[u8; 4]; 4] = [b"M4A ", b"isom", b"mp41", b"mp42"];

/// PNG 8-byte file signature.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Media type of a retrieved artifact, as inferred from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Png,
    Mp4Audio,
    MpegAudio,
    /// Unrecognized content; served as an opaque byte stream.
    Binary,
}

impl MediaType {
    /// MIME type for the `Content-Type` header.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Mp4Audio => "audio/mp4",
            Self::MpegAudio => "audio/mpeg",
            Self::Binary => "application/octet-stream",
        }
    }

    /// Suggested file-name extension, empty for unrecognized content.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Png => ".png",
            Self::Mp4Audio => ".m4a",
            Self::MpegAudio => ".mp3",
            Self::Binary => "",
        }
    }
}

/// Classify the file at `path`, signature first, extension fallback.
pub async fn sniff(path: &Path) -> std::io::Result<MediaType> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut header = [0u8; SNIFF_PREFIX_LEN];
    let mut filled = 0;
    // A short file may deliver the prefix across several reads.
    while filled < header.len() {
        let n = file.read(&mut header[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    Ok(classify_signature(&header[..filled])
        .or_else(|| classify_extension(path))
        .unwrap_or(MediaType::Binary))
}

/// Match the leading bytes against known signatures. First match wins.
fn classify_signature(header: &[u8]) -> Option<MediaType> {
    if header.starts_with(b"%PDF-") {
        return Some(MediaType::Pdf);
    }
    if header.starts_with(&PNG_SIGNATURE) {
        return Some(MediaType::Png);
    }

    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        let brand: &[u8] = &header[8..12];
        if MP4_AUDIO_BRANDS.iter().any(|b| &b[..] == brand) {
            return Some(MediaType::Mp4Audio);
        }
    }

    if header.starts_with(b"ID3") {
        return Some(MediaType::MpegAudio);
    }
    // MPEG audio frame sync: 0xFF then the top three bits of the second
    // byte set.
    if header.len() >= 2 && header[0] == 0xFF && (header[1] & 0xE0) == 0xE0 {
        return Some(MediaType::MpegAudio);
    }

    None
}

/// Map the file-name extension through the same type table.
fn classify_extension(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(MediaType::Pdf),
        "png" => Some(MediaType::Png),
        "mp3" => Some(MediaType::MpegAudio),
        "m4a" | "mp4" => Some(MediaType::Mp4Audio),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
