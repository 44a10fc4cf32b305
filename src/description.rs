// Patch descriptions carried in the VCDIFF application header.
//
// A described patch stores `^*` followed by the base64 of the UTF-8
// description. Anything else in the application header (xdelta3 writes
// `source//target/` by default) means the patch has no description.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{self, GeneralPurpose, GeneralPurposeConfig};

use crate::vcdiff::header::{self, Absent};

/// Marker identifying a base64 description.
pub const SENTINEL: &[u8; 2] = b"^*";

/// Application header written when the description is empty.
pub const DEFAULT_DESCRIPTION: &str = "Created with Delta Patcher.";

/// Standard alphabet, accepting payloads with or without `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Result of looking for a description in a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Described(String),
    Absent(Absent),
}

impl Probe {
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Described(text) => Some(text),
            Self::Absent(_) => None,
        }
    }

    /// The description, or an empty string when there is none.
    pub fn into_description(self) -> String {
        match self {
            Self::Described(text) => text,
            Self::Absent(_) => String::new(),
        }
    }
}

/// Build the application-header token for `description`.
pub fn encode_token(description: &str) -> String {
    if description.is_empty() {
        return DEFAULT_DESCRIPTION.to_string();
    }
    let mut token = String::with_capacity(2 + description.len().div_ceil(3) * 4);
    token.push_str("^*");
    general_purpose::STANDARD.encode_string(description.as_bytes(), &mut token);
    token
}

/// Extract the description from raw application-header bytes.
///
/// The field is inspected as a NUL-terminated string: bytes after the first
/// NUL are ignored. Line endings are normalised with
/// [`normalize_line_endings`].
pub fn decode_token(app_header: &[u8]) -> Result<String, Absent> {
    if app_header.len() < SENTINEL.len() {
        return Err(Absent::TooShort(app_header.len()));
    }
    if !app_header.starts_with(SENTINEL) {
        return Err(Absent::NoSentinel);
    }

    let payload = &app_header[SENTINEL.len()..];
    let payload = match payload.iter().position(|&b| b == 0) {
        Some(nul) => &payload[..nul],
        None => payload,
    };
    let payload: Vec<u8> = payload
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let raw = LENIENT
        .decode(&payload)
        .map_err(|_| Absent::InvalidEncoding)?;
    let text = String::from_utf8_lossy(&raw);
    Ok(normalize_line_endings(&text).into_owned())
}

/// Convert `\r\n` and lone `\r` to `\n`.
///
/// Matches are taken leftmost-first and never overlap, so `\r\r\n` becomes
/// `\n\n`. Applying this twice gives the same result as applying it once.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Look for a description in a patch stream positioned at offset 0.
///
/// Malformed, truncated and undescribed patches give `Probe::Absent`; only
/// I/O failures other than a short read are returned as errors.
pub fn probe<R: Read>(r: &mut R) -> io::Result<Probe> {
    let app_header = match header::read_app_header(r)? {
        Ok(data) => data,
        Err(reason) => return Ok(Probe::Absent(reason)),
    };
    Ok(match decode_token(&app_header) {
        Ok(text) => Probe::Described(text),
        Err(reason) => Probe::Absent(reason),
    })
}

/// [`probe`] on the file at `path`.
pub fn probe_file(path: &Path) -> io::Result<Probe> {
    let file = File::open(path)?;
    probe(&mut BufReader::new(file))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
