// VCDIFF file header (RFC 3284, Section 4.1) as written by xdelta3.
//
// Only the file-level prologue is handled here: magic, version, header
// indicator, the optional secondary-compressor id and code-table fields, and
// the application header. Window data following the header is opaque.

use std::io::{self, Read, Write};

use bitflags::bitflags;

use super::varint;

// ---------------------------------------------------------------------------
// Magic and version
// ---------------------------------------------------------------------------

pub const VCDIFF_MAGIC: [u8; 3] = [0xD6, 0xC3, 0xC4];

/// The only version byte xdelta3 writes.
pub const VCDIFF_VERSION: u8 = 0x00;

bitflags! {
    /// Header indicator byte (`hdr_ind`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HeaderIndicator: u8 {
        /// A one-byte secondary compressor id follows.
        const SECONDARY = 1 << 0;
        /// A length-prefixed custom code table follows.
        const CODETABLE = 1 << 1;
        /// A length-prefixed application header follows.
        const APPHEADER = 1 << 2;
    }
}

// ---------------------------------------------------------------------------
// Absence reasons
// ---------------------------------------------------------------------------

/// Why a patch carries no description this crate understands.
///
/// None of these are failures: plenty of valid patches have no description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Absent {
    #[error("not a VCDIFF stream (magic {0:02X?})")]
    BadMagic([u8; 3]),
    #[error("unsupported VCDIFF version {0:#04X}")]
    UnsupportedVersion(u8),
    #[error("header has no application header")]
    NoAppHeader,
    #[error("header is truncated")]
    Truncated,
    #[error("header contains a malformed length")]
    Malformed,
    #[error("application header too short ({0} bytes)")]
    TooShort(usize),
    #[error("application header does not start with the description sentinel")]
    NoSentinel,
    #[error("description payload is not valid base64")]
    InvalidEncoding,
}

// ---------------------------------------------------------------------------
// File header
// ---------------------------------------------------------------------------

/// Parsed VCDIFF file header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    pub indicator: HeaderIndicator,
    /// Secondary compressor id (present iff `SECONDARY`).
    pub secondary_id: Option<u8>,
    /// Raw code-table field (present iff `CODETABLE`), kept so a rewritten
    /// header stays byte-compatible.
    pub code_table: Option<Vec<u8>>,
    /// Application-defined header data (present iff `APPHEADER`).
    pub app_header: Option<Vec<u8>>,
}

/// Outcome of reading a file header from an arbitrary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderRead {
    Parsed(FileHeader),
    Rejected(Absent),
}

impl FileHeader {
    /// Encode the file header.
    ///
    /// Emission order matches xdelta3: magic, version, hdr_ind,
    /// [secondary id], [code table], [app header].
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&VCDIFF_MAGIC)?;
        w.write_all(&[VCDIFF_VERSION, self.indicator.bits()])?;

        if self.indicator.contains(HeaderIndicator::SECONDARY) {
            w.write_all(&[self.secondary_id.unwrap_or(0)])?;
        }

        if self.indicator.contains(HeaderIndicator::CODETABLE) {
            write_field(w, self.code_table.as_deref())?;
        }

        if self.indicator.contains(HeaderIndicator::APPHEADER) {
            write_field(w, self.app_header.as_deref())?;
        }

        Ok(())
    }

    /// Decode a file header, reading exactly the header bytes from `r`.
    ///
    /// Unrecognised or truncated prologues are reported as
    /// `HeaderRead::Rejected`; only genuine I/O failures are `Err`.
    pub fn decode<R: Read>(r: &mut R) -> io::Result<HeaderRead> {
        match decode_strict(r) {
            Ok(read) => Ok(read),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Ok(HeaderRead::Rejected(Absent::Truncated))
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(HeaderRead::Rejected(Absent::Malformed))
            }
            Err(e) => Err(e),
        }
    }
}

fn decode_strict<R: Read>(r: &mut R) -> io::Result<HeaderRead> {
    let mut magic = [0u8; 3];
    r.read_exact(&mut magic)?;
    if magic != VCDIFF_MAGIC {
        return Ok(HeaderRead::Rejected(Absent::BadMagic(magic)));
    }

    let mut buf1 = [0u8; 1];
    r.read_exact(&mut buf1)?;
    if buf1[0] != VCDIFF_VERSION {
        return Ok(HeaderRead::Rejected(Absent::UnsupportedVersion(buf1[0])));
    }

    r.read_exact(&mut buf1)?;
    let indicator = HeaderIndicator::from_bits_retain(buf1[0]);

    let secondary_id = if indicator.contains(HeaderIndicator::SECONDARY) {
        r.read_exact(&mut buf1)?;
        Some(buf1[0])
    } else {
        None
    };

    let code_table = if indicator.contains(HeaderIndicator::CODETABLE) {
        Some(read_field(r)?)
    } else {
        None
    };

    let app_header = if indicator.contains(HeaderIndicator::APPHEADER) {
        Some(read_field(r)?)
    } else {
        None
    };

    Ok(HeaderRead::Parsed(FileHeader {
        indicator,
        secondary_id,
        code_table,
        app_header,
    }))
}

/// Read a varint length followed by that many bytes.
///
/// Reads through `take` so a bogus length cannot force a huge allocation.
fn read_field<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let len = varint::stream_read_u64(r)?;
    let mut data = Vec::new();
    r.by_ref().take(len).read_to_end(&mut data)?;
    if (data.len() as u64) < len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(data)
}

fn write_field<W: Write>(w: &mut W, data: Option<&[u8]>) -> io::Result<()> {
    let data = data.unwrap_or_default();
    varint::write_usize(w, data.len())?;
    w.write_all(data)
}

// ---------------------------------------------------------------------------
// Application header access
// ---------------------------------------------------------------------------

/// Read the application header of a patch stream positioned at offset 0.
pub fn read_app_header<R: Read>(r: &mut R) -> io::Result<Result<Vec<u8>, Absent>> {
    match FileHeader::decode(r)? {
        HeaderRead::Parsed(FileHeader {
            app_header: Some(data),
            ..
        }) => Ok(Ok(data)),
        HeaderRead::Parsed(_) => Ok(Err(Absent::NoAppHeader)),
        HeaderRead::Rejected(reason) => Ok(Err(reason)),
    }
}

/// Decode the file header of a patch stream, failing with `InvalidData` if
/// `r` is not a VCDIFF stream.
pub fn read_patch_header<R: Read>(r: &mut R) -> io::Result<FileHeader> {
    match FileHeader::decode(r)? {
        HeaderRead::Parsed(hdr) => Ok(hdr),
        HeaderRead::Rejected(reason) => Err(io::Error::new(io::ErrorKind::InvalidData, reason)),
    }
}

impl FileHeader {
    /// This header with its application header replaced and the
    /// `APPHEADER` bit set. Every other field is kept as read.
    pub fn relabelled(mut self, app_header: &[u8]) -> Self {
        self.indicator |= HeaderIndicator::APPHEADER;
        self.app_header = Some(app_header.to_vec());
        self
    }
}

/// Copy a patch from `r` to `w`, replacing its application header.
///
/// Every byte after the file header is copied unchanged. Returns the number
/// of window bytes copied. Nothing is written to `w` if `r` is not a VCDIFF
/// stream.
pub fn rewrite_app_header<R: Read, W: Write>(
    r: &mut R,
    w: &mut W,
    app_header: &[u8],
) -> io::Result<u64> {
    let hdr = read_patch_header(r)?.relabelled(app_header);
    hdr.encode(w)?;
    io::copy(r, w)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
