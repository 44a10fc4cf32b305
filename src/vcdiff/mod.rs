// VCDIFF (RFC 3284) file-header support.
//
// Only as much of the format as is needed to locate and replace the
// application header of an xdelta3 patch: the delta windows themselves are
// produced and consumed by xdelta3.
//
// # Modules
//
// - `varint` — Variable-length integer encoding (base-128, big-endian)
// - `header` — File header encoding/decoding and app-header rewriting

pub mod header;
pub mod varint;

pub use header::{
    Absent, FileHeader, HeaderIndicator, HeaderRead, VCDIFF_MAGIC, VCDIFF_VERSION,
    read_patch_header,
};
