// Encode/decode options handed to xdelta3.
//
// The secondary-compressor names and source-window sizes are fixed tables;
// callers pick entries by index, the way settings UIs present them.

use std::fmt;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_COMPRESSION_LEVEL: u8 = 0;
pub const MAX_COMPRESSION_LEVEL: u8 = 9;
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 5;

/// Source window sizes selectable with `SourceWindow::from_selector(1..=8)`.
pub const SOURCE_WINDOW_SIZES: [u64; 8] = [
    8 << 20,
    16 << 20,
    32 << 20,
    64 << 20,
    128 << 20,
    256 << 20,
    512 << 20,
    1024 << 20,
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("compression level {0} out of range 0-9")]
    CompressionLevel(u8),
    #[error("secondary compression index {0} out of range 0-3")]
    SecondaryIndex(usize),
    #[error("unknown secondary compressor '{0}'")]
    SecondaryName(String),
    #[error("source window selector {0} out of range 0-8")]
    WindowSelector(usize),
    #[error("source window size {0} is not one of the supported sizes")]
    WindowSize(u64),
}

// ---------------------------------------------------------------------------
// Secondary compression
// ---------------------------------------------------------------------------

/// Secondary compressor applied by xdelta3 to its delta sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecondaryCompression {
    Lzma,
    Djw,
    Fgk,
    #[default]
    None,
}

impl SecondaryCompression {
    /// Every compressor, in index order.
    pub const ALL: [Self; 4] = [Self::Lzma, Self::Djw, Self::Fgk, Self::None];

    /// Name passed to xdelta3's `-S`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Lzma => "lzma",
            Self::Djw => "djw",
            Self::Fgk => "fgk",
            Self::None => "none",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Self, ConfigError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ConfigError::SecondaryIndex(index))
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::SecondaryName(name.to_string()))
    }
}

impl fmt::Display for SecondaryCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Source window
// ---------------------------------------------------------------------------

/// Source window size: automatic, or one entry of [`SOURCE_WINDOW_SIZES`].
///
/// Selector 0 is automatic; selectors 1 through 8 pick the table entries in
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceWindow {
    selector: u8,
}

impl SourceWindow {
    pub const AUTO: Self = Self { selector: 0 };

    pub fn from_selector(selector: usize) -> Result<Self, ConfigError> {
        if selector > SOURCE_WINDOW_SIZES.len() {
            return Err(ConfigError::WindowSelector(selector));
        }
        Ok(Self {
            selector: selector as u8,
        })
    }

    /// Look up an exact size from the table.
    pub fn from_bytes(bytes: u64) -> Result<Self, ConfigError> {
        SOURCE_WINDOW_SIZES
            .iter()
            .position(|&size| size == bytes)
            .map(|i| Self {
                selector: i as u8 + 1,
            })
            .ok_or(ConfigError::WindowSize(bytes))
    }

    pub fn selector(self) -> usize {
        self.selector as usize
    }

    pub fn is_auto(self) -> bool {
        self.selector == 0
    }

    /// Window size in bytes, or `None` when xdelta3 sizes it itself.
    pub fn bytes(self) -> Option<u64> {
        match self.selector {
            0 => None,
            n => Some(SOURCE_WINDOW_SIZES[n as usize - 1]),
        }
    }
}

impl fmt::Display for SourceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes() {
            None => f.write_str("auto"),
            Some(bytes) => write!(f, "{} MiB", bytes >> 20),
        }
    }
}

// ---------------------------------------------------------------------------
// PatchConfig
// ---------------------------------------------------------------------------

/// Options for one encode or decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchConfig {
    /// Write (encode) or verify (decode) Adler-32 window checksums.
    pub checksum: bool,
    /// Replace an existing output file.
    pub overwrite: bool,
    compression_level: u8,
    secondary: SecondaryCompression,
    source_window: SourceWindow,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            checksum: true,
            overwrite: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            secondary: SecondaryCompression::default(),
            source_window: SourceWindow::AUTO,
        }
    }
}

impl PatchConfig {
    pub fn compression_level(&self) -> u8 {
        self.compression_level
    }

    pub fn set_compression_level(&mut self, level: u8) -> Result<(), ConfigError> {
        if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&level) {
            return Err(ConfigError::CompressionLevel(level));
        }
        self.compression_level = level;
        Ok(())
    }

    pub fn secondary(&self) -> SecondaryCompression {
        self.secondary
    }

    pub fn set_secondary(&mut self, secondary: SecondaryCompression) {
        self.secondary = secondary;
    }

    pub fn set_secondary_index(&mut self, index: usize) -> Result<(), ConfigError> {
        self.secondary = SecondaryCompression::from_index(index)?;
        Ok(())
    }

    pub fn source_window(&self) -> SourceWindow {
        self.source_window
    }

    pub fn set_source_window(&mut self, window: SourceWindow) {
        self.source_window = window;
    }

    pub fn set_source_window_index(&mut self, selector: usize) -> Result<(), ConfigError> {
        self.source_window = SourceWindow::from_selector(selector)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
