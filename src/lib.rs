//! Deltapatch: xdelta3 patches with embedded descriptions.
//!
//! The crate provides:
//! - VCDIFF file-header parsing and rewriting (`vcdiff`)
//! - The `^*`+base64 description codec (`description`)
//! - xdelta3 options and argument assembly (`config`, `command`)
//! - The delta engine boundary and an xdelta3 process driver (`engine`)
//! - A patch-file facade tying these together (`patch`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use deltapatch::engine::Xdelta3Process;
//! use deltapatch::patch::Patch;
//!
//! let mut engine = Xdelta3Process::default();
//!
//! let mut patch = Patch::open_for_write("game.xdelta");
//! patch.set_description("Translation patch v1.0");
//! let outcome = patch.encode(&mut engine, Path::new("game.bin"), Path::new("game-en.bin"));
//! assert!(outcome.is_success(), "{}", outcome.message);
//!
//! let patch = Patch::open_for_read("game.xdelta");
//! assert_eq!(patch.description(), "Translation patch v1.0");
//! ```

pub mod command;
pub mod config;
pub mod description;
pub mod engine;
pub mod patch;
pub mod vcdiff;

#[cfg(feature = "cli")]
pub mod cli;
