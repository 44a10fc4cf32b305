// A patch file on disk: its description, its options, and the runs that
// create or apply it.

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::command::{self, Operation};
use crate::config::PatchConfig;
use crate::description::{self, Probe};
use crate::engine::{DeltaEngine, Outcome};
use crate::vcdiff::header::{self, FileHeader};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("output file exists, enable overwrite to replace it: {}", .0.display())]
    OutputExists(PathBuf),
    #[error("output must differ from the patch being read: {}", .0.display())]
    InPlace(PathBuf),
    #[error("{role} file not found: {}", .path.display())]
    InputMissing { role: InputRole, path: PathBuf },
    #[error("{role} file is empty: {}", .path.display())]
    InputEmpty { role: InputRole, path: PathBuf },
}

/// The part an input file plays in an encode or decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Original,
    Modified,
    Patch,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Original => "Original ROM",
            Self::Modified => "Modified ROM",
            Self::Patch => "Patch",
        })
    }
}

/// Status of a run whose inputs were rejected before the engine started.
pub const INPUT_REJECTED: i32 = -1;

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// Whether a [`Patch`] was opened to be applied or to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
    Read,
    Write,
}

#[derive(Debug, Clone)]
pub struct Patch {
    path: PathBuf,
    mode: PatchMode,
    config: PatchConfig,
    description: String,
}

impl Patch {
    /// Open an existing patch and read its description.
    ///
    /// A patch that cannot be opened, is not VCDIFF, or carries no
    /// description yields an empty description; the reason is logged.
    /// Use [`description::probe_file`] to tell these cases apart.
    pub fn open_for_read(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let description = match description::probe_file(&path) {
            Ok(Probe::Described(text)) => text,
            Ok(Probe::Absent(reason)) => {
                log::debug!("{}: no description: {reason}", path.display());
                String::new()
            }
            Err(e) => {
                log::debug!("{}: cannot read header: {e}", path.display());
                String::new()
            }
        };
        Self {
            path,
            mode: PatchMode::Read,
            config: PatchConfig::default(),
            description,
        }
    }

    /// Name a patch to be created by [`Patch::encode`].
    pub fn open_for_write(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: PatchMode::Write,
            config: PatchConfig::default(),
            description: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> PatchMode {
        self.mode
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PatchConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: PatchConfig) {
        self.config = config;
    }

    /// Application-header token for the current description.
    pub fn encode_description(&self) -> String {
        description::encode_token(&self.description)
    }

    /// Check that `original` and this patch exist and are not empty.
    pub fn check_decode_inputs(&self, original: &Path) -> Result<(), PatchError> {
        check_inputs(&[
            (InputRole::Original, original),
            (InputRole::Patch, self.path.as_path()),
        ])
    }

    /// Check that `original` and `modified` exist and are not empty.
    pub fn check_encode_inputs(&self, original: &Path, modified: &Path) -> Result<(), PatchError> {
        check_inputs(&[
            (InputRole::Original, original),
            (InputRole::Modified, modified),
        ])
    }

    /// Apply this patch to `original`, writing the result to `output`.
    ///
    /// The engine is not run if an input is missing or empty; the outcome
    /// then carries [`INPUT_REJECTED`] and the reason.
    pub fn decode<E: DeltaEngine + ?Sized>(
        &self,
        engine: &mut E,
        original: &Path,
        output: &Path,
    ) -> Outcome {
        if let Err(e) = self.check_decode_inputs(original) {
            return rejected(e);
        }
        let args = command::build_args(
            &self.config,
            &Operation::Decode {
                original,
                patch: &self.path,
                output,
            },
        );
        log::info!(
            "decoding {} with {} -> {}",
            original.display(),
            self.path.display(),
            output.display()
        );
        report(engine.decode(&args).into())
    }

    /// Create this patch from `original` and `modified`.
    ///
    /// Inputs are checked as in [`Patch::decode`].
    pub fn encode<E: DeltaEngine + ?Sized>(
        &self,
        engine: &mut E,
        original: &Path,
        modified: &Path,
    ) -> Outcome {
        if let Err(e) = self.check_encode_inputs(original, modified) {
            return rejected(e);
        }
        let app_header = self.encode_description();
        let args = command::build_args(
            &self.config,
            &Operation::Encode {
                original,
                modified,
                patch: &self.path,
                app_header: &app_header,
            },
        );
        log::info!(
            "encoding {} -> {} into {}",
            original.display(),
            modified.display(),
            self.path.display()
        );
        report(engine.encode(&args).into())
    }

    /// Write a copy of this patch to `output` carrying the current
    /// description, without re-running the engine.
    ///
    /// The copy is written to a staging file beside `output` and renamed
    /// into place, so a failed relabel leaves an existing `output` intact.
    pub fn relabel(&self, output: &Path) -> Result<u64, PatchError> {
        if same_file(&self.path, output) {
            return Err(PatchError::InPlace(output.to_path_buf()));
        }
        if !self.config.overwrite && output.exists() {
            return Err(PatchError::OutputExists(output.to_path_buf()));
        }

        let mut reader = BufReader::new(File::open(&self.path)?);
        let app_header = self.encode_description();
        let hdr = header::read_patch_header(&mut reader)?.relabelled(app_header.as_bytes());

        let staging = staging_path(output);
        if same_file(&self.path, &staging) {
            return Err(PatchError::InPlace(staging));
        }
        let copied = match write_relabelled(&staging, &hdr, &mut reader)
            .and_then(|copied| fs::rename(&staging, output).map(|()| copied))
        {
            Ok(copied) => copied,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&staging) {
                    log::debug!("{}: {cleanup}", staging.display());
                }
                return Err(e.into());
            }
        };

        log::info!(
            "relabelled {} -> {} ({copied} window bytes)",
            self.path.display(),
            output.display()
        );
        Ok(copied)
    }
}

fn write_relabelled<R: Read>(path: &Path, hdr: &FileHeader, reader: &mut R) -> io::Result<u64> {
    let mut writer = BufWriter::new(File::create(path)?);
    hdr.encode(&mut writer)?;
    let copied = io::copy(reader, &mut writer)?;
    writer.flush()?;
    Ok(copied)
}

/// `.<name>.relabel` in the directory of `output`.
fn staging_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(output.file_name().unwrap_or_default());
    name.push(".relabel");
    output.with_file_name(name)
}

/// Every input must exist before any is checked for emptiness.
fn check_inputs(inputs: &[(InputRole, &Path)]) -> Result<(), PatchError> {
    let mut sizes = Vec::with_capacity(inputs.len());
    for &(role, path) in inputs {
        match fs::metadata(path) {
            Ok(meta) => sizes.push(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PatchError::InputMissing {
                    role,
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
    for (&(role, path), len) in inputs.iter().zip(sizes) {
        if len == 0 {
            return Err(PatchError::InputEmpty {
                role,
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn rejected(e: PatchError) -> Outcome {
    log::warn!("{e}");
    let message = e.to_string();
    Outcome {
        status: INPUT_REJECTED,
        log: message.clone(),
        message,
    }
}

fn report(outcome: Outcome) -> Outcome {
    if outcome.is_success() {
        log::debug!("engine finished: {}", outcome.log.trim_end());
    } else {
        log::warn!("engine failed with status {}: {}", outcome.status, outcome.message);
    }
    outcome
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
