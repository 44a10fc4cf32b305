// xdelta3 command-line assembly.
//
// xdelta3 takes its positional paths in a different order per mode:
//   encode: -s <original> <modified> <patch>
//   decode: -s <original> <patch> <output>

use std::ffi::OsString;
use std::path::Path;

use crate::config::PatchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Encode,
    Decode,
}

impl Mode {
    pub fn flag(self) -> &'static str {
        match self {
            Self::Encode => "-e",
            Self::Decode => "-d",
        }
    }
}

/// One xdelta3 run, with the paths it operates on.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Encode {
        original: &'a Path,
        modified: &'a Path,
        patch: &'a Path,
        /// Application-header token, see `description::encode_token`.
        app_header: &'a str,
    },
    Decode {
        original: &'a Path,
        patch: &'a Path,
        output: &'a Path,
    },
}

impl Operation<'_> {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Encode { .. } => Mode::Encode,
            Self::Decode { .. } => Mode::Decode,
        }
    }
}

/// Build the xdelta3 argument vector (without the program name).
pub fn build_args(config: &PatchConfig, op: &Operation<'_>) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(14);
    args.push(op.mode().flag().into());

    if !config.checksum {
        args.push("-n".into());
    }
    if config.overwrite {
        args.push("-f".into());
    }

    match *op {
        Operation::Encode {
            original,
            modified,
            patch,
            app_header,
        } => {
            args.push(format!("-{}", config.compression_level()).into());
            args.push("-S".into());
            args.push(config.secondary().name().into());
            if let Some(bytes) = config.source_window().bytes() {
                args.push("-B".into());
                args.push(bytes.to_string().into());
            }
            args.push(format!("-A={app_header}").into());

            args.push("-s".into());
            args.push(original.into());
            args.push(modified.into());
            args.push(patch.into());
        }
        Operation::Decode {
            original,
            patch,
            output,
        } => {
            args.push("-s".into());
            args.push(original.into());
            args.push(patch.into());
            args.push(output.into());
        }
    }

    args
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SecondaryCompression, SourceWindow};

    fn strings(args: &[OsString]) -> Vec<&str> {
        args.iter().map(|a| a.to_str().unwrap()).collect()
    }

    fn encode_op(app_header: &str) -> Operation<'_> {
        Operation::Encode {
            original: Path::new("A"),
            modified: Path::new("B"),
            patch: Path::new("P"),
            app_header,
        }
    }

    #[test]
    fn default_encode_args() {
        let args = build_args(&PatchConfig::default(), &encode_op("^*aGk="));
        assert_eq!(
            strings(&args),
            ["-e", "-f", "-5", "-S", "none", "-A=^*aGk=", "-s", "A", "B", "P"]
        );
    }

    #[test]
    fn default_decode_args() {
        let op = Operation::Decode {
            original: Path::new("A"),
            patch: Path::new("P"),
            output: Path::new("O"),
        };
        let args = build_args(&PatchConfig::default(), &op);
        assert_eq!(strings(&args), ["-d", "-f", "-s", "A", "P", "O"]);
    }

    #[test]
    fn decode_ignores_encode_only_options() {
        let mut config = PatchConfig::default();
        config.checksum = false;
        config.overwrite = false;
        config.set_compression_level(9).unwrap();
        config.set_source_window(SourceWindow::from_selector(3).unwrap());
        let op = Operation::Decode {
            original: Path::new("A"),
            patch: Path::new("P"),
            output: Path::new("O"),
        };
        assert_eq!(
            strings(&build_args(&config, &op)),
            ["-d", "-n", "-s", "A", "P", "O"]
        );
    }

    #[test]
    fn tuned_encode_args() {
        let mut config = PatchConfig::default();
        config.checksum = false;
        config.overwrite = false;
        config.set_compression_level(0).unwrap();
        config.set_secondary(SecondaryCompression::Lzma);
        config.set_source_window_index(8).unwrap();
        let args = build_args(&config, &encode_op("Created with Delta Patcher."));
        assert_eq!(
            strings(&args),
            [
                "-e",
                "-n",
                "-0",
                "-S",
                "lzma",
                "-B",
                "1073741824",
                "-A=Created with Delta Patcher.",
                "-s",
                "A",
                "B",
                "P"
            ]
        );
    }

    #[test]
    fn auto_window_omits_flag() {
        let args = build_args(&PatchConfig::default(), &encode_op("x"));
        assert!(!strings(&args).contains(&"-B"));
    }
}
