use std::process::Command;

use deltapatch::description;
use deltapatch::vcdiff::{FileHeader, HeaderIndicator};
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_deltapatch").to_string()
}

fn write_described_patch(path: &std::path::Path, text: &str) {
    let hdr = FileHeader {
        indicator: HeaderIndicator::APPHEADER,
        app_header: Some(description::encode_token(text).into_bytes()),
        ..Default::default()
    };
    let mut data = Vec::new();
    hdr.encode(&mut data).unwrap();
    std::fs::write(path, data).unwrap();
}

#[test]
fn cli_describe_prints_description() {
    let dir = tempdir().unwrap();
    let patch = dir.path().join("p.xdelta");
    write_described_patch(&patch, "Line one\r\nLine two");

    let out = Command::new(bin()).arg("describe").arg(&patch).output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "Line one\nLine two\n");
}

#[test]
fn cli_describe_json_reports_absence() {
    let dir = tempdir().unwrap();
    let patch = dir.path().join("junk.bin");
    std::fs::write(&patch, b"junk").unwrap();

    let out = Command::new(bin())
        .args(["--json", "describe"])
        .arg(&patch)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("\"description\": null"), "{stdout}");
    assert!(stdout.contains("not a VCDIFF stream"), "{stdout}");
}

#[test]
fn cli_describe_missing_file_fails() {
    let dir = tempdir().unwrap();
    let st = Command::new(bin())
        .arg("describe")
        .arg(dir.path().join("missing.xdelta"))
        .status()
        .unwrap();
    assert!(!st.success());
}

#[test]
fn cli_relabel_roundtrip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.xdelta");
    let output = dir.path().join("out.xdelta");
    write_described_patch(&input, "before");

    let st = Command::new(bin())
        .args(["relabel", "--description", "after"])
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin()).arg("describe").arg(&output).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&out.stdout), "after\n");
}

#[test]
fn cli_encode_without_xdelta3_fails() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a.bin");
    let modified = dir.path().join("b.bin");
    std::fs::write(&original, b"aaaa").unwrap();
    std::fs::write(&modified, b"aaab").unwrap();

    let out = Command::new(bin())
        .arg("--xdelta3")
        .arg(dir.path().join("no-such-xdelta3"))
        .args(["encode", "--source"])
        .arg(&original)
        .arg(&modified)
        .arg(dir.path().join("p.xdelta"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("encode failed"));
}

#[test]
fn cli_decode_reports_missing_original() {
    let dir = tempdir().unwrap();
    let patch = dir.path().join("p.xdelta");
    write_described_patch(&patch, "x");

    let out = Command::new(bin())
        .args(["decode", "--source"])
        .arg(dir.path().join("missing.bin"))
        .arg(&patch)
        .arg(dir.path().join("out.bin"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("decode failed: Original ROM file not found"), "{stderr}");
}

#[test]
fn cli_encode_reports_empty_modified() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a.bin");
    let modified = dir.path().join("b.bin");
    std::fs::write(&original, b"aaaa").unwrap();
    std::fs::write(&modified, b"").unwrap();

    let out = Command::new(bin())
        .args(["encode", "--source"])
        .arg(&original)
        .arg(&modified)
        .arg(dir.path().join("p.xdelta"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("encode failed: Modified ROM file is empty"), "{stderr}");
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("SECONDARY[3]=none"));
    assert!(stdout.contains("SOURCE_WINDOW[8]=1024 MiB"));
}
