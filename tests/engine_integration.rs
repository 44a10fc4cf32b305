// Drives `Xdelta3Process` against a stand-in shell script that records its
// arguments, so the real xdelta3 is not needed.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use deltapatch::engine::Xdelta3Process;
use deltapatch::patch::Patch;
use tempfile::tempdir;

fn fake_xdelta3(dir: &Path, status: i32) -> PathBuf {
    let script = dir.join("xdelta3");
    let log = dir.join("args.txt");
    let body = format!(
        "#!/bin/sh\n\
         for a in \"$@\"; do echo \"$a\" >> '{}'; done\n\
         echo \"xdelta3: fake run $1\" >&2\n\
         echo \"xdelta3: detail\" >&2\n\
         exit {status}\n",
        log.display()
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Non-empty `A`, `B` and `P` inside `dir`.
fn inputs(dir: &Path) -> [PathBuf; 3] {
    ["A", "B", "P"].map(|name| {
        let path = dir.join(name);
        fs::write(&path, b"data").unwrap();
        path
    })
}

#[test]
fn process_engine_passes_args_and_reports_status() {
    let dir = tempdir().unwrap();
    let files = tempdir().unwrap();
    let [a, b, p] = inputs(files.path());
    let mut engine = Xdelta3Process::new(fake_xdelta3(dir.path(), 0));

    let mut patch = Patch::open_for_write(&p);
    patch.set_description("hi");
    let outcome = patch.encode(&mut engine, &a, &b);
    assert!(outcome.is_success());
    assert_eq!(outcome.message, "xdelta3: fake run -e");
    assert_eq!(outcome.log, "xdelta3: fake run -e\nxdelta3: detail\n");

    let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
    let args: Vec<_> = args.lines().collect();
    let (a, b, p) = (a.to_str().unwrap(), b.to_str().unwrap(), p.to_str().unwrap());
    assert_eq!(
        args,
        ["-e", "-f", "-5", "-S", "none", "-A=^*aGk=", "-s", a, b, p]
    );

    let failing = tempdir().unwrap();
    let mut engine = Xdelta3Process::new(fake_xdelta3(failing.path(), 3));
    let outcome = Patch::open_for_read(p).decode(
        &mut engine,
        Path::new(a),
        &files.path().join("O"),
    );
    assert_eq!(outcome.status, 3);
    assert_eq!(outcome.message, "xdelta3: fake run -d");
}

#[test]
fn process_engine_is_not_run_for_missing_inputs() {
    let dir = tempdir().unwrap();
    let files = tempdir().unwrap();
    let [a, _b, p] = inputs(files.path());
    let mut engine = Xdelta3Process::new(fake_xdelta3(dir.path(), 0));

    let outcome = Patch::open_for_write(&p).encode(&mut engine, &a, &files.path().join("gone"));
    assert_eq!(outcome.status, -1);
    assert!(outcome.message.starts_with("Modified ROM file not found"));
    assert!(!dir.path().join("args.txt").exists());
}
