use crate::harness::Harness;

#[test]
fn test_missing_file_fails_run() {
    let h = Harness::new();
    let good = h.write_file("good.txt", b"abc");
    let missing = h.path().join("missing.txt");

    let output = h.run(&[good.to_str().unwrap(), missing.to_str().unwrap()]);
    assert!(!output.status.success(), "run should fail with a missing file");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(&format!("error  {}:", missing.display())),
        "expected error line.\nstdout: {}",
        stdout
    );
    assert!(stdout.contains("good.txt"));
}

#[test]
fn test_bad_config_is_reported() {
    let h = Harness::new();
    let a = h.write_file("a.txt", b"abc");
    let bad = h.write_file("bad.toml", b"jobs = \"many\"\n");

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_parprog"))
        .args(["--plain", "--config", bad.to_str().unwrap(), a.to_str().unwrap()])
        .output()
        .expect("run parprog");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid configuration"),
        "stderr was:\n{}",
        stderr
    );
}
