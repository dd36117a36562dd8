use crate::harness::Harness;

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

#[test]
fn test_hashes_every_file_in_order() {
    let h = Harness::new();
    let a = h.write_file("a.txt", b"abc");
    let b = h.write_file("b.bin", &vec![0u8; 300_000]);
    let c = h.write_file("nested/a.txt", b"abc");

    let output = h.run(&[
        "-j",
        "2",
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        c.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "parprog failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "unexpected output:\n{}", stdout);
    assert_eq!(lines[0], format!("{}  {}", ABC_SHA256, a.display()));
    assert!(lines[1].ends_with(&format!("  {}", b.display())));
    assert_eq!(lines[2], format!("{}  {}", ABC_SHA256, c.display()));
}

#[test]
fn test_log_file_is_written() {
    let h = Harness::new();
    let a = h.write_file("a.txt", b"abc");
    let log = h.path().join("parprog.log");

    let output = h.run(&["--log-file", log.to_str().unwrap(), a.to_str().unwrap()]);
    assert!(output.status.success());

    let contents = std::fs::read_to_string(&log).expect("log file exists");
    assert!(
        contents.contains("progress display started"),
        "log was:\n{}",
        contents
    );
}
