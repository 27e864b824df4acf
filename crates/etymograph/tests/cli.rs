use std::fs;

use assert_cmd::Command;

const BLOB: &str =
    "<structure>\nEnglish - Latin\n</structure>\n<content>\n@Latin: {{lingua}}\n</content>\n";

#[test]
fn renders_png_from_stdin() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("graph.png");

    Command::new(assert_cmd::cargo_bin!("etymograph"))
        .args(["--out", out.to_string_lossy().as_ref(), "--width", "600", "--height", "400"])
        .write_stdin(BLOB)
        .assert()
        .success();

    let bytes = fs::read(&out).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
}

#[test]
fn default_out_sits_next_to_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("latin.txt");
    fs::write(&input, BLOB).expect("write input");

    Command::new(assert_cmd::cargo_bin!("etymograph"))
        .arg(&input)
        .assert()
        .success();

    assert!(input.with_extension("png").exists());
}

#[test]
fn json_report_lists_positioned_nodes() {
    let output = Command::new(assert_cmd::cargo_bin!("etymograph"))
        .args(["--json", "--width", "600", "--height", "400"])
        .write_stdin(BLOB)
        .output()
        .expect("run etymograph");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let ids: Vec<&str> = report["layout"]["nodes"]
        .as_array()
        .expect("nodes array")
        .iter()
        .filter_map(|node| node["id"].as_str())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"English") && ids.contains(&"Latin"));
    assert_eq!(report["document"]["contents"][0]["label"], "Latin");
}

#[test]
fn overlay_written_alongside_hovered_image() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("graph.png");
    let overlay = tmp.path().join("overlay.png");

    Command::new(assert_cmd::cargo_bin!("etymograph"))
        .args([
            "--out",
            out.to_string_lossy().as_ref(),
            "--overlay",
            overlay.to_string_lossy().as_ref(),
            "--hover",
            "0,0",
        ])
        .write_stdin(BLOB)
        .assert()
        .success();

    assert!(out.exists());
    assert!(overlay.exists());
}

#[test]
fn unknown_flag_fails() {
    Command::new(assert_cmd::cargo_bin!("etymograph"))
        .arg("--frobnicate")
        .write_stdin(BLOB)
        .assert()
        .failure();
}
