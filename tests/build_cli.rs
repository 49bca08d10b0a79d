//! End-to-end runs of the `oxtbuild` binary.

mod common;

#[cfg(unix)]
use common::spawn_oxtbuild;
use common::{archive_entries, run_oxtbuild, stderr_text, SourceFixture};
use serde_json::Value;

const SETTINGS_XCU: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<oor:component-data xmlns:oor="http://openoffice.org/2001/registry" oor:name="Settings" oor:package="org.example"/>
"#;

fn json_report(fixture: &SourceFixture, extra: &[&str]) -> Value {
    let mut args = vec!["--json"];
    args.extend_from_slice(extra);
    let output = fixture.run(&args, None);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    serde_json::from_slice(&output.stdout).expect("parse JSON report")
}

#[test]
fn packages_descriptors_and_manifested_files() {
    let fixture = SourceFixture::with_files(&[
        ("config/settings.xcu", SETTINGS_XCU),
        ("README.md", "# Example\n"),
    ]);

    let output = fixture.run(&[], None);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("wrote "), "stdout: {stdout}");
    assert!(stdout.trim_end().ends_with("my-ext.oxt"), "stdout: {stdout}");

    assert_eq!(
        archive_entries(&fixture.archive_path()),
        vec![
            "META-INF/manifest.xml",
            "README.md",
            "config/settings.xcu",
            "description.xml",
        ]
    );
    let manifest = fixture.read("META-INF/manifest.xml");
    assert!(manifest.contains("manifest:full-path=\"config/settings.xcu\""));
    assert!(manifest.contains("application/vnd.sun.star.configuration-data"));
}

#[test]
fn json_report_lists_manifest_entries_only_for_mapped_types() {
    let fixture = SourceFixture::with_files(&[
        ("a.xcu", SETTINGS_XCU),
        ("b.xcu", SETTINGS_XCU),
        ("c.txt", "plain"),
    ]);

    let report = json_report(&fixture, &[]);
    assert_eq!(report["description"], "created");
    let manifest = report["manifest"].as_array().expect("manifest array");
    let paths: Vec<&str> = manifest
        .iter()
        .map(|entry| entry["full_path"].as_str().expect("full_path"))
        .collect();
    assert_eq!(paths, vec!["a.xcu", "b.xcu"]);
    assert!(report["incomplete"]
        .as_array()
        .expect("incomplete array")
        .iter()
        .any(|field| field == "description/identifier@value"));
}

#[test]
fn second_run_leaves_description_untouched() {
    let fixture = SourceFixture::with_files(&[("a.xcu", SETTINGS_XCU)]);

    json_report(&fixture, &[]);
    let first = fixture.read("description.xml");
    let report = json_report(&fixture, &[]);
    assert_eq!(report["description"], "unchanged");
    assert_eq!(fixture.read("description.xml"), first);
    assert!(first.contains("<identifier value=\"[incomplete]\"/>"));
}

#[test]
fn strict_mode_packages_allow_listed_types() {
    let fixture = SourceFixture::with_files(&[
        ("a.xcu", SETTINGS_XCU),
        ("notes.txt", "notes"),
        ("icons/logo.png", "png"),
        ("src/module.py", "pass"),
    ]);

    let report = json_report(&fixture, &["--strict"]);
    assert_eq!(report["strict"], true);
    assert_eq!(
        archive_entries(&fixture.archive_path()),
        vec!["META-INF/manifest.xml", "a.xcu", "description.xml", "notes.txt"]
    );

    json_report(&fixture, &[]);
    let everything = archive_entries(&fixture.archive_path());
    assert!(everything.contains(&"icons/logo.png".to_string()));
    assert!(everything.contains(&"src/module.py".to_string()));
}

#[test]
fn missing_source_folder_fails() {
    let temp = tempfile::tempdir().expect("temp dir");
    let output = run_oxtbuild(&temp.path().join("absent"), &[], None);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("Not a directory"));
    assert!(output.stdout.is_empty());
}

#[test]
fn corrupt_description_fails_with_parse_detail() {
    let fixture = SourceFixture::with_files(&[(
        "description.xml",
        "<description><identifier></description>",
    )]);
    let output = fixture.run(&[], None);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("description.xml"));
    assert!(!fixture.archive_path().exists());
}

#[test]
fn guided_run_fills_description_from_stdin() {
    let fixture = SourceFixture::with_files(&[("LICENSE.txt", "MIT")]);
    let answers = [
        "org.example.ext",
        "1.0.0",
        "",
        "user",
        "",
        "LICENSE.txt",
        "",
        "",
        "https://example.org",
        "\"Example Publisher\"",
        "Example Extension",
    ]
    .join("\n")
        + "\n";

    let output = fixture.run(&["--guided", "--json"], Some(&answers));
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let report: Value = serde_json::from_slice(&output.stdout).expect("parse JSON report");
    assert_eq!(report["incomplete"].as_array().map(Vec::len), Some(0));
    assert!(stderr_text(&output).contains("OXT unique identifier: "));

    let description = fixture.read("description.xml");
    assert!(description.contains("<identifier value=\"org.example.ext\"/>"));
    assert!(description.contains("<platform value=\"all\"/>"));
    assert!(description.contains("accept-by=\"user\""));
    assert!(description.contains(">Example Publisher</name>"));
    assert!(description.contains("dep:name=\"OpenOffice.org 3.0\""));
}

#[test]
fn guided_run_without_answers_is_interrupted() {
    let fixture = SourceFixture::with_files(&[("a.xcu", SETTINGS_XCU)]);
    let output = fixture.run(&["--guided"], Some("org.example.ext\n"));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("Interrupted"));
    assert!(!fixture.source.join("description.xml").exists());
    assert!(!fixture.archive_path().exists());
}

#[cfg(unix)]
#[test]
fn ctrl_c_at_a_prompt_exits_without_writing() {
    use std::io::Read;
    use std::process::Command;

    let fixture = SourceFixture::with_files(&[("a.xcu", SETTINGS_XCU)]);
    let mut child = spawn_oxtbuild(&fixture.source, &["--guided"]);
    let mut stderr = child.stderr.take().expect("stderr pipe");

    let mut seen = Vec::new();
    let mut buf = [0u8; 256];
    while !String::from_utf8_lossy(&seen).contains("OXT unique identifier: ") {
        let read = stderr.read(&mut buf).expect("read stderr");
        assert!(read > 0, "exited before prompting: {}", String::from_utf8_lossy(&seen));
        seen.extend_from_slice(&buf[..read]);
    }

    let kill = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("run kill");
    assert!(kill.success());
    let status = child.wait().expect("wait for oxtbuild");
    stderr.read_to_end(&mut seen).expect("drain stderr");

    assert_eq!(status.code(), Some(1));
    assert!(String::from_utf8_lossy(&seen).contains("Interrupted with Ctrl+C"));
    assert!(!fixture.source.join("description.xml").exists());
    assert!(!fixture.archive_path().exists());
}

#[test]
fn text_outside_description_root_fails() {
    let body = "<description/>trailing junk";
    let fixture = SourceFixture::with_files(&[("description.xml", body)]);
    let output = fixture.run(&[], None);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("description.xml"));
    assert_eq!(fixture.read("description.xml"), body);
    assert!(!fixture.archive_path().exists());
}
