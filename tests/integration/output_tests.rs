use dupfind::duplicates::DuplicateFinder;
use dupfind::error::ExitCode;
use dupfind::output::{JsonOutput, TextOutput};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_text_report_for_real_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.txt"), b"hello").unwrap();
    fs::write(dir.path().join("d.txt"), b"world").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let report = TextOutput::new(dir.path(), &groups).render();
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Found 1 duplicated file:");
    assert_eq!(
        lines[1],
        format!("╔ 2 duplicates of {}:", dir.path().join("a.txt").display())
    );
    assert_eq!(
        lines[2],
        format!("╠══ {}", dir.path().join("b.txt").display())
    );
    assert_eq!(
        lines[3],
        format!("╚══ {}", dir.path().join("sub/c.txt").display())
    );
}

#[test]
fn test_text_report_no_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"alone").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let report = TextOutput::new(dir.path(), &groups).render();

    assert_eq!(
        report,
        format!("No duplicates found in {}\n", dir.path().display())
    );
}

#[test]
fn test_json_report_for_real_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x.bin"), [0u8, 1, 2, 3]).unwrap();
    fs::write(dir.path().join("y.bin"), [0u8, 1, 2, 3]).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let output = JsonOutput::new(&groups, &summary, ExitCode::Success);

    let mut buffer = Vec::new();
    output.write_to(&mut buffer, true).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    let group = &parsed["duplicates"][0];
    assert_eq!(group["size"], 4);
    assert_eq!(group["digest"].as_str().unwrap().len(), 32);
    assert!(group["representative"].as_str().unwrap().ends_with("x.bin"));
    assert_eq!(group["duplicates"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["summary"]["total_files"], 2);
    assert_eq!(parsed["summary"]["reclaimable_space"], 4);
    assert_eq!(parsed["summary"]["exit_code_name"], "DF000");
}
