use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_cli_create_list_extract_zip_cycle() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: a temporary directory with some test files
    let source_dir = tempdir()?;
    let file1_path = source_dir.path().join("file1.txt");
    let file2_path = source_dir.path().join("file2.log");
    let nested_dir = source_dir.path().join("nested");
    fs::create_dir(&nested_dir)?;
    let nested_file_path = nested_dir.join("nested_file.dat");

    let mut file1 = fs::File::create(&file1_path)?;
    writeln!(file1, "Hello, this is the first file.")?;

    let mut file2 = fs::File::create(&file2_path)?;
    writeln!(file2, "Some log data here.")?;

    let mut nested_file = fs::File::create(&nested_file_path)?;
    nested_file.write_all(&[0, 1, 2, 3, 4, 5])?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("test_archive.zip");

    // 2. Create archive
    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("create")
        .arg("--output")
        .arg(&archive_path)
        .arg("--keep-parent")
        .arg("none")
        .arg(source_dir.path());
    cmd.assert().success();

    assert!(archive_path.exists());

    // 3. List contents of the archive
    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("list").arg(&archive_path);
    cmd.assert().success().stdout(
        predicate::str::contains("file1.txt")
            .and(predicate::str::contains("file2.log"))
            .and(predicate::str::contains("nested_file.dat")),
    );

    // 4. Extract archive to a new directory
    let extract_dir = tempdir()?;
    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("extract").arg(&archive_path).arg("-o").arg(extract_dir.path());
    cmd.assert().success();

    // 5. Verify extracted files
    let extracted_file1 = fs::read(extract_dir.path().join("file1.txt"))?;
    let original_file1 = fs::read(&file1_path)?;
    assert_eq!(extracted_file1, original_file1);

    let extracted_nested_file = fs::read(extract_dir.path().join("nested/nested_file.dat"))?;
    let original_nested_file = fs::read(&nested_file_path)?;
    assert_eq!(extracted_nested_file, original_nested_file);

    Ok(())
}

#[test]
fn test_cli_tar_gz_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("readme.md"), "# hello\n")?;
    fs::create_dir(source_dir.path().join("src"))?;
    fs::write(source_dir.path().join("src/main.rs"), "fn main() {}\n")?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("bundle.tar.gz");

    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("create")
        .arg("-o")
        .arg(&archive_path)
        .arg("--keep-parent")
        .arg("none")
        .arg(source_dir.path());
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("list").arg(&archive_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("readme.md").and(predicate::str::contains("src/main.rs")));

    let extract_dir = tempdir()?;
    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("x").arg(&archive_path).arg("-o").arg(extract_dir.path());
    cmd.assert().success();

    assert_eq!(fs::read_to_string(extract_dir.path().join("readme.md"))?, "# hello\n");
    assert_eq!(fs::read_to_string(extract_dir.path().join("src/main.rs"))?, "fn main() {}\n");

    Ok(())
}

#[test]
fn test_cli_respects_gitignore() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join(".gitignore"), "*.log\n")?;
    fs::write(source_dir.path().join("app.log"), "noise")?;
    fs::write(source_dir.path().join("main.rs"), "fn main() {}")?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("src.zip");

    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("c")
        .arg("-o")
        .arg(&archive_path)
        .arg("--keep-parent")
        .arg("none")
        .arg(source_dir.path());
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("list").arg(&archive_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("main.rs").and(predicate::str::contains("app.log").not()));

    Ok(())
}

#[test]
fn test_cli_list_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("data.bin"), [0u8; 16])?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("data.zip");

    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("create")
        .arg("-o")
        .arg(&archive_path)
        .arg("--keep-parent")
        .arg("none")
        .arg(source_dir.path());
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("list").arg("--json").arg(&archive_path);
    cmd.assert().success().stdout(
        predicate::str::contains(r#""path":"data.bin""#).and(predicate::str::contains(r#""kind":"file""#)),
    );

    Ok(())
}

#[test]
fn test_cli_create_fails_when_everything_is_excluded() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("only.log"), "x")?;

    let archive_dir = tempdir()?;
    let archive_path = archive_dir.path().join("empty.zip");

    let mut cmd = Command::cargo_bin("zipack")?;
    cmd.arg("create")
        .arg("-o")
        .arg(&archive_path)
        .arg("--exclude")
        .arg("*.log")
        .arg(source_dir.path());
    cmd.assert().failure().stderr(predicate::str::contains("nothing to archive"));

    Ok(())
}
