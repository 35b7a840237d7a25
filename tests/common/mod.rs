#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const EMPTY_TREE_OID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_spark_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_spark_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("spark-git").expect("Failed to find spark-git binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn spark_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_spark_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", "fake_user"),
        ("GIT_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd
}

pub fn run_git_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn write_file(path: &Path, content: &str) {
    // make sure the parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

/// Write `files_count` files with random names and content, returns their names.
pub fn write_generated_files(dir: &Path, files_count: usize) -> Vec<String> {
    use fake::{
        Fake,
        faker::lorem::en::{Word, Words},
    };

    (0..files_count)
        .map(|index| {
            let file_name = format!("{}_{index}.txt", Word().fake::<String>());
            let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
            write_file(&dir.join(&file_name), &file_content);

            file_name
        })
        .collect::<Vec<_>>()
}

/// Commit id the checked-out branch points to
pub fn get_head_commit_sha(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let head_path = dir.join(".git").join("HEAD");
    let head_content = std::fs::read_to_string(head_path)?;

    // HEAD file contains either a commit SHA or a ref like "ref: refs/heads/main"
    if let Some(ref_path) = head_content.strip_prefix("ref: ") {
        let ref_file = dir.join(".git").join(ref_path.trim());
        let commit_sha = std::fs::read_to_string(ref_file)?;
        Ok(commit_sha.trim().to_string())
    } else {
        Ok(head_content.trim().to_string())
    }
}

/// Tree id of a commit, read with `spark-git cat-file`
pub fn get_commit_tree_sha(dir: &Path, commit_id: &str) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_spark_command(dir, &["cat-file", "-p", commit_id]).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    stdout
        .lines()
        .find_map(|line| line.strip_prefix("tree "))
        .map(str::to_string)
        .ok_or_else(|| "No tree found".into())
}

/// Tree id git computes for the same working directory, in a scratch git repository
pub fn git_write_tree(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::remove_dir_all(dir.join(".git"))?;
    run_git_command(dir, &["init", "--quiet"]).assert().success();
    run_git_command(dir, &["add", "."]).assert().success();

    let output = run_git_command(dir, &["write-tree"]).output()?;

    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}
