//! Process-level tests for the modlist binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn modlist(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("modlist").expect("modlist binary");
    cmd.current_dir(dir.path())
        .env("MODLIST_COLOR", "never")
        .env("MODLIST_API_RESPONSE_FOLDER", dir.path().join("responses"))
        .env_remove("CURSEFORGE_API_KEY")
        .env_remove("GITHUB_TOKEN");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    modlist(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("download-mods"))
        .stdout(predicate::str::contains("start-server"));
}

#[test]
fn missing_database_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    modlist(&dir)
        .args(["--database-file", "absent.csv", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.csv"));
    assert!(!dir.path().join("absent.csv").exists());
}

#[test]
fn list_prints_records() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("modlist.csv"),
        "ID,Type,Loader,CurrentGameVersion,CurrentVersion,ApiSource\n\
         sodium,mod,fabric,1.21.5,0.6.13,modrinth\n",
    )
    .unwrap();

    modlist(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("sodium"))
        .stdout(predicate::str::contains("0.6.13"));
}

#[test]
fn remove_unknown_record_fails() {
    let dir = TempDir::new().unwrap();
    let text = "ID,Type,Loader\nsodium,mod,fabric\n";
    std::fs::write(dir.path().join("modlist.csv"), text).unwrap();

    modlist(&dir).args(["remove", "lithium"]).assert().failure();
    assert_eq!(std::fs::read_to_string(dir.path().join("modlist.csv")).unwrap(), text);
}

#[test]
fn validate_prints_counts_without_row_lines() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("modlist.csv"),
        "ID,Type,Loader,CurrentGameVersion,CurrentVersion,ApiSource\n\
         sodium,mod,fabric,1.21.5,0.6.13,modrinth\n",
    )
    .unwrap();

    modlist(&dir)
        .args(["--max-retries", "0", "--net-timeout", "2"])
        .env("MODLIST_MODRINTH_API_BASE_URL", "http://127.0.0.1:9")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary"))
        .stdout(predicate::str::contains("Errored"))
        .stdout(predicate::str::contains("sodium").not());
}
