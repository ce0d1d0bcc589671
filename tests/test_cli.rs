//! Tests for CLI argument parsing and whole-binary stage runs

mod common;

use assert_cmd::Command;
use clap::Parser;
use churnops::cli::{Cli, Commands};
use predicates::prelude::*;
use std::path::PathBuf;

#[test]
fn test_cli_default_config_path() {
    let cli = Cli::parse_from(["churnops", "train"]);

    assert_eq!(cli.config, PathBuf::from("config.json"));
    assert_eq!(cli.command, Commands::Train);
}

#[test]
fn test_cli_config_flag_after_subcommand() {
    let cli = Cli::parse_from(["churnops", "evaluate", "--config", "conf/prod.json"]);

    assert_eq!(cli.config, PathBuf::from("conf/prod.json"));
    assert_eq!(cli.command, Commands::Evaluate);
}

#[test]
fn test_cli_publish_folder_default() {
    let cli = Cli::parse_from(["churnops", "publish"]);

    assert_eq!(
        cli.command,
        Commands::Publish {
            folder: PathBuf::from(".")
        }
    );
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["churnops"]).is_err());
}

#[test]
fn test_binary_train_then_evaluate() {
    let ws = common::Workspace::new(400, 17);

    Command::cargo_bin("churnops")
        .unwrap()
        .args(["--config", ws.config_path.to_str().unwrap(), "train"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Training complete"));

    Command::cargo_bin("churnops")
        .unwrap()
        .args(["--config", ws.config_path.to_str().unwrap(), "evaluate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Evaluation complete"));

    assert!(ws.path("metrics/metrics.json").is_file());
}

#[test]
fn test_binary_missing_config_fails() {
    let dir = tempfile::TempDir::new().unwrap();

    Command::cargo_bin("churnops")
        .unwrap()
        .current_dir(dir.path())
        .arg("train")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.json"));
}

#[test]
fn test_binary_publish_without_credentials_makes_no_request() {
    let ws = common::Workspace::new(50, 1);
    let mut server = mockito::Server::new();
    let any_request = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create();
    let any_post = server
        .mock("POST", mockito::Matcher::Any)
        .expect(0)
        .create();

    Command::cargo_bin("churnops")
        .unwrap()
        .env_remove("HF_USERNAME")
        .env("HF_TOKEN", "hf_test_token")
        .env("HF_ENDPOINT", server.url())
        .args(["--config", ws.config_path.to_str().unwrap(), "publish"])
        .arg("--folder")
        .arg(ws.dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("HF_USERNAME"));

    any_request.assert();
    any_post.assert();
}

#[test]
fn test_binary_publish_without_token_makes_no_request() {
    let ws = common::Workspace::new(50, 1);
    let mut server = mockito::Server::new();
    let any_get = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create();
    let any_post = server
        .mock("POST", mockito::Matcher::Any)
        .expect(0)
        .create();

    Command::cargo_bin("churnops")
        .unwrap()
        .env("HF_USERNAME", "alice")
        .env_remove("HF_TOKEN")
        .env("HF_ENDPOINT", server.url())
        .args(["--config", ws.config_path.to_str().unwrap(), "publish"])
        .arg("--folder")
        .arg(ws.dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("HF_TOKEN"));

    any_get.assert();
    any_post.assert();
}
