#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// 環境変数を空にしたコマンド（PATHのみ引き継ぐ）
fn jamdeploy() -> Command {
    let mut cmd = Command::cargo_bin("jamdeploy").unwrap();
    cmd.env_clear();
    if let Some(path) = std::env::var_os("PATH") {
        cmd.env("PATH", path);
    }
    cmd
}

/// node_modules 済みのプロジェクト（yarn を走らせない）
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("node_modules")).unwrap();
    dir
}

#[test]
fn test_cli_help() {
    jamdeploy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("INPUT_AZIONPERSONALTOKEN"))
        .stdout(predicate::str::contains("INPUT_BUILDPRESET"));
}

#[test]
fn test_cli_version() {
    jamdeploy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jamdeploy"));
}

/// 必須の環境変数が無い場合は終了コード1
#[test]
fn test_missing_required_env_exits_with_one() {
    jamdeploy()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_missing_application_name_exits_with_one() {
    let dir = project();
    jamdeploy()
        .env("INPUT_AZIONPERSONALTOKEN", "token")
        .env("INPUT_BUILDPRESET", "vue")
        .env("GITHUB_WORKSPACE", dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("application name is empty"));
}

/// ビルド失敗はエラーメッセージ付きで終了コード1
#[test]
fn test_build_failure_exits_with_one() {
    let dir = project();
    jamdeploy()
        .env("INPUT_AZIONPERSONALTOKEN", "token")
        .env("INPUT_BUILDPRESET", "vue")
        .env("GITHUB_REPOSITORY", "acme/site")
        .env("GITHUB_WORKSPACE", dir.path())
        .env("VULCAN_COMMAND", "false")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("false build --preset vue --mode deliver"));
}

/// 空文字列の入力は未指定として既定値で実行される
#[test]
fn test_empty_inputs_use_defaults() {
    let dir = project();
    jamdeploy()
        .env("INPUT_AZIONPERSONALTOKEN", "token")
        .env("INPUT_BUILDPRESET", "vue")
        .env("INPUT_BUILDMODE", "")
        .env("INPUT_BUILDSTATICFOLDER", "")
        .env("INPUT_FUNCTIONARGSFILEPATH", "")
        .env("INPUT_APPLICATIONNAME", "")
        .env("GITHUB_OUTPUT", "")
        .env("GITHUB_REPOSITORY", "acme/site")
        .env("GITHUB_WORKSPACE", dir.path())
        .env("VULCAN_COMMAND", "false")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("false build --preset vue --mode deliver"));
}

/// ビルド成果物が無い場合はAPIを呼ばずに失敗し、argsファイルは正規化される
#[test]
fn test_missing_worker_fails_after_args_are_prepared() {
    let dir = project();
    jamdeploy()
        .env("INPUT_AZIONPERSONALTOKEN", "token")
        .env("INPUT_BUILDPRESET", "vue")
        .env("GITHUB_REPOSITORY", "acme/site")
        .env("GITHUB_WORKSPACE", dir.path())
        .env("VULCAN_COMMAND", "true")
        .env("AZION_API_URL", "http://127.0.0.1:9")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("worker.js"));

    assert_eq!(
        fs::read_to_string(dir.path().join("args.json")).unwrap(),
        "{}"
    );
    assert!(!dir.path().join("azion/azion.json").exists());
}
