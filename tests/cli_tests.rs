use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STORAGE_VARS: [&str; 5] = [
    "MINIO_ACCESS_KEY",
    "MINIO_SECRET_KEY",
    "MINIO_ENDPOINT",
    "MINIO_BUCKET",
    "MINIO_REGION",
];

/// Binary with no storage configuration inherited from the caller.
fn generator_cmd() -> Command {
    let mut cmd = Command::cargo_bin("rss-generator").unwrap();
    for var in STORAGE_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("RSS_HTTP_TIMEOUT_SECS");
    cmd
}

fn with_storage(cmd: &mut Command) -> &mut Command {
    cmd.env("MINIO_ACCESS_KEY", "minio")
        .env("MINIO_SECRET_KEY", "minio123")
        .env("MINIO_ENDPOINT", "localhost:9000")
}

#[test]
fn test_list_shows_every_site() {
    generator_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("immich"))
        .stdout(predicate::str::contains("diariodominho"))
        .stdout(predicate::str::contains("newalbumreleases_metal"))
        .stdout(predicate::str::contains("Key: immich.xml"));
}

#[test]
fn test_list_json_is_parseable() {
    let output = generator_cmd().arg("list").arg("--json").output().unwrap();
    assert!(output.status.success());

    let sites: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = sites
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(ids, vec!["immich", "diariodominho", "newalbumreleases_metal"]);
}

#[test]
fn test_generate_help_shows_flags() {
    generator_cmd()
        .arg("generate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--all"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--full-content"));
}

#[test]
fn test_generate_without_target_is_usage_error() {
    generator_cmd().arg("generate").assert().failure();
}

#[test]
fn test_generate_unknown_site_fails() {
    generator_cmd()
        .arg("generate")
        .arg("nosuchsite")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown site: nosuchsite"));
}

#[test]
fn test_generate_without_credentials_fails() {
    generator_cmd()
        .arg("generate")
        .arg("immich")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Missing environment variable: MINIO_ACCESS_KEY",
        ));
}

#[test]
fn test_check_reports_all_missing_vars() {
    generator_cmd()
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("MINIO_ACCESS_KEY is not set"))
        .stdout(predicate::str::contains("MINIO_SECRET_KEY is not set"))
        .stdout(predicate::str::contains("MINIO_ENDPOINT is not set"))
        .stderr(predicate::str::contains("3 problem(s) found"));
}

#[test]
fn test_check_passes_with_full_config() {
    let mut cmd = generator_cmd();
    with_storage(&mut cmd)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"))
        .stdout(predicate::str::contains("https://localhost:9000"))
        .stdout(predicate::str::contains("Bucket: rss-feeds"));
}

#[test]
fn test_check_with_custom_bucket() {
    let mut cmd = generator_cmd();
    with_storage(&mut cmd)
        .env("MINIO_BUCKET", "feeds-staging")
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bucket: feeds-staging"));
}

#[test]
fn test_list_ignores_bad_timeout() {
    generator_cmd()
        .env("RSS_HTTP_TIMEOUT_SECS", "soon")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("immich"));
}

#[test]
fn test_check_reports_bad_timeout() {
    let mut cmd = generator_cmd();
    with_storage(&mut cmd)
        .env("RSS_HTTP_TIMEOUT_SECS", "soon")
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("RSS_HTTP_TIMEOUT_SECS is malformed"))
        .stderr(predicate::str::contains("1 problem(s) found"));
}

mod dotenv_loading {
    use super::*;

    #[test]
    fn test_check_reads_env_file_from_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(".env"),
            "MINIO_ACCESS_KEY=minio\nMINIO_SECRET_KEY=minio123\nMINIO_ENDPOINT=http://localhost:9000\n",
        )
        .unwrap();

        generator_cmd()
            .current_dir(temp_dir.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("http://localhost:9000"));
    }
}
