//! End-to-end tests of the `chefops` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PS_FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ps_aux.txt");

fn chefops(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chefops").unwrap();
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("CHEFOPS_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .arg("--config")
        .arg(config);
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn ps_lists_chefs_with_redacted_tokens() {
    let config = config_file("");
    chefops(config.path())
        .args(["ps", "--input", PS_FIXTURE])
        .assert()
        .success()
        .stdout(
            "4100\t08:15\t0:05\tpython ./sushichef.py --token=012345... --stage\t(cwd=)\n\
             4242\t09:00\t1:13\tpython ./sushichef.py --token=012345... --thumbnails\t(cwd=)\n",
        );
}

#[test]
fn ps_all_keeps_every_row() {
    let config = config_file("");
    let output = chefops(config.path())
        .args(["ps", "--all", "-o", "json", "--input", PS_FIXTURE])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["pid"], "1");
    assert_eq!(rows[0]["command"], "/sbin/init splash");
}

#[test]
fn ps_reads_stdin() {
    let config = config_file("process_excludes = []\n");
    chefops(config.path())
        .args(["ps", "--input", "-"])
        .write_stdin(std::fs::read_to_string(PS_FIXTURE).unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("system-config-printer-applet"));
}

#[test]
fn chef_cmd_renders_background_run() {
    let config = config_file("");
    chefops(config.path())
        .args([
            "chef-cmd",
            "https://github.com/learningequality/sushi-chef-pbs/",
            "--command",
            "./sushichef.py --token=abc",
            "--arg=--thumbnails",
            "--arg",
            "lang=fr",
            "--log-file",
            "chef.log",
        ])
        .assert()
        .success()
        .stdout(
            " ( nohup  bash -c \" cd /data/sushi-chef-pbs && export HOME=/data && \
             source /data/sushi-chef-pbs/venv/bin/activate && \
             ./sushichef.py  --thumbnails  lang=fr  --token=abc \" \
             > /data/sushi-chef-pbs/chef.log 2>&1 & ) && sleep 1\n",
        );
}

#[test]
fn chef_cmd_rejects_non_github_urls() {
    let config = config_file("");
    chefops(config.path())
        .args(["chef-cmd", "git@github.com:learningequality/sushi-chef-pbs.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("repository name cannot be inferred"));
}

#[test]
fn config_path_and_show() {
    let config = config_file("organization = \"example-org\"\ngithub_token = \"ghp_abcdefghijklmnop\"\n");

    chefops(config.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(config.path().to_string_lossy().as_ref()));

    let output = chefops(config.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["organization"], "example-org");
    assert_eq!(shown["github_token"], "ghp_...mnop");
    assert_eq!(shown["repos_dir"], "chefrepos");
    assert_eq!(shown["mirrors"].as_array().unwrap().len(), 6);
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    chefops(&dir.path().join("absent.toml"))
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn channels_reports_discrepancies() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/api/public/v1/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "aaaa1111", "name": "Alpha", "version": 3},
            {"id": "bbbb2222", "name": "Beta", "version": 1}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": [
                {"id": "aaaa1111", "name": "Alpha", "version": 3,
                 "demo_server_url": format!("{uri}/en/channels/aaaa1111")},
                {"id": "bbbb2222", "name": "Beta", "version": 1, "demo_server_url": ""}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/en/api/public/v1/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "aaaa1111", "name": "Alpha", "version": 1}
        ])))
        .mount(&server)
        .await;

    let config = config_file(&format!(
        r#"
[endpoints]
studio_url = "{uri}"
catalog_url = "{uri}"

[[mirrors]]
label = "en"
url = "{uri}/en"
"#
    ));

    chefops(config.path())
        .arg("channels")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 PUBLIC channels on Studio."))
        .stdout(predicate::str::contains(" - Cannot find bbbb2222 Beta"))
        .stdout(predicate::str::contains("(v1 < v3)"))
        .stdout(predicate::str::contains(
            " - Channel bbbb2222 Beta does not have a demo_server_url",
        ))
        .stdout(predicate::str::contains("WARNING").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn channels_fails_when_a_source_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_file(&format!(
        "[endpoints]\nstudio_url = \"{uri}\"\ncatalog_url = \"{uri}\"\n",
        uri = server.uri()
    ));

    chefops(config.path())
        .arg("channels")
        .assert()
        .failure()
        .stderr(predicate::str::contains("authoritative channel list"));
}

#[test]
fn code_report_keeps_going_after_a_broken_checkout() {
    let config = config_file("");
    let repos = tempfile::tempdir().unwrap();

    let good = repos.path().join("sushi-chef-good");
    std::fs::create_dir(&good).unwrap();
    std::fs::write(good.join("sushichef.py"), "").unwrap();
    // a plain file where the checkout directory should be
    std::fs::write(repos.path().join("sushi-chef-broken"), "").unwrap();

    let output = chefops(config.path())
        .args(["code-report", "sushi-chef-broken", "sushi-chef-good", "--no-update"])
        .arg("--repos-dir")
        .arg(repos.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("sushi-chef-broken"));
    assert!(lines[1].contains("Could not read"));
    assert!(lines[2].starts_with("sushi-chef-good"));
    assert!(lines[2].contains("✅"));
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn repos_lists_forks_branches_pulls_and_issues() {
    let server = MockServer::start().await;
    let repo = json!({
        "name": "sushi-chef-pbs",
        "full_name": "le/sushi-chef-pbs",
        "html_url": "https://github.com/le/sushi-chef-pbs",
        "owner": {"login": "le"},
        "pushed_at": "2024-03-01T12:00:00Z"
    });
    let fork = json!({
        "name": "sushi-chef-pbs",
        "full_name": "someone/sushi-chef-pbs",
        "html_url": "https://github.com/someone/sushi-chef-pbs",
        "owner": {"login": "someone"}
    });
    mount_json(&server, "/orgs/le/repos", json!([repo])).await;
    mount_json(&server, "/repos/le/sushi-chef-pbs/forks", json!([fork])).await;
    mount_json(
        &server,
        "/repos/someone/sushi-chef-pbs/branches",
        json!([{"name": "fix-videos", "commit": {"sha": "2222222222"}}]),
    )
    .await;
    mount_json(
        &server,
        "/repos/le/sushi-chef-pbs/branches",
        json!([
            {"name": "master", "commit": {"sha": "abcdef0123456"}},
            {"name": "develop", "commit": {"sha": "9876543210fed"}}
        ]),
    )
    .await;
    for sha in ["abcdef0123456", "9876543210fed"] {
        mount_json(
            &server,
            &format!("/repos/le/sushi-chef-pbs/commits/{sha}"),
            json!({
                "sha": sha,
                "author": {"login": "ivan"},
                "commit": {"message": "Update ricecooker\nmore", "committer": {"date": "2024-02-01T00:00:00Z"}}
            }),
        )
        .await;
    }
    mount_json(
        &server,
        "/repos/le/sushi-chef-pbs/pulls",
        json!([{"number": 7, "title": "Add subtitles", "state": "open", "user": {"login": "someone"}}]),
    )
    .await;
    mount_json(
        &server,
        "/repos/le/sushi-chef-pbs/issues",
        json!([
            {"number": 7, "title": "Add subtitles", "state": "open", "pull_request": {"url": "x"}},
            {"number": 5, "title": "Missing thumbnails", "state": "open", "comments": 3}
        ]),
    )
    .await;

    let config = config_file(&format!(
        "organization = \"le\"\nexternal_chef_repos = []\ndeprecated_repos = []\n\
         [endpoints]\ngithub_api_url = \"{}\"\n",
        server.uri()
    ));

    chefops(config.path())
        .args(["repos", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 chef repositories"))
        .stdout(predicate::str::contains("1 forks\t2 branches\t1 PRs\t1 Issues"))
        .stdout(predicate::str::contains(
            "   - fork: https://github.com/someone/sushi-chef-pbs branches: fix-videos",
        ))
        .stdout(predicate::str::contains(
            "   - branch: develop (9876543) by ivan Update ricecooker\t2024-02-01",
        ))
        .stdout(predicate::str::contains("   - PR7: Add subtitles open by someone"))
        .stdout(predicate::str::contains("   - I5: Missing thumbnails open 3 comments"));

    let output = chefops(config.path())
        .args(["repos", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["repo"]["full_name"], "le/sushi-chef-pbs");
    assert_eq!(listed[0]["branches"].as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["issues"].as_array().unwrap().len(), 1);
}
