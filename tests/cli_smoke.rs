/// CLI smoke tests: invoke the compiled binary, no embedding provider required.
/// Every test points DOCSCOPE_HOME at a temp dir.
use assert_cmd::Command;
use tempfile::TempDir;

#[allow(deprecated)]
fn docscope(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docscope").unwrap();
    cmd.env("DOCSCOPE_HOME", home.path())
        .env_remove("DOCSCOPE_EMBEDDING_DIM")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a tiny collection straight to the store location
fn seed_store(home: &TempDir) {
    let dir = home.path().join("embeddings");
    std::fs::create_dir_all(&dir).unwrap();
    let entries: Vec<serde_json::Value> = (0..8)
        .map(|i| {
            let group = if i < 4 { 0.0 } else { 5.0 };
            serde_json::json!({
                "id": format!("{}_doc_{}.txt", if i < 4 { "tokio" } else { "serde" }, i),
                "embedding": [group + i as f32 * 0.1, group, (i % 3) as f32 * 0.2, 1.0],
            })
        })
        .collect();
    std::fs::write(
        dir.join("document_embeddings.json"),
        serde_json::to_string(&entries).unwrap(),
    )
    .unwrap();
}

// ── Binary runs ──────────────────────────────────────────────────────────

#[test]
fn help_flag_exits_zero() {
    let tmp = TempDir::new().unwrap();
    docscope(&tmp).arg("--help").assert().success();
}

#[test]
fn version_flag_exits_zero() {
    let tmp = TempDir::new().unwrap();
    docscope(&tmp).arg("--version").assert().success();
}

// ── Not ready is reported, not fatal ─────────────────────────────────────

#[test]
fn status_without_store_exits_zero() {
    let tmp = TempDir::new().unwrap();
    docscope(&tmp).arg("status").assert().success();
}

#[test]
fn search_without_store_explains_next_step() {
    let tmp = TempDir::new().unwrap();
    let output = docscope(&tmp)
        .args(["search", "async runtime"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("docscope embed"), "stderr: {}", stderr);
}

#[test]
fn show_missing_document_exits_zero() {
    let tmp = TempDir::new().unwrap();
    docscope(&tmp).args(["show", "nope.txt"]).assert().success();
}

#[test]
fn show_prints_titled_preview() {
    let tmp = TempDir::new().unwrap();
    let processed = tmp.path().join("processed");
    std::fs::create_dir_all(&processed).unwrap();
    std::fs::write(processed.join("tokio_guide.txt"), "Tokio is an async runtime.").unwrap();

    let output = docscope(&tmp)
        .args(["show", "tokio_guide.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tokio Guide"));
    assert!(stdout.contains("async runtime"));
}

// ── Visualization ────────────────────────────────────────────────────────

#[test]
fn viz_unknown_method_fails() {
    let tmp = TempDir::new().unwrap();
    seed_store(&tmp);
    docscope(&tmp)
        .args(["viz", "--method", "isomap"])
        .assert()
        .failure();
}

#[test]
fn viz_too_many_clusters_fails() {
    let tmp = TempDir::new().unwrap();
    seed_store(&tmp);
    docscope(&tmp)
        .args(["viz", "--method", "pca", "--clusters", "20"])
        .assert()
        .failure();
}

#[test]
fn viz_writes_svg() {
    let tmp = TempDir::new().unwrap();
    seed_store(&tmp);
    let out = tmp.path().join("maps").join("clusters.svg");

    docscope(&tmp)
        .args(["viz", "--method", "pca", "--clusters", "2", "--out"])
        .arg(&out)
        .assert()
        .success();

    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<circle").count(), 8);
}

#[test]
fn viz_plain_json_to_stdout() {
    let tmp = TempDir::new().unwrap();
    seed_store(&tmp);
    let output = docscope(&tmp)
        .args(["viz", "--method", "umap", "--plain", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let scene: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(scene["method"], "umap");
    assert_eq!(scene["points"].as_array().unwrap().len(), 8);
}

#[test]
fn status_reports_ready_store() {
    let tmp = TempDir::new().unwrap();
    seed_store(&tmp);
    let output = docscope(&tmp).arg("status").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Embedded documents: 8"));
}
