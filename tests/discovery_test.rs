//! End-to-end tests for the discovery pipeline.
//!
//! These drive `DiscoveryService` against on-disk checkouts, in-memory
//! fixtures, and deliberately unreliable hosts: directory pruning, the
//! widened fallback pass, retry exhaustion and recovery, chunked
//! extraction, and run-to-run determinism.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use perfmap::classify_risk;
use perfmap::config::PerfmapConfig;
use perfmap::discovery::{DiscoverOptions, DiscoveryError, DiscoveryService};
use perfmap::repo::{
    HostError, InMemoryRepository, LocalRepository, RemoteEntry, RepositoryHost,
};

fn fast_config() -> PerfmapConfig {
    let mut config = PerfmapConfig::default();
    config.retry_base_delay_ms = 1;
    config
}

fn service() -> DiscoveryService {
    DiscoveryService::with_config(fast_config()).unwrap()
}

/// Writes a small polyglot service to disk: a Flask API, an Express
/// server, and the noise directories a real checkout carries alongside
/// them. Routes planted in the noise must never surface.
fn create_service_checkout() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    std::fs::create_dir_all(root.join("api")).unwrap();
    std::fs::write(
        root.join("api").join("users.py"),
        concat!(
            "from flask import Flask, jsonify, request\n",
            "\n",
            "app = Flask(\"users\")\n",
            "\n",
            "@app.route(\"/api/users\", methods=[\"GET\"])\n",
            "def list_users():\n",
            "    if request.args.get(\"active\"):\n",
            "        return jsonify(active_users())\n",
            "    return jsonify(all_users())\n",
            "\n",
            "@app.route(\"/api/users\", methods=[\"POST\"])\n",
            "def create_user():\n",
            "    try:\n",
            "        payload = request.get_json()\n",
            "    except ValueError:\n",
            "        return \"bad request\", 400\n",
            "    return jsonify(save_user(payload)), 201\n",
        ),
    )
    .unwrap();

    std::fs::create_dir_all(root.join("web")).unwrap();
    std::fs::write(
        root.join("web").join("server.js"),
        concat!(
            "const express = require('express');\n",
            "const app = express();\n",
            "\n",
            "app.get('/health', (req, res) => res.json({ ok: true }));\n",
            "\n",
            "app.delete('/api/sessions/:id', async (req, res) => {\n",
            "  await store.revoke(req.params.id);\n",
            "  res.sendStatus(204);\n",
            "});\n",
        ),
    )
    .unwrap();

    std::fs::create_dir_all(root.join("node_modules").join("express")).unwrap();
    std::fs::write(
        root.join("node_modules").join("express").join("index.js"),
        "app.get('/from-node-modules', handler);\n",
    )
    .unwrap();
    std::fs::create_dir_all(root.join(".git").join("hooks")).unwrap();
    std::fs::write(
        root.join(".git").join("hooks").join("sample.py"),
        "@app.get(\"/from-git-dir\")\ndef hook():\n    pass\n",
    )
    .unwrap();
    std::fs::create_dir_all(root.join("dist")).unwrap();
    std::fs::write(
        root.join("dist").join("bundle.js"),
        "app.post('/from-build-output', handler);\n",
    )
    .unwrap();

    dir
}

/// Host whose directory listings fail a fixed number of times before
/// delegating to in-memory storage.
struct FlakyHost {
    inner: InMemoryRepository,
    failures_left: AtomicU32,
    list_calls: AtomicU32,
}

impl FlakyHost {
    fn new(inner: InMemoryRepository, failures: u32) -> Self {
        Self {
            inner,
            failures_left: AtomicU32::new(failures),
            list_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl RepositoryHost for FlakyHost {
    async fn list_directory(
        &self,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<RemoteEntry>, HostError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(HostError::Network("connection reset".to_string()));
        }
        self.inner.list_directory(path, git_ref).await
    }

    async fn read_file(&self, path: &str, git_ref: &str) -> Result<Option<Vec<u8>>, HostError> {
        self.inner.read_file(path, git_ref).await
    }

    async fn list_branches(&self) -> Result<Vec<String>, HostError> {
        self.inner.list_branches().await
    }
}

/// Host that lists one file its storage cannot actually serve, the way a
/// remote behaves when a file is deleted between listing and fetch.
struct PhantomHost {
    inner: InMemoryRepository,
}

#[async_trait]
impl RepositoryHost for PhantomHost {
    async fn list_directory(
        &self,
        path: &str,
        git_ref: &str,
    ) -> Result<Vec<RemoteEntry>, HostError> {
        let mut entries = self.inner.list_directory(path, git_ref).await?;
        if path.is_empty() {
            entries.push(RemoteEntry::file("deleted_last_push.py", 512));
        }
        Ok(entries)
    }

    async fn read_file(&self, path: &str, git_ref: &str) -> Result<Option<Vec<u8>>, HostError> {
        self.inner.read_file(path, git_ref).await
    }

    async fn list_branches(&self) -> Result<Vec<String>, HostError> {
        self.inner.list_branches().await
    }
}

/// Generates a Python API large enough to force chunked extraction: each
/// route block is followed by `spacing` padding lines.
fn numbered_python_api(routes: usize, spacing: usize) -> String {
    let mut source = String::new();
    for i in 0..routes {
        source.push_str(&format!("@app.get(\"/resource/{}\")\n", i));
        source.push_str(&format!("def handler_{}():\n", i));
        source.push_str("    return db.fetch()\n");
        for j in 0..spacing {
            source.push_str(&format!("# padding {} {}\n", i, j));
        }
    }
    source
}

/// Full pass over an on-disk checkout: both ecosystems contribute, every
/// endpoint carries context metadata, and the noise directories stay out.
#[tokio::test]
async fn test_local_checkout_end_to_end() {
    let checkout = create_service_checkout();
    let host: Arc<dyn RepositoryHost> = Arc::new(LocalRepository::new(checkout.path()));

    let endpoints = service()
        .discover(host, "main", &DiscoverOptions::default())
        .await
        .unwrap();

    let mut names: Vec<&str> = endpoints.iter().map(|e| e.endpoint.as_str()).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "DELETE /api/sessions/:id",
            "GET /api/users",
            "GET /health",
            "POST /api/users",
        ]
    );

    let list_users = endpoints
        .iter()
        .find(|e| e.endpoint == "GET /api/users")
        .unwrap();
    assert_eq!(list_users.function_name, "list_users");
    assert_eq!(list_users.framework, "Flask");
    assert!(list_users.file_path.ends_with("api/users.py"));
    assert!(list_users.code_excerpt.contains("@app.route"));

    for ep in &endpoints {
        assert!((0.0..=10.0).contains(&ep.complexity_score), "{}", ep);
        assert_eq!(ep.risk_level, classify_risk(ep.complexity_score, &ep.issue_tags));
        assert!(!ep.file_path.contains("node_modules"));
        assert!(!ep.file_path.contains(".git"));
        assert!(!ep.file_path.contains("dist"));
    }
}

#[tokio::test]
async fn test_repeated_runs_return_identical_results() {
    let host: Arc<dyn RepositoryHost> = Arc::new(
        InMemoryRepository::new()
            .with_file(
                "app/api.py",
                "@app.get(\"/items\")\ndef items():\n    return store.all()\n",
            )
            .with_file(
                "app/admin.py",
                "@router.post(\"/admin/reindex\")\nasync def reindex():\n    await index.rebuild()\n",
            )
            .with_file("srv/hooks.ts", "router.post('/webhooks/github', handleHook);\n"),
    );
    let svc = service();

    let first = svc
        .discover(Arc::clone(&host), "main", &DiscoverOptions::default())
        .await
        .unwrap();
    let second = svc
        .discover(host, "main", &DiscoverOptions::default())
        .await
        .unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

/// A host that never recovers surfaces as `RepositoryUnavailable` carrying
/// the attempt count, and the retry policy stops exactly at that count.
#[tokio::test]
async fn test_persistent_network_failure_reports_unavailable() {
    let flaky = Arc::new(FlakyHost::new(
        InMemoryRepository::new().with_file("api.py", "@app.get(\"/items\")\ndef items():\n    pass\n"),
        u32::MAX,
    ));
    let host: Arc<dyn RepositoryHost> = Arc::clone(&flaky) as Arc<dyn RepositoryHost>;

    let err = service()
        .discover(host, "main", &DiscoverOptions::default())
        .await
        .unwrap_err();

    match err {
        DiscoveryError::RepositoryUnavailable { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(source.is_transient());
        }
        other => panic!("expected RepositoryUnavailable, got {:?}", other),
    }
    assert_eq!(flaky.list_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_transient_failure_recovers_within_budget() {
    let flaky = Arc::new(FlakyHost::new(
        InMemoryRepository::new().with_file(
            "api.py",
            "@app.get(\"/items\")\ndef items():\n    return store.all()\n",
        ),
        1,
    ));
    let host: Arc<dyn RepositoryHost> = Arc::clone(&flaky) as Arc<dyn RepositoryHost>;

    let endpoints = service()
        .discover(host, "main", &DiscoverOptions::default())
        .await
        .unwrap();

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].endpoint, "GET /items");
    assert!(flaky.list_calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_file_missing_at_read_time_is_skipped() {
    let host: Arc<dyn RepositoryHost> = Arc::new(PhantomHost {
        inner: InMemoryRepository::new().with_file(
            "api.py",
            "@app.get(\"/items\")\ndef items():\n    return store.all()\n",
        ),
    });

    let endpoints = service()
        .discover(host, "main", &DiscoverOptions::default())
        .await
        .unwrap();

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].file_path, "api.py");
}

/// Chunked extraction is invisible to callers: a config that splits the
/// file into small overlapping windows reports the same endpoints at the
/// same lines as the whole-file default.
#[tokio::test]
async fn test_chunked_configuration_matches_whole_file() {
    let source = numbered_python_api(12, 9);
    let make_host = || -> Arc<dyn RepositoryHost> {
        Arc::new(InMemoryRepository::new().with_file("big_api.py", source.clone()))
    };

    let whole = service()
        .discover(make_host(), "main", &DiscoverOptions::default())
        .await
        .unwrap();

    let mut chunked_config = fast_config();
    chunked_config.chunk_lines = 40;
    chunked_config.chunk_overlap = 8;
    let chunked = DiscoveryService::with_config(chunked_config)
        .unwrap()
        .discover(make_host(), "main", &DiscoverOptions::default())
        .await
        .unwrap();

    assert_eq!(whole.len(), 12);
    let key = |eps: &[perfmap::model::DiscoveredEndpoint]| {
        eps.iter()
            .map(|e| (e.endpoint.clone(), e.line_number))
            .collect::<Vec<_>>()
    };
    assert_eq!(key(&chunked), key(&whole));
}

#[tokio::test]
async fn test_fallback_pass_is_optional() {
    // Routes only in a .conf file: invisible to the primary pass.
    let make_host = || -> Arc<dyn RepositoryHost> {
        Arc::new(
            InMemoryRepository::new()
                .with_file("notes.py", "# architecture notes, no routes\n")
                .with_file("gateway/routes.conf", "app.get('/internal/status', statusHandler)\n"),
        )
    };

    let with_fallback = service()
        .discover(make_host(), "main", &DiscoverOptions::default())
        .await
        .unwrap();
    assert_eq!(with_fallback.len(), 1);
    assert_eq!(with_fallback[0].endpoint, "GET /internal/status");

    let disabled = DiscoverOptions {
        fallback_enabled: false,
        ..DiscoverOptions::default()
    };
    let without = service()
        .discover(make_host(), "main", &disabled)
        .await
        .unwrap();
    assert!(without.is_empty());
}

#[tokio::test]
async fn test_requested_ref_falls_back_to_listed_branch() {
    let host: Arc<dyn RepositoryHost> = Arc::new(
        InMemoryRepository::new()
            .with_file(
                "api.py",
                "@app.get(\"/items\")\ndef items():\n    return store.all()\n",
            )
            .with_branch("master"),
    );

    // "main" is not a listed branch; discovery resolves to master and
    // still succeeds.
    let endpoints = service()
        .discover(host, "main", &DiscoverOptions::default())
        .await
        .unwrap();
    assert_eq!(endpoints.len(), 1);
}
