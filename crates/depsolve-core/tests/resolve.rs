//! End-to-end resolves against index files on disk

use depsolve_core::{LocateError, NullReporter, Reporter, ResolveError, ResolveRequest, resolve};
use depsolve_schema::{InstallRecord, JobFlags, RemoveRecord, RepositorySource, SolverOption};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn index(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("failed to write index");
        path
    }

    fn repo(&self, name: &str, content: &str) -> RepositorySource {
        RepositorySource::new(name, self.index(&format!("{name}.json"), content), 0)
    }
}

fn request(repositories: Vec<RepositorySource>, jobs: &[&str]) -> ResolveRequest {
    ResolveRequest {
        repositories,
        jobs: jobs.iter().map(ToString::to_string).collect(),
        ..ResolveRequest::default()
    }
}

#[derive(Default)]
struct Lines(Mutex<Vec<String>>);

impl Reporter for Lines {
    fn repository_loaded(&self, name: &str, packages: usize) {
        self.0.lock().unwrap().push(format!("{packages} packages in {name}"));
    }
    fn info(&self, msg: &str) {
        self.0.lock().unwrap().push(msg.to_string());
    }
    fn notice(&self, msg: &str) {
        self.0.lock().unwrap().push(format!("notice: {msg}"));
    }
    fn problem(&self, msg: &str) {
        self.0.lock().unwrap().push(format!("problem: {msg}"));
    }
}

#[test]
fn install_single_package() {
    let fx = Fixture::new();
    let main = fx.repo("main", r#"{"packages":{"foo-1.0.json":{"version":"1.0"}}}"#);

    let resolution = resolve(&request(vec![main], &["install foo"]), &NullReporter).unwrap();

    let mut expected = InstallRecord::new("main", "foo-1.0.json");
    expected.metadata = r#"{"version":"1.0"}"#.to_string();
    assert_eq!(resolution.installs, vec![expected]);
    assert!(resolution.removes.is_empty());
}

#[test]
fn two_unsatisfiable_jobs_give_two_problems() {
    let fx = Fixture::new();
    let main = fx.repo("main", r#"{"packages":{"foo-1.0.json":{"version":"1.0"}}}"#);
    let reporter = Lines::default();

    let err = resolve(&request(vec![main], &["bar", "baz >=2"]), &reporter).unwrap_err();

    let problems = err.problems().expect("should be unsatisfiable").to_vec();
    assert_eq!(
        problems,
        vec![
            "nothing provides requested bar".to_string(),
            "nothing provides requested baz >=2".to_string(),
        ]
    );
    let lines = reporter.0.lock().unwrap().clone();
    assert_eq!(lines[0], "1 packages in main");
    assert_eq!(lines[1], "problem: nothing provides requested bar");
    assert_eq!(lines[2], "problem: nothing provides requested baz >=2");
}

#[test]
fn upgrade_replaces_installed_package() {
    let fx = Fixture::new();
    let installed = fx.index(
        "installed.json",
        r#"{"packages":{"a-1.0.json":{"version":"1.0"},"keep-1.0.json":{"version":"1.0"}}}"#,
    );
    let main = fx.repo(
        "main",
        r#"{
            "packages": {
                "a-1.0.json": {"version": "1.0"},
                "a-2.0.json": {"version": "2.0", "depends": ["dep"], "about": "has } and { inside"},
                "dep-0.1.json": {"version": "0.1"},
                "keep-1.1.json": {"version": "1.1"}
            }
        }"#,
    );

    let mut req = request(vec![main], &["a"]);
    req.installed = Some(installed);
    req.job_flags = JobFlags::UPDATE;
    let resolution = resolve(&req, &NullReporter).unwrap();

    assert_eq!(resolution.removes, vec![RemoveRecord::new("installed", "a-1.0.json")]);
    let files: Vec<(&str, &str)> = resolution
        .installs
        .iter()
        .map(|r| (r.repo.as_str(), r.file_name.as_str()))
        .collect();
    assert_eq!(files, vec![("main", "a-2.0.json"), ("main", "dep-0.1.json")]);
    assert_eq!(
        resolution.installs[0].metadata,
        r#"{"version": "2.0", "depends": ["dep"], "about": "has } and { inside"}"#
    );
}

#[test]
fn erase_removes_installed_package() {
    let fx = Fixture::new();
    let installed = fx.index(
        "installed.json",
        r#"{"packages":{"a-1.0.json":{"version":"1.0"}}}"#,
    );

    let mut req = request(Vec::new(), &["remove a"]);
    req.installed = Some(installed);
    let resolution = resolve(&req, &NullReporter).unwrap();

    assert_eq!(resolution.removes, vec![RemoveRecord::new("installed", "a-1.0.json")]);
    assert!(resolution.installs.is_empty());
}

#[test]
fn strict_priority_option_is_applied() {
    let fx = Fixture::new();
    let mut high = fx.repo("high", r#"{"packages":{"x-1.0.json":{"version":"1.0"}}}"#);
    high.priority = 10;
    let low = fx.repo("low", r#"{"packages":{"x-2.0.json":{"version":"2.0"}}}"#);

    let mut req = request(vec![high, low], &["x"]);
    req.options = vec![SolverOption::new(19, 1)];
    let resolution = resolve(&req, &NullReporter).unwrap();

    assert_eq!(resolution.installs[0].repo, "high");
    assert_eq!(resolution.installs[0].file_name, "x-1.0.json");
}

#[test]
fn missing_index_is_io_error() {
    let fx = Fixture::new();
    let missing = RepositorySource::new("main", fx.dir.path().join("missing.json"), 0);

    let err = resolve(&request(vec![missing], &["foo"]), &NullReporter).unwrap_err();
    match err {
        ResolveError::Io { path, .. } => assert!(path.ends_with("missing.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_repository_names_are_rejected() {
    let fx = Fixture::new();
    let a = fx.repo("main", r#"{"packages":{}}"#);
    let b = a.clone();

    let err = resolve(&request(vec![a, b], &["foo"]), &NullReporter).unwrap_err();
    assert!(matches!(err, ResolveError::InvalidRequest(_)));
}

#[test]
fn escaped_key_is_metadata_error() {
    // The solver decodes the escaped key; the raw text never spells it out.
    let fx = Fixture::new();
    let main = fx.repo(
        "main",
        r#"{"packages":{"foo\u002d1.0.json":{"version":"1.0"}}}"#,
    );

    let err = resolve(&request(vec![main], &["foo"]), &NullReporter).unwrap_err();
    match err {
        ResolveError::MetadataExtraction { repo, file, source } => {
            assert_eq!(repo, "main");
            assert_eq!(file, "foo-1.0.json");
            assert!(matches!(source, LocateError::KeyNotFound { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn quiet_request_reports_nothing() {
    let fx = Fixture::new();
    let main = fx.repo("main", r#"{"packages":{"foo-1.0.json":{"version":"1.0"}}}"#);
    let reporter = Lines::default();

    let mut req = request(vec![main], &["foo"]);
    req.quiet = true;
    resolve(&req, &reporter).unwrap();

    assert!(reporter.0.lock().unwrap().is_empty());
}
