//! Reporter trait for dependency injection
//!
//! This trait allows the resolve pipeline to report progress and diagnostics
//! without being coupled to a specific terminal or GUI front end.

/// Sink for user-facing progress and diagnostic text.
pub trait Reporter: Send + Sync {
    /// A repository finished loading into the solver.
    fn repository_loaded(&self, name: &str, packages: usize);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a notice that does not stop the pipeline (e.g. an unhandled transaction class).
    fn notice(&self, msg: &str);

    /// Report one solver problem.
    fn problem(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn repository_loaded(&self, name: &str, packages: usize) {
        (**self).repository_loaded(name, packages);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn notice(&self, msg: &str) {
        (**self).notice(msg);
    }
    fn problem(&self, msg: &str) {
        (**self).problem(msg);
    }
}

/// A no-op reporter for silent operations (e.g., quiet resolves, testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn repository_loaded(&self, _: &str, _: usize) {}
    fn info(&self, _: &str) {}
    fn notice(&self, _: &str) {}
    fn problem(&self, _: &str) {}
}

/// Plain-text reporter writing to stderr, keeping stdout free for results.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn repository_loaded(&self, name: &str, packages: usize) {
        eprintln!("{packages} packages in {name}");
    }
    fn info(&self, msg: &str) {
        eprintln!("{msg}");
    }
    fn notice(&self, msg: &str) {
        eprintln!("notice: {msg}");
    }
    fn problem(&self, msg: &str) {
        eprintln!("Problem: {msg}");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Reporter;
    use std::sync::Mutex;

    /// Records every message, for asserting on diagnostics in tests.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingReporter {
        pub(crate) lines: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        pub(crate) fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        fn push(&self, line: String) {
            self.lines.lock().unwrap().push(line);
        }
    }

    impl Reporter for RecordingReporter {
        fn repository_loaded(&self, name: &str, packages: usize) {
            self.push(format!("{packages} packages in {name}"));
        }
        fn info(&self, msg: &str) {
            self.push(msg.to_string());
        }
        fn notice(&self, msg: &str) {
            self.push(format!("notice: {msg}"));
        }
        fn problem(&self, msg: &str) {
            self.push(format!("problem: {msg}"));
        }
    }
}
