//! Solver option ids and the settings they control.
//!
//! Ids that have a libsolv counterpart reuse its `SOLVER_FLAG_*` number.

/// Allow installed packages not named by a job to move to a lower version.
pub const ALLOW_DOWNGRADE: u32 = 1;
/// Only consider a package from the highest-priority repository offering it.
pub const STRICT_REPO_PRIORITY: u32 = 19;
/// Keep installed versions of packages that no update job names (default on).
pub const FAVOR_INSTALLED: u32 = 100;

/// Settings applied to one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverFlags {
    /// See [`ALLOW_DOWNGRADE`].
    pub allow_downgrade: bool,
    /// See [`STRICT_REPO_PRIORITY`].
    pub strict_repo_priority: bool,
    /// See [`FAVOR_INSTALLED`].
    pub favor_installed: bool,
}

impl Default for SolverFlags {
    fn default() -> Self {
        Self {
            allow_downgrade: false,
            strict_repo_priority: false,
            favor_installed: true,
        }
    }
}

impl SolverFlags {
    /// Apply one option; returns `false` when the id is not recognised.
    pub fn set(&mut self, id: u32, value: i32) -> bool {
        let on = value != 0;
        match id {
            ALLOW_DOWNGRADE => self.allow_downgrade = on,
            STRICT_REPO_PRIORITY => self.strict_repo_priority = on,
            FAVOR_INSTALLED => self.favor_installed = on,
            _ => {
                tracing::debug!("Ignoring unknown solver option {id}={value}");
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_and_unknown_options() {
        let mut flags = SolverFlags::default();
        assert!(flags.set(STRICT_REPO_PRIORITY, 1));
        assert!(flags.set(FAVOR_INSTALLED, 0));
        assert!(!flags.set(4242, 1));
        assert!(flags.strict_repo_priority);
        assert!(!flags.favor_installed);
        assert!(!flags.allow_downgrade);
    }
}
