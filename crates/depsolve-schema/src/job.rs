//! Solver jobs, job flags and solver options.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use thiserror::Error;

/// Errors produced while turning a job string into a [`SolveJob`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The job string contained nothing but whitespace.
    #[error("Empty job specification")]
    Empty,

    /// The flags carry no recognised action bits.
    #[error("Job flags 0x{0:x} carry no known action")]
    NoAction(u32),
}

/// What a job asks the solver to do with the packages it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    /// Make sure a matching package is installed, keeping installed versions where possible.
    Install,
    /// Remove every installed package the job matches.
    Erase,
    /// Install or update to the best matching version.
    Update,
    /// Keep the installed package exactly as it is (or keep it absent).
    Lock,
}

impl JobAction {
    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Erase => "erase",
            Self::Update => "update",
            Self::Lock => "lock",
        }
    }
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "install" => Ok(Self::Install),
            "erase" | "remove" | "uninstall" => Ok(Self::Erase),
            "update" | "upgrade" => Ok(Self::Update),
            "lock" => Ok(Self::Lock),
            _ => Err(format!("Unknown job action: {s}")),
        }
    }
}

/// Job flag bitmask shared by the jobs of one resolve call.
///
/// The action lives in bits `0xff00`, modifiers above it. The values match
/// libsolv's `SOLVER_*` job constants so callers that already speak that
/// encoding can pass their masks straight through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobFlags(u32);

impl JobFlags {
    /// Install action.
    pub const INSTALL: Self = Self(0x0100);
    /// Erase action.
    pub const ERASE: Self = Self(0x0200);
    /// Update action.
    pub const UPDATE: Self = Self(0x0300);
    /// Lock action.
    pub const LOCK: Self = Self(0x0600);
    /// Modifier: a job that matches nothing is dropped instead of reported.
    pub const WEAK: Self = Self(0x0001_0000);

    const ACTION_MASK: u32 = 0xff00;

    /// Wrap a raw bitmask.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bitmask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    ///
    /// Action bits are compared as a whole, so `UPDATE` does not contain
    /// `INSTALL` even though their encodings overlap.
    pub fn contains(self, other: Self) -> bool {
        let other_action = other.0 & Self::ACTION_MASK;
        let modifiers = other.0 & !Self::ACTION_MASK;
        (other_action == 0 || self.0 & Self::ACTION_MASK == other_action)
            && self.0 & modifiers == modifiers
    }

    /// The action encoded in these flags, if it is one we know.
    pub fn action(self) -> Option<JobAction> {
        match self.0 & Self::ACTION_MASK {
            0x0100 => Some(JobAction::Install),
            0x0200 => Some(JobAction::Erase),
            0x0300 => Some(JobAction::Update),
            0x0600 => Some(JobAction::Lock),
            _ => None,
        }
    }

    /// Replace the action bits, keeping modifiers.
    pub fn with_action(self, action: JobAction) -> Self {
        let bits = match action {
            JobAction::Install => Self::INSTALL.0,
            JobAction::Erase => Self::ERASE.0,
            JobAction::Update => Self::UPDATE.0,
            JobAction::Lock => Self::LOCK.0,
        };
        Self((self.0 & !Self::ACTION_MASK) | bits)
    }
}

impl Default for JobFlags {
    fn default() -> Self {
        Self::INSTALL
    }
}

impl BitOr for JobFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One request submitted to the solver: a match specification plus flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveJob {
    /// Match specification, e.g. `numpy >=1.20,<2`.
    pub spec: String,
    /// Action and modifiers for this job.
    pub flags: JobFlags,
}

impl SolveJob {
    /// Parse a job string against the flags shared by the whole request.
    ///
    /// A leading action word (`install`, `remove`, `update`, `lock`, ...)
    /// overrides the shared action for this job only; modifiers are kept.
    ///
    /// # Example
    ///
    /// ```
    /// use depsolve_schema::{JobAction, JobFlags, SolveJob};
    ///
    /// let job = SolveJob::parse("remove foo", JobFlags::INSTALL).unwrap();
    /// assert_eq!(job.spec, "foo");
    /// assert_eq!(job.action(), JobAction::Erase);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Empty`] for a blank string and
    /// [`JobError::NoAction`] if `shared` carries no known action and the
    /// string does not name one.
    pub fn parse(job: &str, shared: JobFlags) -> Result<Self, JobError> {
        let job = job.trim();
        if job.is_empty() {
            return Err(JobError::Empty);
        }

        if let Some((word, rest)) = job.split_once(char::is_whitespace) {
            if let Ok(action) = word.parse::<JobAction>() {
                let rest = rest.trim();
                if !rest.is_empty() {
                    return Ok(Self {
                        spec: rest.to_string(),
                        flags: shared.with_action(action),
                    });
                }
            }
        }

        if shared.action().is_none() {
            return Err(JobError::NoAction(shared.bits()));
        }

        Ok(Self {
            spec: job.to_string(),
            flags: shared,
        })
    }

    /// The job's action. Jobs built through [`SolveJob::parse`] always have one;
    /// hand-built jobs with unknown action bits are treated as installs.
    pub fn action(&self) -> JobAction {
        self.flags.action().unwrap_or(JobAction::Install)
    }

    /// Whether this job may match nothing without producing a problem.
    pub fn is_weak(&self) -> bool {
        self.flags.contains(JobFlags::WEAK)
    }
}

impl std::fmt::Display for SolveJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.action(), self.spec)
    }
}

/// A solver option, passed through to the solver unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOption {
    /// Option identifier understood by the solver.
    pub id: u32,
    /// Integer value (booleans are 0 / 1).
    pub value: i32,
}

impl SolverOption {
    /// Create a new option pair.
    pub fn new(id: u32, value: i32) -> Self {
        Self { id, value }
    }
}

impl std::str::FromStr for SolverOption {
    type Err = String;

    /// Parse `ID=VALUE`, e.g. `19=1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid solver option '{s}': expected ID=VALUE"))?;
        let id = id
            .trim()
            .parse()
            .map_err(|_| format!("Invalid solver option id in '{s}'"))?;
        let value = value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid solver option value in '{s}'"))?;
        Ok(Self { id, value })
    }
}
