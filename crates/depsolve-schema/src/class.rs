//! Transaction classes reported by the solver.
//!
//! The solver hands out classes as opaque integer ids (the numbering follows
//! libsolv's `SOLVER_TRANSACTION_*` constants). [`TransactionClass`] decodes
//! the ids this crate knows about and keeps everything else as
//! [`TransactionClass::Unknown`] so new solver classes never become errors.

use serde::{Deserialize, Serialize};

/// Raw class ids as emitted by the solver.
pub mod class_id {
    /// A package leaves the system without replacement.
    pub const ERASE: u32 = 0x10;
    /// A package is replaced by a different build of the same version.
    pub const REINSTALLED: u32 = 0x11;
    /// A package is replaced by a lower version.
    pub const DOWNGRADED: u32 = 0x12;
    /// A package is replaced by a package of equal version but other content.
    pub const CHANGED: u32 = 0x13;
    /// A package is replaced by a higher version.
    pub const UPGRADED: u32 = 0x14;
    /// A package is newly installed.
    pub const INSTALL: u32 = 0x20;
    /// Replacements that move between architectures (subdirs).
    pub const ARCHCHANGE: u32 = 0x100;
    /// Replacements that move between vendors (channels).
    pub const VENDORCHANGE: u32 = 0x101;
}

/// How the solver classified a group of affected packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionClass {
    /// Installed package replaced by a higher version.
    Upgraded,
    /// Installed package replaced by a lower version.
    Downgraded,
    /// Replacement that changes the package vendor.
    VendorChanged,
    /// Replacement that changes the package architecture.
    ArchChanged,
    /// Installed package removed without replacement.
    Erased,
    /// Package newly installed.
    Installed,
    /// Any class id this crate does not interpret.
    Unknown(u32),
}

impl TransactionClass {
    /// Decode a raw solver class id.
    pub fn from_raw(id: u32) -> Self {
        match id {
            class_id::UPGRADED => Self::Upgraded,
            class_id::DOWNGRADED => Self::Downgraded,
            class_id::VENDORCHANGE => Self::VendorChanged,
            class_id::ARCHCHANGE => Self::ArchChanged,
            class_id::ERASE => Self::Erased,
            class_id::INSTALL => Self::Installed,
            other => Self::Unknown(other),
        }
    }

    /// The raw solver id for this class.
    pub fn raw(self) -> u32 {
        match self {
            Self::Upgraded => class_id::UPGRADED,
            Self::Downgraded => class_id::DOWNGRADED,
            Self::VendorChanged => class_id::VENDORCHANGE,
            Self::ArchChanged => class_id::ARCHCHANGE,
            Self::Erased => class_id::ERASE,
            Self::Installed => class_id::INSTALL,
            Self::Unknown(id) => id,
        }
    }

    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upgraded => "upgraded",
            Self::Downgraded => "downgraded",
            Self::VendorChanged => "vendorchanged",
            Self::ArchChanged => "archchanged",
            Self::Erased => "erased",
            Self::Installed => "installed",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for TransactionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "unknown(0x{id:x})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
