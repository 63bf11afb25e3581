//! Turn a solved transaction into install and remove records.
//!
//! The classifier only talks to the transaction through [`TransactionView`],
//! so it can be driven by the real solver transaction or by a fixture.

use crate::error::{ResolveError, Result};
use crate::reporter::Reporter;
use crate::solver::SolvableId;
use depsolve_schema::{InstallRecord, RemoveRecord, Resolution, TransactionClass};

/// Bit set controlling how a transaction groups its steps into classes.
///
/// Bit values follow libsolv's `SOLVER_TRANSACTION_*` mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassifyMode(u32);

impl ClassifyMode {
    /// Do not report vendor changes as a class of their own.
    pub const MERGE_VENDORCHANGES: Self = Self(0x20);
    /// Do not report architecture changes as a class of their own.
    pub const MERGE_ARCHCHANGES: Self = Self(0x40);
    /// Report a replaced package as upgraded/downgraded instead of an
    /// erase plus an install.
    pub const OBSOLETE_IS_UPGRADE: Self = Self(0x200);

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ClassifyMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One class of a transaction and how many packages it covers.
///
/// `from`/`to` are only set for change classes (e.g. the old and new vendor).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassBatch {
    /// Raw class id.
    pub class: u32,
    /// Number of packages in the class.
    pub count: usize,
    /// What the packages change from.
    pub from: Option<String>,
    /// What the packages change to.
    pub to: Option<String>,
}

impl ClassBatch {
    /// A batch without change details.
    pub fn new(class: u32, count: usize) -> Self {
        Self {
            class,
            count,
            from: None,
            to: None,
        }
    }
}

/// Repository and index file name identifying one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageRef<'a> {
    /// Repository the package belongs to.
    pub repo: &'a str,
    /// Key of the package under `"packages"` in that repository's index.
    pub file_name: &'a str,
}

/// Read access to a solved transaction.
pub trait TransactionView {
    /// Classes present in the transaction, in the transaction's order.
    fn classes(&self, mode: ClassifyMode) -> Vec<ClassBatch>;

    /// Packages belonging to `batch`.
    fn class_members(&self, mode: ClassifyMode, batch: &ClassBatch) -> Vec<SolvableId>;

    /// The package replacing `old`, if it is replaced.
    fn replacement(&self, old: SolvableId) -> Option<SolvableId>;

    /// Repository and file name of a package.
    fn package(&self, id: SolvableId) -> Option<PackageRef<'_>>;
}

/// Map every class of `transaction` onto install and remove records.
///
/// Upgrades and downgrades become a removal of the old package plus an
/// installation of its replacement. Vendor and architecture changes are
/// already covered by the replacement itself and add nothing. Unknown
/// classes only produce a notice. Metadata is left empty.
///
/// # Errors
///
/// Returns [`ResolveError::Internal`] when a package cannot be looked up or
/// an upgraded/downgraded package has no replacement.
pub fn classify<T: TransactionView + ?Sized>(
    transaction: &T,
    mode: ClassifyMode,
    reporter: &dyn Reporter,
) -> Result<Resolution> {
    let mut resolution = Resolution::default();

    for batch in transaction.classes(mode) {
        let class = TransactionClass::from_raw(batch.class);
        tracing::debug!("{} package(s) {class}", batch.count);

        match class {
            TransactionClass::VendorChanged | TransactionClass::ArchChanged => {}
            TransactionClass::Unknown(raw) => {
                tracing::warn!("Unhandled transaction class 0x{raw:x} ({} packages)", batch.count);
                reporter.notice(&format!(
                    "unhandled transaction class 0x{raw:x} with {} package(s)",
                    batch.count
                ));
            }
            TransactionClass::Upgraded | TransactionClass::Downgraded => {
                for old in transaction.class_members(mode, &batch) {
                    let removed = package(transaction, old)?;
                    let new = transaction.replacement(old).ok_or_else(|| {
                        ResolveError::Internal(format!(
                            "{class} package '{}' has no replacement",
                            removed.file_name
                        ))
                    })?;
                    let added = package(transaction, new)?;
                    resolution
                        .removes
                        .push(RemoveRecord::new(removed.repo, removed.file_name));
                    resolution
                        .installs
                        .push(InstallRecord::new(added.repo, added.file_name));
                }
            }
            TransactionClass::Erased => {
                for id in transaction.class_members(mode, &batch) {
                    let pkg = package(transaction, id)?;
                    resolution
                        .removes
                        .push(RemoveRecord::new(pkg.repo, pkg.file_name));
                }
            }
            TransactionClass::Installed => {
                for id in transaction.class_members(mode, &batch) {
                    let pkg = package(transaction, id)?;
                    resolution
                        .installs
                        .push(InstallRecord::new(pkg.repo, pkg.file_name));
                }
            }
        }
    }

    Ok(resolution)
}

fn package<T: TransactionView + ?Sized>(transaction: &T, id: SolvableId) -> Result<PackageRef<'_>> {
    transaction
        .package(id)
        .ok_or_else(|| ResolveError::Internal(format!("transaction references unknown package {id}")))
}
