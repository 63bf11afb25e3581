//! The change set between the installed packages and a solution.

use super::pool::{Pool, SolvableId};
use crate::classify::{ClassBatch, ClassifyMode, PackageRef, TransactionView};
use depsolve_schema::class::class_id;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    class: u32,
    solvable: SolvableId,
}

type ClassKey = (u32, Option<String>, Option<String>);

/// Steps needed to move the installed set to a solution.
///
/// Replaced packages are recorded once, under the installed package, with a
/// link to the package replacing it.
#[derive(Debug)]
pub struct Transaction<'p> {
    pool: &'p Pool,
    steps: Vec<Step>,
    obsoletes: HashMap<SolvableId, SolvableId>,
}

impl<'p> Transaction<'p> {
    /// Compute the transaction from the chosen solvable of every package name.
    pub fn new(pool: &'p Pool, chosen: &BTreeMap<String, SolvableId>) -> Self {
        let kept: HashSet<SolvableId> = pool
            .installed_solvables()
            .iter()
            .copied()
            .filter(|id| chosen.get(&pool.solvable(*id).name) == Some(id))
            .collect();

        let mut steps = Vec::new();
        let mut obsoletes = HashMap::new();
        let mut claimed = HashSet::new();

        for &old in pool.installed_solvables() {
            if kept.contains(&old) {
                continue;
            }
            let installed = pool.solvable(old);
            match chosen.get(&installed.name) {
                Some(&new) if !pool.is_installed(new) && claimed.insert(new) => {
                    let class = match pool.solvable(new).semver.cmp(&installed.semver) {
                        Ordering::Greater => class_id::UPGRADED,
                        Ordering::Less => class_id::DOWNGRADED,
                        Ordering::Equal => class_id::REINSTALLED,
                    };
                    obsoletes.insert(old, new);
                    steps.push(Step {
                        class,
                        solvable: old,
                    });
                }
                _ => steps.push(Step {
                    class: class_id::ERASE,
                    solvable: old,
                }),
            }
        }

        for &new in chosen.values() {
            if !pool.is_installed(new) && !claimed.contains(&new) {
                steps.push(Step {
                    class: class_id::INSTALL,
                    solvable: new,
                });
            }
        }

        Self {
            pool,
            steps,
            obsoletes,
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the solution leaves the installed set untouched.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Group steps into classes, keyed by `(class, from, to)`.
    fn grouped(&self, mode: ClassifyMode) -> BTreeMap<ClassKey, Vec<SolvableId>> {
        let mut groups: BTreeMap<ClassKey, Vec<SolvableId>> = BTreeMap::new();
        let mut push = |class: u32, from: Option<&str>, to: Option<&str>, id: SolvableId| {
            groups
                .entry((class, from.map(str::to_string), to.map(str::to_string)))
                .or_default()
                .push(id);
        };

        for step in &self.steps {
            let Some(&new) = self.obsoletes.get(&step.solvable) else {
                push(step.class, None, None, step.solvable);
                continue;
            };

            if !mode.contains(ClassifyMode::OBSOLETE_IS_UPGRADE) {
                push(class_id::ERASE, None, None, step.solvable);
                push(class_id::INSTALL, None, None, new);
                continue;
            }

            push(step.class, None, None, step.solvable);
            let old = self.pool.solvable(step.solvable);
            let replacement = self.pool.solvable(new);

            if !mode.contains(ClassifyMode::MERGE_ARCHCHANGES) {
                if let (Some(from), Some(to)) = (&old.subdir, &replacement.subdir) {
                    if from != to {
                        push(class_id::ARCHCHANGE, Some(from.as_str()), Some(to.as_str()), step.solvable);
                    }
                }
            }
            if !mode.contains(ClassifyMode::MERGE_VENDORCHANGES) {
                if let (Some(from), Some(to)) =
                    (self.pool.vendor(step.solvable), self.pool.vendor(new))
                {
                    if from != to {
                        push(class_id::VENDORCHANGE, Some(from), Some(to), step.solvable);
                    }
                }
            }
        }

        groups
    }
}

impl TransactionView for Transaction<'_> {
    fn classes(&self, mode: ClassifyMode) -> Vec<ClassBatch> {
        self.grouped(mode)
            .into_iter()
            .map(|((class, from, to), ids)| ClassBatch {
                class,
                count: ids.len(),
                from,
                to,
            })
            .collect()
    }

    fn class_members(&self, mode: ClassifyMode, batch: &ClassBatch) -> Vec<SolvableId> {
        self.grouped(mode)
            .remove(&(batch.class, batch.from.clone(), batch.to.clone()))
            .unwrap_or_default()
    }

    fn replacement(&self, old: SolvableId) -> Option<SolvableId> {
        self.obsoletes.get(&old).copied()
    }

    fn package(&self, id: SolvableId) -> Option<PackageRef<'_>> {
        let solvable = self.pool.get(id)?;
        Some(PackageRef {
            repo: &self.pool.repo(solvable.repo).name,
            file_name: &solvable.media_file,
        })
    }
}
