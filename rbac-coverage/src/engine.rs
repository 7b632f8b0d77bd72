//! # Coverage Engine
//!
//! Checks a whole requested rule set against a reference rule set.
//!
//! Both sets are decomposed into atomic rules; every requested atom must be
//! covered by at least one reference atom on its own. The check is a pure
//! function of its inputs and never fails.

use tracing::debug;

use crate::decompose::{decompose_all, AtomicRule};
use crate::model::PolicyRule;

/// Outcome of a coverage check.
///
/// Holds the requested atoms no reference atom covers, in the order they
/// were produced by decomposition. The report borrows from the requested
/// rules it was computed for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport<'a> {
    uncovered: Vec<AtomicRule<'a>>,
}

impl<'a> CoverageReport<'a> {
    /// Check if every requested atom is covered.
    pub fn is_covered(&self) -> bool {
        self.uncovered.is_empty()
    }

    /// The requested atoms that are not covered.
    pub fn uncovered(&self) -> &[AtomicRule<'a>] {
        &self.uncovered
    }

    /// Consume the report, returning the uncovered atoms.
    pub fn into_uncovered(self) -> Vec<AtomicRule<'a>> {
        self.uncovered
    }

    /// Render the uncovered atoms as single-target policy rules.
    pub fn uncovered_rules(&self) -> Vec<PolicyRule> {
        self.uncovered.iter().map(AtomicRule::to_policy_rule).collect()
    }
}

/// Check whether `reference` covers every permission in `requested`.
///
/// An empty `requested` set is always covered.
///
/// # Example
///
/// ```
/// use rbac_coverage::{check_coverage, PolicyRule};
///
/// let reference = vec![PolicyRule::new()
///     .with_api_groups([""])
///     .with_resources(["pods"])
///     .with_verbs(["get"])];
/// let requested = vec![PolicyRule::new()
///     .with_api_groups([""])
///     .with_resources(["pods", "services"])
///     .with_verbs(["get"])];
///
/// let report = check_coverage(&reference, &requested);
/// assert!(!report.is_covered());
/// assert_eq!(report.uncovered().len(), 1);
/// assert_eq!(report.uncovered()[0].resource(), Some("services"));
/// ```
pub fn check_coverage<'r>(
    reference: &[PolicyRule],
    requested: &'r [PolicyRule],
) -> CoverageReport<'r> {
    let owners: Vec<AtomicRule<'_>> = decompose_all(reference).collect();

    let mut candidates = 0usize;
    let uncovered: Vec<AtomicRule<'r>> = decompose_all(requested)
        .inspect(|_| candidates += 1)
        .filter(|candidate| !is_granted(&owners, candidate))
        .collect();

    debug!(
        reference_rules = reference.len(),
        requested_rules = requested.len(),
        owner_atoms = owners.len(),
        candidate_atoms = candidates,
        uncovered_atoms = uncovered.len(),
        "Coverage check complete"
    );

    CoverageReport { uncovered }
}

/// Boolean form of [`check_coverage`], stopping at the first uncovered atom.
pub fn covers_all(reference: &[PolicyRule], requested: &[PolicyRule]) -> bool {
    let owners: Vec<AtomicRule<'_>> = decompose_all(reference).collect();
    decompose_all(requested).all(|candidate| is_granted(&owners, &candidate))
}

/// Data-parallel [`check_coverage`].
///
/// Candidate atoms are evaluated concurrently on the rayon pool. The report
/// is identical to the sequential one, including the order of uncovered
/// atoms. Only worth it for large rule sets.
#[cfg(feature = "parallel")]
pub fn par_check_coverage<'r>(
    reference: &[PolicyRule],
    requested: &'r [PolicyRule],
) -> CoverageReport<'r> {
    use rayon::prelude::*;

    let owners: Vec<AtomicRule<'_>> = decompose_all(reference).collect();
    let candidates: Vec<AtomicRule<'r>> = decompose_all(requested).collect();

    let uncovered: Vec<AtomicRule<'r>> = candidates
        .par_iter()
        .filter(|candidate| !is_granted(&owners, candidate))
        .copied()
        .collect();

    debug!(
        owner_atoms = owners.len(),
        candidate_atoms = candidates.len(),
        uncovered_atoms = uncovered.len(),
        "Parallel coverage check complete"
    );

    CoverageReport { uncovered }
}

fn is_granted(owners: &[AtomicRule<'_>], candidate: &AtomicRule<'_>) -> bool {
    owners.iter().any(|owner| owner.covers(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(groups: &[&str], resources: &[&str], verbs: &[&str]) -> PolicyRule {
        PolicyRule::new()
            .with_api_groups(groups.iter().copied())
            .with_resources(resources.iter().copied())
            .with_verbs(verbs.iter().copied())
    }

    #[test]
    fn test_wildcard_reference_covers_specific_request() {
        let reference = vec![rule(&[""], &["*"], &["*"])];
        let requested = vec![rule(&[""], &["pods"], &["get"])];

        let report = check_coverage(&reference, &requested);
        assert!(report.is_covered());
        assert!(report.uncovered().is_empty());
    }

    #[test]
    fn test_superuser_request_reports_every_expansion() {
        let reference = vec![rule(&[""], &["pods"], &["get"])];
        let requested = vec![rule(&["*"], &["*"], &["*"])];

        let report = check_coverage(&reference, &requested);
        assert!(!report.is_covered());
        assert_eq!(report.uncovered().len(), 1);
        assert_eq!(
            report.uncovered_rules(),
            vec![rule(&["*"], &["*"], &["*"])]
        );
    }

    #[test]
    fn test_uncovered_atoms_keep_decomposition_order() {
        let reference = vec![rule(&["apps"], &["deployments"], &["get"])];
        let requested = vec![rule(
            &["", "apps"],
            &["pods", "deployments"],
            &["get"],
        )];

        let report = check_coverage(&reference, &requested);
        let pairs: Vec<_> = report
            .uncovered()
            .iter()
            .map(|a| (a.api_group().unwrap(), a.resource().unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![("", "pods"), ("", "deployments"), ("apps", "pods")]
        );
    }

    #[test]
    fn test_empty_sets() {
        assert!(check_coverage(&[], &[]).is_covered());
        assert!(check_coverage(&[rule(&[""], &["pods"], &["get"])], &[]).is_covered());
        assert!(!check_coverage(&[], &[rule(&[""], &["pods"], &["get"])]).is_covered());
    }

    #[test]
    fn test_covers_all_agrees_with_report() {
        let reference = vec![
            rule(&[""], &["*"], &["get", "list"]),
            rule(&["apps"], &["deployments"], &["*"]),
        ];
        let covered = vec![rule(&["", "apps"], &["deployments"], &["get"])];
        let exceeding = vec![rule(&["", "apps"], &["deployments"], &["delete"])];

        assert!(covers_all(&reference, &covered));
        assert!(check_coverage(&reference, &covered).is_covered());
        assert!(!covers_all(&reference, &exceeding));
        assert!(!check_coverage(&reference, &exceeding).is_covered());
    }

    #[test]
    fn test_into_uncovered() {
        let requested = vec![rule(&[""], &["pods"], &["get"])];
        let atoms = check_coverage(&[], &requested).into_uncovered();
        assert_eq!(atoms.len(), 1);
        assert_eq!(atoms[0].resource(), Some("pods"));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let reference = vec![
            rule(&[""], &["pods", "services"], &["get", "list"]),
            rule(&["apps"], &["*"], &["get"]),
        ];
        let requested = vec![
            rule(&["", "apps", "batch"], &["pods", "jobs"], &["get"]),
            rule(&[""], &["services"], &["list", "delete"]),
        ];

        assert_eq!(
            par_check_coverage(&reference, &requested),
            check_coverage(&reference, &requested)
        );
    }
}
