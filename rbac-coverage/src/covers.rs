//! # Coverage Predicate
//!
//! Decides whether one atomic rule (the owner) grants everything another
//! atomic rule (the candidate) asks for.

use crate::decompose::{AtomicRule, Target};
use crate::model::WILDCARD;

/// Check if `owner` covers `candidate`.
///
/// All of the following must hold:
/// - **Group**: owner group is `*` or equals the candidate group
/// - **Resource**: owner resource is `*` or equals the candidate resource
/// - **Verbs**: owner verbs contain `*` or every candidate verb
/// - **Resource names**: owner names are empty, or candidate names are a
///   non-empty subset of them
///
/// For non-resource targets the group and resource checks are replaced by
/// URL matching (exact, `*`, or trailing-`*` prefix) and resource names do
/// not apply. A resource target never covers a URL target or the reverse.
///
/// # Example
///
/// ```
/// use rbac_coverage::{covers, decompose, PolicyRule};
///
/// let owner = PolicyRule::new()
///     .with_api_groups(["*"])
///     .with_resources(["pods"])
///     .with_verbs(["get", "list"]);
/// let candidate = PolicyRule::new()
///     .with_api_groups(["apps"])
///     .with_resources(["pods"])
///     .with_verbs(["list"]);
///
/// let owner = decompose(&owner).next().unwrap();
/// let candidate = decompose(&candidate).next().unwrap();
/// assert!(covers(&owner, &candidate));
/// assert!(!covers(&candidate, &owner));
/// ```
pub fn covers(owner: &AtomicRule<'_>, candidate: &AtomicRule<'_>) -> bool {
    let target_covered = match (owner.target(), candidate.target()) {
        (
            Target::Resource {
                api_group: owner_group,
                resource: owner_resource,
            },
            Target::Resource {
                api_group: candidate_group,
                resource: candidate_resource,
            },
        ) => {
            value_covers(owner_group, candidate_group)
                && value_covers(owner_resource, candidate_resource)
                && resource_names_cover(owner.resource_names(), candidate.resource_names())
        }
        (Target::NonResource { url: owner_url }, Target::NonResource { url: candidate_url }) => {
            url_covers(owner_url, candidate_url)
        }
        _ => false,
    };

    target_covered && verbs_cover(owner.verbs(), candidate.verbs())
}

/// Exact match or whole-value wildcard. `pods/*` is a literal.
fn value_covers(owner: &str, candidate: &str) -> bool {
    owner == WILDCARD || owner == candidate
}

fn verbs_cover(owner: &[String], candidate: &[String]) -> bool {
    if owner.iter().any(|v| v == WILDCARD) {
        return true;
    }
    candidate.iter().all(|verb| owner.contains(verb))
}

/// Empty owner names grant every instance; an empty candidate asks for
/// every instance and so needs an unconstrained owner.
fn resource_names_cover(owner: &[String], candidate: &[String]) -> bool {
    if owner.is_empty() {
        return true;
    }
    !candidate.is_empty() && candidate.iter().all(|name| owner.contains(name))
}

fn url_covers(owner: &str, candidate: &str) -> bool {
    if owner == WILDCARD || owner == candidate {
        return true;
    }
    match owner.strip_suffix('*') {
        Some(prefix) => candidate.starts_with(prefix),
        None => false,
    }
}
