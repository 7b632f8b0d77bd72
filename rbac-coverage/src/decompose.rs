//! # Rule Decomposition
//!
//! Splits compound policy rules into atomic rules, the unit of comparison
//! for the coverage predicate.
//!
//! ```text
//! {apiGroups: ["", "apps"], resources: ["pods"], verbs: ["get"]}
//!   => ("", pods)   verbs: ["get"]
//!   => (apps, pods) verbs: ["get"]
//! ```
//!
//! Verbs and resource names are never split: every atom carries the full
//! sets of the rule it came from.

use std::fmt;

use crate::model::PolicyRule;

/// What a single atomic rule points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target<'a> {
    /// One API group and one resource kind.
    Resource {
        /// The API group ("" for core, "*" for all).
        api_group: &'a str,
        /// The resource kind, compared literally unless it is exactly "*".
        resource: &'a str,
    },

    /// One non-resource URL.
    NonResource {
        /// The URL path; a trailing `*` is a prefix wildcard.
        url: &'a str,
    },
}

/// A policy rule narrowed to exactly one target.
///
/// Atomic rules are borrowed views into the [`PolicyRule`] they were
/// decomposed from, so they cannot outlive the rules of a single check.
/// They are only produced by [`decompose`].
///
/// # Example
///
/// ```
/// use rbac_coverage::{decompose, PolicyRule};
///
/// let rule = PolicyRule::new()
///     .with_api_groups(["", "apps"])
///     .with_resources(["pods", "deployments"])
///     .with_verbs(["get"]);
///
/// let atoms: Vec<_> = decompose(&rule).collect();
/// assert_eq!(atoms.len(), 4);
/// assert_eq!(atoms[0].api_group(), Some(""));
/// assert_eq!(atoms[0].resource(), Some("pods"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomicRule<'a> {
    target: Target<'a>,
    verbs: &'a [String],
    resource_names: &'a [String],
}

impl<'a> AtomicRule<'a> {
    /// The single target of this rule.
    pub fn target(&self) -> Target<'a> {
        self.target
    }

    /// The verbs of the originating rule.
    pub fn verbs(&self) -> &'a [String] {
        self.verbs
    }

    /// The resource names of the originating rule.
    ///
    /// Always empty for non-resource targets.
    pub fn resource_names(&self) -> &'a [String] {
        self.resource_names
    }

    /// The API group, if this is a resource target.
    pub fn api_group(&self) -> Option<&'a str> {
        match self.target {
            Target::Resource { api_group, .. } => Some(api_group),
            Target::NonResource { .. } => None,
        }
    }

    /// The resource kind, if this is a resource target.
    pub fn resource(&self) -> Option<&'a str> {
        match self.target {
            Target::Resource { resource, .. } => Some(resource),
            Target::NonResource { .. } => None,
        }
    }

    /// The URL, if this is a non-resource target.
    pub fn non_resource_url(&self) -> Option<&'a str> {
        match self.target {
            Target::NonResource { url } => Some(url),
            Target::Resource { .. } => None,
        }
    }

    /// Check if this rule subsumes `candidate`. See [`crate::covers()`].
    pub fn covers(&self, candidate: &AtomicRule<'_>) -> bool {
        crate::covers::covers(self, candidate)
    }

    /// Render the atom as a single-target policy rule.
    ///
    /// Used for diagnostics: the result can be serialized and read back
    /// like any other rule.
    pub fn to_policy_rule(&self) -> PolicyRule {
        let rule = PolicyRule::new().with_verbs(self.verbs.iter().map(String::as_str));
        match self.target {
            Target::Resource {
                api_group,
                resource,
            } => rule
                .with_api_groups([api_group])
                .with_resources([resource])
                .with_resource_names(self.resource_names.iter().map(String::as_str)),
            Target::NonResource { url } => rule.with_non_resource_urls([url]),
        }
    }
}

impl fmt::Display for AtomicRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_policy_rule(), f)
    }
}

/// Decompose a rule into its atomic rules.
///
/// - Resource style: one atom per `api_groups x resources` pair, group-major.
/// - URL style: one atom per entry of `non_resource_urls`.
///
/// A rule populating both styles is decomposed on both axes independently,
/// resource atoms first. An empty `api_groups` or `resources` yields no
/// resource atoms. The returned iterator is lazy and can be restarted by
/// cloning it before use.
pub fn decompose(rule: &PolicyRule) -> impl Iterator<Item = AtomicRule<'_>> + Clone {
    let verbs = rule.verbs.as_slice();
    let resource_names = rule.resource_names.as_slice();

    let resource_atoms = rule.api_groups.iter().flat_map(move |group| {
        rule.resources.iter().map(move |resource| AtomicRule {
            target: Target::Resource {
                api_group: group.as_str(),
                resource: resource.as_str(),
            },
            verbs,
            resource_names,
        })
    });

    let url_atoms = rule.non_resource_urls.iter().map(move |url| AtomicRule {
        target: Target::NonResource { url: url.as_str() },
        verbs,
        resource_names: &[],
    });

    resource_atoms.chain(url_atoms)
}

/// Decompose every rule of a set, concatenating the results in input order.
///
/// Duplicate atoms contributed by different rules are kept.
pub fn decompose_all(rules: &[PolicyRule]) -> impl Iterator<Item = AtomicRule<'_>> + Clone {
    rules.iter().flat_map(|rule| decompose(rule))
}

#[cfg(test)]
pub(crate) fn atom<'a>(
    target: Target<'a>,
    verbs: &'a [String],
    resource_names: &'a [String],
) -> AtomicRule<'a> {
    AtomicRule {
        target,
        verbs,
        resource_names,
    }
}
