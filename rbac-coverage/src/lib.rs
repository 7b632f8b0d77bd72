//! # RBAC Coverage
//!
//! This crate answers one question for Kubernetes-style RBAC: does a set of
//! reference policy rules grant every permission a requested set of rules
//! asks for, with nothing left over?
//!
//! It is used as a privilege-escalation guard: a tenant-authored role is only
//! accepted if it cannot do anything a designated reference role cannot
//! already do.
//!
//! ## Overview
//!
//! The rbac-coverage crate handles:
//! - **Rules**: [`PolicyRule`], a fixed-shape authorization statement
//! - **Decomposition**: splitting compound rules into [`AtomicRule`]s
//! - **Predicate**: deciding whether one atomic rule subsumes another
//! - **Engine**: checking a whole requested set against a reference set
//!
//! ## Architecture
//!
//! ```text
//! PolicyRule ──decompose──> AtomicRule* ──covers──> bool
//!
//! apiGroups: ["", "apps"]             ("", pods)          + verbs, names
//! resources: ["pods", "deployments"]  ("", deployments)   + verbs, names
//! verbs:     ["get", "list"]          (apps, pods)        + verbs, names
//!                                     (apps, deployments) + verbs, names
//! ```
//!
//! Coverage is evaluated per atomic rule. Two reference rules may jointly
//! cover the (group, resource) pairs of one requested rule, but verbs and
//! resource names are never combined across reference rules: a single
//! reference atom has to grant all of them at once.
//!
//! ## Usage
//!
//! ```
//! use rbac_coverage::{check_coverage, PolicyRule};
//!
//! let reference = vec![PolicyRule::new()
//!     .with_api_groups([""])
//!     .with_resources(["*"])
//!     .with_verbs(["*"])];
//!
//! let requested = vec![PolicyRule::new()
//!     .with_api_groups([""])
//!     .with_resources(["pods"])
//!     .with_verbs(["get"])];
//!
//! let report = check_coverage(&reference, &requested);
//! assert!(report.is_covered());
//! assert!(report.uncovered().is_empty());
//! ```
//!
//! ## Wildcards
//!
//! `"*"` is a wildcard only when it is the whole value of an `apiGroups`,
//! `resources` or `verbs` entry. A resource such as `"pods/*"` is a literal
//! string and covers nothing but itself. Non-resource URLs additionally treat
//! a trailing `*` as a prefix match (`"/healthz/*"` covers `"/healthz/ping"`).
//!
//! ## Features
//!
//! - `parallel`: adds [`par_check_coverage`], a rayon-backed engine that
//!   evaluates candidate atoms concurrently.

pub mod covers;
pub mod decompose;
pub mod engine;
pub mod model;

// Re-export main types for convenience
pub use covers::covers;
pub use decompose::{decompose, decompose_all, AtomicRule, Target};
pub use engine::{check_coverage, covers_all, CoverageReport};
pub use model::{PolicyRule, WILDCARD};

#[cfg(feature = "parallel")]
pub use engine::par_check_coverage;
