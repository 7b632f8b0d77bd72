//! # Rule Model
//!
//! The policy rule type compared by the coverage engine.
//! A rule is plain data: it has no behavior beyond construction and display.

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The wildcard token.
///
/// Matches any value in `apiGroups`, `resources`, `verbs` and
/// `nonResourceURLs`, but only when it is the entire value.
pub const WILDCARD: &str = "*";

/// A single authorization statement.
///
/// Field semantics:
/// - **api_groups**: resource namespaces; `""` is the core group
/// - **resources**: resource kinds, optionally with a literal `/subresource` suffix
/// - **verbs**: allowed actions
/// - **resource_names**: specific instances; empty means every instance
/// - **non_resource_urls**: URL paths; a trailing `*` is a prefix wildcard
///
/// A rule is meaningful only if `resources` or `non_resource_urls` is
/// non-empty. Neither that nor the exclusivity of the two styles is enforced
/// here; see [`PolicyRule::is_mixed`] and [`PolicyRule::has_target`].
///
/// Decoding matches field names case-insensitively, so `APIGroups` binds to
/// `api_groups`. A missing or `null` field decodes as empty and unknown
/// fields are skipped. When a field appears twice the last value wins.
///
/// # Example
///
/// ```
/// use rbac_coverage::PolicyRule;
///
/// let rule = PolicyRule::new()
///     .with_api_groups(["apps"])
///     .with_resources(["deployments"])
///     .with_verbs(["get", "list"]);
///
/// assert!(rule.is_resource_rule());
/// assert!(rule.resource_names.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// API groups this rule applies to (e.g., "" for core, "*" for all).
    pub api_groups: Vec<String>,

    /// Resource kinds (e.g., "pods", "pods/log", "*" for all).
    pub resources: Vec<String>,

    /// Allowed verbs (e.g., "get", "list", "*" for all).
    pub verbs: Vec<String>,

    /// Resource instances the rule is restricted to.
    /// If empty, applies to every instance of the matched resources.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_names: Vec<String>,

    /// Non-resource URL paths (e.g., "/healthz", "/metrics/*").
    #[serde(rename = "nonResourceURLs", skip_serializing_if = "Vec::is_empty")]
    pub non_resource_urls: Vec<String>,
}

impl PolicyRule {
    /// Create an empty rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API groups.
    pub fn with_api_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set the resource kinds.
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the verbs.
    pub fn with_verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verbs = verbs.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the rule to named resource instances.
    pub fn with_resource_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the non-resource URLs.
    pub fn with_non_resource_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_resource_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Check if the rule names any resources.
    pub fn is_resource_rule(&self) -> bool {
        !self.resources.is_empty()
    }

    /// Check if the rule names any non-resource URLs.
    pub fn is_non_resource_rule(&self) -> bool {
        !self.non_resource_urls.is_empty()
    }

    /// Check if the rule populates both resource-style and URL-style fields.
    ///
    /// Such rules are tolerated by the engine, which decomposes both axes
    /// independently.
    pub fn is_mixed(&self) -> bool {
        let has_resource_fields = !self.api_groups.is_empty()
            || !self.resources.is_empty()
            || !self.resource_names.is_empty();
        has_resource_fields && self.is_non_resource_rule()
    }

    /// Check if the rule targets anything at all.
    pub fn has_target(&self) -> bool {
        self.is_resource_rule() || self.is_non_resource_rule()
    }

    /// The field a JSON key binds to, ignoring ASCII case.
    fn field_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        [
            ("apiGroups", &mut self.api_groups),
            ("resources", &mut self.resources),
            ("verbs", &mut self.verbs),
            ("resourceNames", &mut self.resource_names),
            ("nonResourceURLs", &mut self.non_resource_urls),
        ]
        .into_iter()
        .find(|(name, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, field)| field)
    }
}

impl<'de> Deserialize<'de> for PolicyRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PolicyRuleVisitor)
    }
}

struct PolicyRuleVisitor;

impl<'de> Visitor<'de> for PolicyRuleVisitor {
    type Value = PolicyRule;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a policy rule object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<PolicyRule, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut rule = PolicyRule::default();
        while let Some(key) = map.next_key::<String>()? {
            match rule.field_mut(&key) {
                // null decodes the same as a missing array
                Some(field) => {
                    *field = map.next_value::<Option<Vec<String>>>()?.unwrap_or_default();
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(rule)
    }
}

impl fmt::Display for PolicyRule {
    /// Compact single-line form, e.g.
    /// `{APIGroups:["apps"], Resources:["deployments"], Verbs:["get"]}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if !self.api_groups.is_empty() {
            fields.push(format!("APIGroups:{}", quoted(&self.api_groups)));
        }
        if !self.resources.is_empty() {
            fields.push(format!("Resources:{}", quoted(&self.resources)));
        }
        if !self.non_resource_urls.is_empty() {
            fields.push(format!(
                "NonResourceURLs:{}",
                quoted(&self.non_resource_urls)
            ));
        }
        if !self.resource_names.is_empty() {
            fields.push(format!("ResourceNames:{}", quoted(&self.resource_names)));
        }
        fields.push(format!("Verbs:{}", quoted(&self.verbs)));
        write!(f, "{{{}}}", fields.join(", "))
    }
}

fn quoted(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
    format!("[{}]", items.join(" "))
}
