//! Wire types
//!
//! The JSON documents exchanged with the validator process:
//!
//! ```text
//! stdin:  {"userRules": [PolicyRule...], "referenceRules": [PolicyRule...]}
//! stdout: {"covers": true}
//!         {"covers": false, "uncovered": [PolicyRule...]}     (explain mode)
//!         {"covers": false, "error": "Error decoding input: ..."}
//! ```

use std::fmt;

use rbac_coverage::PolicyRule;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidatorError;

/// Validation request.
///
/// Keys are matched ignoring ASCII case, and `requestedRules` binds to
/// `user_rules`. Missing or `null` rule sets decode as empty, unknown keys
/// are skipped and a repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationInput {
    /// The requested rules being checked for escalation.
    pub user_rules: Vec<PolicyRule>,

    /// The approved rules the request must stay within.
    pub reference_rules: Vec<PolicyRule>,
}

impl ValidationInput {
    /// Create a request.
    pub fn new(user_rules: Vec<PolicyRule>, reference_rules: Vec<PolicyRule>) -> Self {
        Self {
            user_rules,
            reference_rules,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut Vec<PolicyRule>> {
        if key.eq_ignore_ascii_case("userRules") || key.eq_ignore_ascii_case("requestedRules") {
            Some(&mut self.user_rules)
        } else if key.eq_ignore_ascii_case("referenceRules") {
            Some(&mut self.reference_rules)
        } else {
            None
        }
    }
}

impl<'de> Deserialize<'de> for ValidationInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(InputVisitor)
    }
}

struct InputVisitor;

impl<'de> Visitor<'de> for InputVisitor {
    type Value = ValidationInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with userRules and referenceRules")
    }

    fn visit_map<A>(self, mut map: A) -> Result<ValidationInput, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut input = ValidationInput::default();
        while let Some(key) = map.next_key::<String>()? {
            match input.field_mut(&key) {
                Some(rules) => {
                    *rules = map.next_value::<Option<Vec<PolicyRule>>>()?.unwrap_or_default();
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(input)
    }
}

/// Validation verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutput {
    /// Whether the reference rules cover every requested rule.
    pub covers: bool,

    /// Set only when the input could not be validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Requested atomic rules left uncovered (explain mode only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uncovered: Vec<PolicyRule>,
}

impl ValidationOutput {
    /// Create a verdict.
    pub fn verdict(covers: bool) -> Self {
        Self {
            covers,
            error: None,
            uncovered: Vec::new(),
        }
    }

    /// Attach the uncovered rules.
    pub fn with_uncovered(mut self, uncovered: Vec<PolicyRule>) -> Self {
        self.uncovered = uncovered;
        self
    }

    /// Create the safe-default verdict for a failed validation.
    pub fn failure(error: &ValidatorError) -> Self {
        Self {
            covers: false,
            error: Some(error.to_string()),
            uncovered: Vec::new(),
        }
    }

    /// Check if this verdict carries an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
