//! # RBAC Validator
//!
//! Process adapter around [`rbac_coverage`]: reads one JSON request from
//! stdin, writes one JSON verdict to stdout.
//!
//! ## Contract
//!
//! ```text
//! stdin:  {"userRules": [...], "referenceRules": [...]}
//! stdout: {"covers": true|false}
//! ```
//!
//! - `requestedRules` is accepted as an alias of `userRules`
//! - keys match ignoring ASCII case, and only the first JSON document is read
//! - undecodable input yields `{"covers": false, "error": "..."}` and exit status 1
//! - in explain mode, uncovered requested rules are listed under `uncovered`
//! - in strict mode, malformed rules are rejected like undecodable input
//!
//! Logs go to stderr only, so stdout always carries exactly one document.
//!
//! ## Usage
//!
//! ```
//! use rbac_validator::{Validator, ValidatorConfig};
//!
//! let input = r#"{
//!     "userRules": [{"apiGroups": [""], "resources": ["pods"], "verbs": ["get"]}],
//!     "referenceRules": [{"apiGroups": ["*"], "resources": ["*"], "verbs": ["*"]}]
//! }"#;
//!
//! let mut output = Vec::new();
//! let covers = Validator::new(ValidatorConfig::default())
//!     .run(input.as_bytes(), &mut output)
//!     .unwrap();
//!
//! assert!(covers);
//! assert_eq!(output, b"{\"covers\":true}\n");
//! ```

pub mod config;
pub mod error;
pub mod validate;
pub mod wire;

// Re-export main types
pub use config::{LogFormat, ValidatorConfig};
pub use error::{MalformedReason, RuleSide, ValidatorError, ValidatorResult};
pub use validate::Validator;
pub use wire::{ValidationInput, ValidationOutput};
