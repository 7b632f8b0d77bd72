//! Validation pipeline
//!
//! Decodes a [`ValidationInput`], runs the coverage engine and encodes a
//! [`ValidationOutput`]. Every run produces exactly one verdict document,
//! including runs whose input cannot be decoded.

use std::io::{Read, Write};

use rbac_coverage::PolicyRule;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::ValidatorConfig;
use crate::error::{MalformedReason, RuleSide, ValidatorError, ValidatorResult};
use crate::wire::{ValidationInput, ValidationOutput};

/// Coverage validator bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Decode a validation request.
    ///
    /// Only the first JSON document is read; anything after it is left
    /// unread. Empty input is a decode error.
    pub fn decode<R: Read>(reader: R) -> ValidatorResult<ValidationInput> {
        serde_json::Deserializer::from_reader(reader)
            .into_iter::<ValidationInput>()
            .next()
            .unwrap_or_else(|| Err(serde::de::Error::custom("EOF")))
            .map_err(ValidatorError::Decode)
    }

    /// Check a decoded request.
    ///
    /// Fails only in strict mode, when a rule on either side is malformed.
    pub fn check(&self, input: &ValidationInput) -> ValidatorResult<ValidationOutput> {
        if self.config.strict {
            ensure_well_formed(RuleSide::User, &input.user_rules)?;
            ensure_well_formed(RuleSide::Reference, &input.reference_rules)?;
        }

        #[cfg(feature = "parallel")]
        let report = rbac_coverage::par_check_coverage(&input.reference_rules, &input.user_rules);
        #[cfg(not(feature = "parallel"))]
        let report = rbac_coverage::check_coverage(&input.reference_rules, &input.user_rules);

        for atom in report.uncovered() {
            debug!(rule = %atom, "Requested rule not covered");
        }
        info!(
            covers = report.is_covered(),
            user_rules = input.user_rules.len(),
            reference_rules = input.reference_rules.len(),
            uncovered = report.uncovered().len(),
            "Validation complete"
        );

        let output = ValidationOutput::verdict(report.is_covered());
        if self.config.explain {
            Ok(output.with_uncovered(report.uncovered_rules()))
        } else {
            Ok(output)
        }
    }

    /// Run one validation from `reader` to `writer`.
    ///
    /// Input errors are written to `writer` as a `covers=false` verdict with
    /// an `error` message and then returned, so the caller can still exit
    /// with a failure status. Output errors are returned without a verdict.
    ///
    /// # Returns
    ///
    /// The `covers` value of the written verdict
    pub fn run<R: Read, W: Write>(&self, reader: R, mut writer: W) -> ValidatorResult<bool> {
        let check_id = Uuid::now_v7();
        let span = info_span!("validation", %check_id);
        let _entered = span.enter();

        match Self::decode(reader).and_then(|input| self.check(&input)) {
            Ok(output) => {
                self.write_output(&output, &mut writer)?;
                Ok(output.covers)
            }
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "Input rejected");
                self.write_output(&ValidationOutput::failure(&err), &mut writer)?;
                Err(err)
            }
        }
    }

    fn write_output<W: Write>(
        &self,
        output: &ValidationOutput,
        writer: &mut W,
    ) -> ValidatorResult<()> {
        let encoded = if self.config.pretty {
            serde_json::to_writer_pretty(&mut *writer, output)
        } else {
            serde_json::to_writer(&mut *writer, output)
        };
        encoded.map_err(ValidatorError::Encode)?;

        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Reject rules the engine would only tolerate.
fn ensure_well_formed(side: RuleSide, rules: &[PolicyRule]) -> ValidatorResult<()> {
    for (index, rule) in rules.iter().enumerate() {
        if let Some(reason) = malformation(rule) {
            return Err(ValidatorError::MalformedRule {
                side,
                index,
                reason,
            });
        }
    }
    Ok(())
}

fn malformation(rule: &PolicyRule) -> Option<MalformedReason> {
    if rule.is_mixed() {
        Some(MalformedReason::MixedStyles)
    } else if !rule.has_target() {
        Some(MalformedReason::NoTarget)
    } else if rule.is_resource_rule() && rule.api_groups.is_empty() {
        Some(MalformedReason::NoApiGroups)
    } else {
        None
    }
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

    fn strict() -> Validator {
        Validator::new(ValidatorConfig {
            strict: true,
            ..ValidatorConfig::default()
        })
    }

    fn run(validator: &Validator, input: &str) -> (ValidatorResult<bool>, ValidationOutput) {
        let mut out = Vec::new();
        let result = validator.run(input.as_bytes(), &mut out);
        let output = serde_json::from_slice(&out).unwrap();
        (result, output)
    }

    #[test]
    fn test_check_covered() {
        let input = ValidationInput::new(
            vec![rule(&[""], &["pods"], &["get"])],
            vec![rule(&["*"], &["*"], &["*"])],
        );

        let output = Validator::default().check(&input).unwrap();
        assert_eq!(output, ValidationOutput::verdict(true));
    }

    #[test]
    fn test_check_not_covered_hides_details_by_default() {
        let input = ValidationInput::new(
            vec![rule(&["*"], &["*"], &["*"])],
            vec![rule(&[""], &["pods"], &["get"])],
        );

        let output = Validator::default().check(&input).unwrap();
        assert_eq!(output, ValidationOutput::verdict(false));
    }

    #[test]
    fn test_check_explain_lists_uncovered_atoms() {
        let validator = Validator::new(ValidatorConfig {
            explain: true,
            ..ValidatorConfig::default()
        });
        let input = ValidationInput::new(
            vec![rule(&[""], &["pods", "secrets"], &["get"])],
            vec![rule(&[""], &["pods"], &["get"])],
        );

        let output = validator.check(&input).unwrap();
        assert!(!output.covers);
        assert_eq!(output.uncovered, vec![rule(&[""], &["secrets"], &["get"])]);
    }

    #[test]
    fn test_lenient_mode_accepts_mixed_rules() {
        let mixed = rule(&[""], &["pods"], &["get"]).with_non_resource_urls(["/healthz"]);
        let input = ValidationInput::new(vec![mixed.clone()], vec![mixed]);

        assert!(Validator::default().check(&input).unwrap().covers);
    }

    #[test]
    fn test_strict_mode_rejects_malformed_rules() {
        let mixed = rule(&[""], &["pods"], &["get"]).with_non_resource_urls(["/healthz"]);
        let input = ValidationInput::new(vec![], vec![rule(&[""], &["pods"], &["get"]), mixed]);

        match strict().check(&input) {
            Err(ValidatorError::MalformedRule {
                side,
                index,
                reason,
            }) => {
                assert_eq!(side, RuleSide::Reference);
                assert_eq!(index, 1);
                assert_eq!(reason, MalformedReason::MixedStyles);
            }
            other => panic!("expected malformed rule error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformation_reasons() {
        assert_eq!(malformation(&rule(&[""], &["pods"], &["get"])), None);
        assert_eq!(
            malformation(&PolicyRule::new().with_non_resource_urls(["/healthz"])),
            None
        );
        assert_eq!(
            malformation(&PolicyRule::new().with_verbs(["get"])),
            Some(MalformedReason::NoTarget)
        );
        assert_eq!(
            malformation(&rule(&[], &["pods"], &["get"])),
            Some(MalformedReason::NoApiGroups)
        );
        assert_eq!(
            malformation(
                &PolicyRule::new()
                    .with_non_resource_urls(["/healthz"])
                    .with_resource_names(["x"])
            ),
            Some(MalformedReason::MixedStyles)
        );
    }

    #[test]
    fn test_run_writes_single_line_verdict() {
        let mut out = Vec::new();
        let covers = Validator::default()
            .run(
                r#"{"userRules": [], "referenceRules": []}"#.as_bytes(),
                &mut out,
            )
            .unwrap();

        assert!(covers);
        assert_eq!(String::from_utf8(out).unwrap(), "{\"covers\":true}\n");
    }

    #[test]
    fn test_run_reports_decode_errors_in_verdict() {
        let (result, output) = run(&Validator::default(), "invalid json");

        assert!(matches!(result, Err(ValidatorError::Decode(_))));
        assert!(!output.covers);
        assert!(output
            .error
            .unwrap()
            .starts_with("Error decoding input: "));
    }

    #[test]
    fn test_run_reports_strict_errors_in_verdict() {
        let (result, output) = run(
            &strict(),
            r#"{"userRules": [{"verbs": ["get"]}], "referenceRules": []}"#,
        );

        assert!(result.is_err());
        assert!(!output.covers);
        assert_eq!(
            output.error.as_deref(),
            Some("Malformed rule userRules[0]: names neither resources nor nonResourceURLs")
        );
    }

    #[test]
    fn test_decode_reads_first_document_only() {
        let input = Validator::decode(
            "{\"userRules\": [], \"referenceRules\": []}\n{\"x\": 1}".as_bytes(),
        )
        .unwrap();
        assert_eq!(input, ValidationInput::default());

        let (result, output) = run(
            &Validator::default(),
            r#"{"userRules": [{"apiGroups": [""], "resources": ["pods"], "verbs": ["get"]}], "referenceRules": []} trailing"#,
        );
        assert!(matches!(result, Ok(false)));
        assert_eq!(output, ValidationOutput::verdict(false));
    }

    #[test]
    fn test_decode_empty_input() {
        for input in ["", "  \n"] {
            match Validator::decode(input.as_bytes()) {
                Err(ValidatorError::Decode(err)) => assert_eq!(err.to_string(), "EOF"),
                other => panic!("expected decode error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_run_miscased_keys_are_not_dropped() {
        let narrow = r#"[{"apiGroups": [""], "resources": ["pods"], "verbs": ["get"]}]"#;
        let superuser = r#"[{"apiGroups": ["*"], "resources": ["*"], "verbs": ["*"]}]"#;
        let miscased_rule = r#"[{"APIGroups": ["*"], "resources": ["*"], "verbs": ["*"]}]"#;

        for input in [
            format!(r#"{{"userRules": {}, "referenceRules": {}}}"#, miscased_rule, narrow),
            format!(r#"{{"UserRules": {}, "referenceRules": []}}"#, superuser),
            format!(r#"{{"USERRULES": {}, "ReferenceRules": {}}}"#, superuser, narrow),
        ] {
            let (result, output) = run(&Validator::default(), &input);
            assert!(matches!(result, Ok(false)), "input: {}", input);
            assert_eq!(output, ValidationOutput::verdict(false));
        }
    }

    #[test]
    fn test_run_pretty_output() {
        let validator = Validator::new(ValidatorConfig {
            pretty: true,
            ..ValidatorConfig::default()
        });
        let mut out = Vec::new();
        validator.run("{}".as_bytes(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"covers\": true\n}\n"
        );
    }
}
