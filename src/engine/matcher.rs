//! Specification matcher
//!
//! Picks the first specification whose conditionals hold for an input.
//! Specifications without conditionals are only ever chosen by hand.

use tracing::{debug, trace};

use crate::domain::spec::{
    Condition, ConditionField, ConditionOperator, LogicalOperator, MatchInput, Predicate,
    Specification,
};

/// Fields that are read from somewhere else on the input
const FIELD_ALIASES: &[(ConditionField, ConditionField)] = &[(
    ConditionField::ApplicationId,
    ConditionField::ApplicationAddress,
)];

/// First specification in `specs` whose conditionals hold for `input`.
///
/// Order is priority: the scan stops at the first hit.
pub fn find_match<'s>(
    input: Option<&MatchInput>,
    specs: &'s [Specification],
) -> Option<&'s Specification> {
    let input = input.filter(|input| !input.is_empty())?;

    let found = specs
        .iter()
        .filter(|spec| spec.has_conditionals())
        .find(|spec| spec_matches(spec, input));

    match found {
        Some(spec) => debug!(spec = %spec.name, "specification matched"),
        None => trace!(candidates = specs.len(), "no specification matched"),
    }
    found
}

/// Whether any predicate on `spec` holds. No predicates means no match.
pub fn spec_matches(spec: &Specification, input: &MatchInput) -> bool {
    spec.conditionals
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|predicate| evaluate_predicate(predicate, input))
}

/// A predicate without conditions never holds.
pub fn evaluate_predicate(predicate: &Predicate, input: &MatchInput) -> bool {
    if predicate.conditions.is_empty() {
        return false;
    }

    let mut conditions = predicate.conditions.iter();
    match predicate.logical_operator {
        LogicalOperator::And => conditions.all(|condition| evaluate_condition(condition, input)),
        LogicalOperator::Or => conditions.any(|condition| evaluate_condition(condition, input)),
    }
}

pub fn evaluate_condition(condition: &Condition, input: &MatchInput) -> bool {
    let actual = read_field(input, condition.field);

    match condition.operator {
        ConditionOperator::Equals => {
            actual.is_some_and(|actual| values_equal(actual, &condition.value))
        }
    }
}

/// Apply the alias table
pub fn resolve_field(field: ConditionField) -> ConditionField {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == field)
        .map(|(_, target)| *target)
        .unwrap_or(field)
}

fn read_field(input: &MatchInput, field: ConditionField) -> Option<&str> {
    match resolve_field(field) {
        ConditionField::MsgSender => input.msg_sender.as_deref(),
        ConditionField::ApplicationAddress => input.application.as_ref()?.address.as_deref(),
        ConditionField::ApplicationId => input.application.as_ref()?.id.as_deref(),
    }
}

/// Exact comparison, except that hex strings ignore case since addresses
/// show up both checksummed and lowercase.
fn values_equal(actual: &str, expected: &str) -> bool {
    if is_hex(actual) && is_hex(expected) {
        actual.eq_ignore_ascii_case(expected)
    } else {
        actual == expected
    }
}

fn is_hex(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spec::{AbiParamsMode, ApplicationRef, SpecMode};

    fn equals(field: ConditionField, value: &str) -> Condition {
        Condition {
            field,
            operator: ConditionOperator::Equals,
            value: value.to_string(),
        }
    }

    fn spec(name: &str, conditionals: Option<Vec<Predicate>>) -> Specification {
        Specification {
            id: None,
            name: name.to_string(),
            timestamp: 0,
            version: 1,
            mode: SpecMode::AbiParams(AbiParamsMode::default()),
            conditionals,
        }
    }

    fn input(sender: &str, app: &str) -> MatchInput {
        MatchInput {
            msg_sender: Some(sender.to_string()),
            application: Some(ApplicationRef {
                id: None,
                address: Some(app.to_string()),
            }),
        }
    }

    #[test]
    fn test_alias_reads_application_address() {
        assert_eq!(
            resolve_field(ConditionField::ApplicationId),
            ConditionField::ApplicationAddress
        );
        let condition = equals(ConditionField::ApplicationId, "0xapp");
        assert!(!evaluate_condition(&condition, &input("0x01", "0xother")));

        let condition = equals(ConditionField::ApplicationId, "0xaa");
        assert!(evaluate_condition(&condition, &input("0x01", "0xAA")));
    }

    #[test]
    fn test_and_or() {
        let both = Predicate {
            logical_operator: LogicalOperator::And,
            conditions: vec![
                equals(ConditionField::MsgSender, "0x01"),
                equals(ConditionField::ApplicationAddress, "0x02"),
            ],
        };
        assert!(evaluate_predicate(&both, &input("0x01", "0x02")));
        assert!(!evaluate_predicate(&both, &input("0x01", "0x03")));

        let either = Predicate {
            logical_operator: LogicalOperator::Or,
            ..both
        };
        assert!(evaluate_predicate(&either, &input("0x01", "0x03")));
        assert!(!evaluate_predicate(&either, &input("0x04", "0x03")));
    }

    #[test]
    fn test_missing_field_never_equals() {
        let partial = MatchInput {
            msg_sender: Some("0x01".into()),
            application: None,
        };
        assert!(!evaluate_condition(
            &equals(ConditionField::ApplicationAddress, ""),
            &partial
        ));
        assert!(!evaluate_condition(
            &equals(ConditionField::ApplicationAddress, "0x01"),
            &partial
        ));
    }

    #[test]
    fn test_plain_strings_compare_exactly() {
        assert!(values_equal("abc", "abc"));
        assert!(!values_equal("abc", "ABC"));
        assert!(values_equal("0xAbC", "0xabc"));
    }

    #[test]
    fn test_predicates_are_ored() {
        let spec = spec(
            "two",
            Some(vec![
                Predicate {
                    logical_operator: LogicalOperator::And,
                    conditions: vec![equals(ConditionField::MsgSender, "0x09")],
                },
                Predicate {
                    logical_operator: LogicalOperator::And,
                    conditions: vec![equals(ConditionField::ApplicationAddress, "0x02")],
                },
            ]),
        );
        assert!(spec_matches(&spec, &input("0x01", "0x02")));
    }

    #[test]
    fn test_empty_predicate_never_holds() {
        let predicate = Predicate {
            logical_operator: LogicalOperator::And,
            conditions: vec![],
        };
        assert!(!evaluate_predicate(&predicate, &input("0x01", "0x02")));
    }

    #[test]
    fn test_find_match_edges() {
        let specs = vec![spec(
            "a",
            Some(vec![Predicate {
                logical_operator: LogicalOperator::Or,
                conditions: vec![equals(ConditionField::MsgSender, "0x01")],
            }]),
        )];

        assert!(find_match(None, &specs).is_none());
        assert!(find_match(Some(&MatchInput::default()), &specs).is_none());
        assert!(find_match(Some(&input("0x01", "0x02")), &[]).is_none());
        assert_eq!(
            find_match(Some(&input("0x01", "0x02")), &specs).map(|s| s.name.as_str()),
            Some("a")
        );
    }
}
