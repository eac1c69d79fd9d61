//! Conditional predicates used to pick a specification for an input

use serde::{Deserialize, Deserializer, Serialize};

/// Conditions combined with one logical operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub logical_operator: LogicalOperator,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
}

/// `field <operator> value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    pub value: String,
}

/// Input fields a condition can look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionField {
    #[serde(rename = "msgSender")]
    MsgSender,
    /// Legacy name, read as `application.address`
    #[serde(rename = "application.id")]
    ApplicationId,
    #[serde(rename = "application.address")]
    ApplicationAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOperator {
    /// String equality on the field value. When both sides are `0x` hex,
    /// case is ignored so checksummed and lowercase addresses match.
    Equals,
}

/// The parts of an on-chain input the matcher can see. Every field is
/// optional since callers often hold partial data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    #[serde(
        default,
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub msg_sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRef {
    #[serde(
        default,
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
}

/// Strings as they are, numbers and booleans stringified, anything else
/// treated as absent
fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => Some(value),
        serde_json::Value::Number(value) => Some(value.to_string()),
        serde_json::Value::Bool(value) => Some(value.to_string()),
        _ => None,
    })
}

impl ConditionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionField::MsgSender => "msgSender",
            ConditionField::ApplicationId => "application.id",
            ConditionField::ApplicationAddress => "application.address",
        }
    }
}

impl MatchInput {
    pub fn is_empty(&self) -> bool {
        self.msg_sender.is_none()
            && self
                .application
                .as_ref()
                .is_none_or(|app| app.id.is_none() && app.address.is_none())
    }
}
