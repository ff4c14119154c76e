//! Cell value codec across the three remote representations.
//!
//! A raw cell from the remote service carries up to three renditions of the
//! same value: the display string, the computed ("effective") value, and
//! the value as the user typed it. The caller picks one via [`ValueFormat`]
//! and the codec resolves it to a [`ScalarValue`].
//!
//! Resolution of an [`ExtendedValue`] is an explicit priority chain
//! (string > number > bool > error): the first *present* variant wins, so a
//! numeric `0` or boolean `false` resolves as itself instead of falling
//! through.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Which of the three remote value representations to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    #[default]
    #[serde(rename = "FORMATTED_VALUE")]
    Formatted,
    #[serde(rename = "EFFECTIVE_VALUE")]
    Effective,
    #[serde(rename = "USER_ENTERED_VALUE")]
    UserEntered,
}

/// Error marker a cell can hold (e.g. a `#DIV/0!` result).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Typed value payload used by the effective and user-entered renditions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_value: Option<ErrorValue>,
}

impl ExtendedValue {
    /// First present variant wins, in string > number > bool > error order.
    pub fn resolve(&self) -> ScalarValue {
        if let Some(s) = &self.string_value {
            return ScalarValue::Text(s.clone());
        }
        if let Some(n) = self.number_value {
            return ScalarValue::Number(n);
        }
        if let Some(b) = self.bool_value {
            return ScalarValue::Bool(b);
        }
        if let Some(e) = &self.error_value {
            return ScalarValue::Error(e.clone());
        }
        ScalarValue::Absent
    }
}

/// One raw cell as returned by the remote service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_value: Option<ExtendedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_entered_value: Option<ExtendedValue>,
}

/// Grid of raw cells; rows may be ragged and trailing cells absent.
pub type RawGrid = Vec<Vec<RawCell>>;

impl RawCell {
    /// Decode this cell under the requested representation.
    ///
    /// The formatted rendition always yields text, defaulting to the empty
    /// string when absent. The other two yield [`ScalarValue::Absent`] when
    /// nothing is present, in which case no record entry is emitted.
    pub fn decode(&self, format: ValueFormat) -> ScalarValue {
        match format {
            ValueFormat::Formatted => {
                ScalarValue::Text(self.formatted_value.clone().unwrap_or_default())
            }
            ValueFormat::Effective => self
                .effective_value
                .as_ref()
                .map(ExtendedValue::resolve)
                .unwrap_or(ScalarValue::Absent),
            ValueFormat::UserEntered => self
                .user_entered_value
                .as_ref()
                .map(ExtendedValue::resolve)
                .unwrap_or(ScalarValue::Absent),
        }
    }

    /// Synthesize all three renditions from a plain JSON scalar. Used by
    /// in-memory backends; `null` yields a fully absent cell.
    pub fn from_scalar(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => RawCell::default(),
            JsonValue::String(s) => {
                let ext = ExtendedValue {
                    string_value: Some(s.clone()),
                    ..ExtendedValue::default()
                };
                RawCell {
                    formatted_value: Some(s.clone()),
                    effective_value: Some(ext.clone()),
                    user_entered_value: Some(ext),
                }
            }
            JsonValue::Number(n) => {
                let ext = ExtendedValue {
                    number_value: n.as_f64(),
                    ..ExtendedValue::default()
                };
                RawCell {
                    formatted_value: Some(n.to_string()),
                    effective_value: Some(ext.clone()),
                    user_entered_value: Some(ext),
                }
            }
            JsonValue::Bool(b) => {
                let ext = ExtendedValue {
                    bool_value: Some(*b),
                    ..ExtendedValue::default()
                };
                RawCell {
                    formatted_value: Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
                    effective_value: Some(ext.clone()),
                    user_entered_value: Some(ext),
                }
            }
            other => {
                let text = other.to_string();
                let ext = ExtendedValue {
                    string_value: Some(text.clone()),
                    ..ExtendedValue::default()
                };
                RawCell {
                    formatted_value: Some(text),
                    effective_value: Some(ext.clone()),
                    user_entered_value: Some(ext),
                }
            }
        }
    }
}

/// Scalar value of one decoded cell.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Error(ErrorValue),
    Absent,
}

impl ScalarValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ScalarValue::Absent)
    }

    /// Convert into a record value; `Absent` converts to nothing at all.
    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            ScalarValue::Text(s) => Some(JsonValue::String(s)),
            ScalarValue::Number(n) => Some(
                serde_json::Number::from_f64(n)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null),
            ),
            ScalarValue::Bool(b) => Some(JsonValue::Bool(b)),
            ScalarValue::Error(e) => Some(serde_json::to_value(e).unwrap_or(JsonValue::Null)),
            ScalarValue::Absent => None,
        }
    }

    /// Textual rendition used for header cells, which are names by
    /// definition.
    pub fn display_text(&self) -> String {
        match self {
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Number(n) => n.to_string(),
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Error(e) => e.kind.clone().unwrap_or_default(),
            ScalarValue::Absent => String::new(),
        }
    }
}
