use serde_json::{Map, Value};

/// One lead-shaped object from a search response that carries a usable `name`.
///
/// Everything beyond the name is kept as raw JSON; the normalizer reads it
/// defensively.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLead {
    fields: Map<String, Value>,
}

impl RawLead {
    pub fn name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
    }

    pub(crate) fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn from_element(index: usize, value: Value) -> Result<Self, ParseError> {
        let Value::Object(fields) = value else {
            return Err(ParseError::NotAnObject {
                index,
                found: json_kind(&value),
            });
        };

        let has_name = fields
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
            return Err(ParseError::MissingName { index });
        }

        Ok(Self { fields })
    }
}

impl TryFrom<Value> for RawLead {
    type Error = ParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_element(0, value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("expected a JSON array of leads, found {found}")]
    NotAnArray { found: &'static str },
    #[error("lead #{index} is {found}, not an object")]
    NotAnObject { index: usize, found: &'static str },
    #[error("lead #{index} has no name")]
    MissingName { index: usize },
}

/// Parses a raw response body into lead records.
pub fn parse_response(body: &[u8]) -> Result<Vec<RawLead>, ParseError> {
    let value: Value = serde_json::from_slice(body)?;
    parse_value(value)
}

/// Validates an already-decoded response: it must be an array whose elements
/// are objects carrying a non-blank `name`.
pub fn parse_value(value: Value) -> Result<Vec<RawLead>, ParseError> {
    let Value::Array(elements) = value else {
        return Err(ParseError::NotAnArray {
            found: json_kind(&value),
        });
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| RawLead::from_element(index, element))
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
