//! Payload — the domain-specific fields of a record.

mod field_value;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use field_value::FieldValue;

use crate::error::ValidationError;

/// Field holding the text of a chat message.
pub const MESSAGE_FIELD: &str = "message";

/// Flat mapping of field name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, FieldValue>);

impl Payload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chat payload `{ "message": text }`.
    ///
    /// The text is kept as typed; blankness is checked by [`validate`](Self::validate).
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with(MESSAGE_FIELD, text.into())
    }

    /// Add or replace a field, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Text of the `message` field, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.get(MESSAGE_FIELD).and_then(FieldValue::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check the payload is worth writing.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyPayload`] when there are no fields.
    /// - [`ValidationError::BlankField`] for the first string field that is
    ///   empty after trimming.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }
        if let Some((name, _)) = self
            .0
            .iter()
            .find(|(_, value)| value.as_str().is_some_and(|s| s.trim().is_empty()))
        {
            return Err(ValidationError::BlankField(name.clone()));
        }
        Ok(())
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl FromIterator<(String, FieldValue)> for Payload {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_text_payload_under_message_field() {
        let payload = Payload::text("hello");
        assert_eq!(payload.message(), Some("hello"));
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn should_reject_empty_payload() {
        assert_eq!(Payload::new().validate(), Err(ValidationError::EmptyPayload));
    }

    #[test]
    fn should_reject_empty_and_whitespace_text() {
        for input in ["", "   ", "\t\n"] {
            assert_eq!(
                Payload::from(input).validate(),
                Err(ValidationError::BlankField("message".to_string()))
            );
        }
    }

    #[test]
    fn should_accept_text_with_surrounding_whitespace() {
        assert!(Payload::from("  gm  ").validate().is_ok());
    }

    #[test]
    fn should_accept_non_string_fields() {
        let payload = Payload::new()
            .with("side", "heads")
            .with("wager", 1_i64)
            .with("win", true);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn should_serialize_as_flat_object() {
        let payload = Payload::new().with("message", "gm").with("wager", 2_i64);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"message": "gm", "wager": 2}));
    }
}
