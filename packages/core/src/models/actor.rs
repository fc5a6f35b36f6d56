//! Actors: the identities that lock pages.
//!
//! The identity attribute of an actor is not fixed; it is looked up through
//! [`crate::config::TreeConfig::actor_identity_field`]. Actors are therefore
//! kept as an attribute map rather than a struct with a hard-coded id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Actor {
    /// Actor identified by the conventional `id` attribute
    pub fn new(id: impl Into<Value>) -> Self {
        Self::default().with_attribute("id", id)
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Identity of the actor under the given primary-key field.
    ///
    /// Numbers and strings are accepted; anything else has no identity.
    pub fn identity(&self, field: &str) -> Option<String> {
        match self.attributes.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_number_and_string() {
        assert_eq!(Actor::new(1).identity("id"), Some("1".to_string()));
        assert_eq!(Actor::new("abc").identity("id"), Some("abc".to_string()));
    }

    #[test]
    fn test_identity_uses_configured_field() {
        let actor = Actor::default()
            .with_attribute("user_id", 123)
            .with_attribute("name", "Jane");

        assert_eq!(actor.identity("user_id"), Some("123".to_string()));
        assert_eq!(actor.identity("id"), None);
    }

    #[test]
    fn test_identity_rejects_empty_or_structured_values() {
        assert_eq!(Actor::new("").identity("id"), None);
        assert_eq!(
            Actor::default()
                .with_attribute("id", serde_json::json!({"nested": 1}))
                .identity("id"),
            None
        );
    }
}
