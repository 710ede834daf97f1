use serde::de::DeserializeOwned;
use serde_json::Value;

/// Builds a minigame configuration out of a host payload, falling back to defaults for every
/// field that is missing or malformed.
pub trait FromPayload: Sized {
    fn from_payload(payload: &Value) -> Self;
}

/// Field-by-field reader over an untrusted JSON object.
#[derive(Copy, Clone, Debug)]
pub struct Payload<'a> {
    value: &'a Value,
}

impl<'a> Payload<'a> {
    pub fn new(value: &'a Value) -> Self {
        if !value.is_object() && !value.is_null() {
            log::warn!("Payload is not an object, using defaults: {value}");
        }
        Self { value }
    }

    fn field(&self, name: &str) -> Option<&'a Value> {
        self.value.get(name).filter(|value| !value.is_null())
    }

    /// A strictly positive whole number. Fractional values are truncated.
    pub fn count(&self, name: &str, default: u32) -> u32 {
        let Some(value) = self.field(name) else {
            log::trace!("Field {name:?} missing, using default {default}");
            return default;
        };

        let parsed = value
            .as_u64()
            .or_else(|| value.as_f64().filter(|n| n.is_finite() && *n >= 1.0).map(|n| n as u64))
            .filter(|&n| n > 0)
            .map(|n| n.min(u32::MAX.into()) as u32);

        match parsed {
            Some(n) => n,
            None => {
                log::warn!("Field {name:?} is not a positive number ({value}), using default {default}");
                default
            }
        }
    }

    pub fn text(&self, name: &str, default: &str) -> String {
        match self.field(name) {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(value) => {
                log::warn!("Field {name:?} is not a non-empty string ({value}), using default {default:?}");
                default.to_owned()
            }
            None => default.to_owned(),
        }
    }

    /// Any value with a serde representation, typically a unit enum.
    pub fn choice<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        let Some(value) = self.field(name) else {
            return default;
        };

        match serde_json::from_value(value.clone()) {
            Ok(choice) => choice,
            Err(err) => {
                log::warn!("Field {name:?} is not recognized ({value}): {err}, using default");
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Normal,
        Hard,
    }

    #[test]
    fn count_accepts_positive_numbers() {
        let value = json!({ "timer": 12, "rows": 4.0 });
        let payload = Payload::new(&value);

        assert_eq!(payload.count("timer", 7), 12);
        assert_eq!(payload.count("rows", 8), 4);
    }

    #[test]
    fn count_falls_back_on_malformed_values() {
        let value = json!({ "a": -3, "b": "15", "c": 0, "d": null, "e": [1] });
        let payload = Payload::new(&value);

        assert_eq!(payload.count("a", 1), 1);
        assert_eq!(payload.count("b", 2), 2);
        assert_eq!(payload.count("c", 3), 3);
        assert_eq!(payload.count("d", 4), 4);
        assert_eq!(payload.count("e", 5), 5);
        assert_eq!(payload.count("missing", 6), 6);
    }

    #[test]
    fn non_object_payload_uses_defaults() {
        let value = json!("chopping");
        let payload = Payload::new(&value);

        assert_eq!(payload.count("letters", 15), 15);
        assert_eq!(payload.text("title", "Lockpick"), "Lockpick");
    }

    #[test]
    fn choice_parses_known_variants_only() {
        let value = json!({ "good": "hard", "bad": "nightmare" });
        let payload = Payload::new(&value);

        assert_eq!(payload.choice("good", Mode::Normal), Mode::Hard);
        assert_eq!(payload.choice("bad", Mode::Normal), Mode::Normal);
    }
}
