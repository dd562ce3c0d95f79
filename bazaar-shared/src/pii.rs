use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps customer data (shipping addresses) so it never shows up in `Debug`/`Display` output.
///
/// Serialization passes the real value through: API responses and storage need it,
/// log macros like `tracing::info!("{:?}", order)` must not.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_masked() {
        let address = Masked::new("221B Baker Street".to_string());
        assert_eq!(format!("{:?}", address), "********");
        assert_eq!(format!("{}", address), "********");
    }

    #[test]
    fn test_serializes_real_value() {
        let address = Masked::new("221B Baker Street".to_string());
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"221B Baker Street\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose(), "221B Baker Street");
    }
}
