//! Widget identity shared by every widget variant

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Widget variant tag stored with every widget record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WidgetType {
    #[default]
    Graph,
    Readout,
}

/// Generate a fresh unique widget key
pub fn generate_key() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_is_unique() {
        let a = generate_key();
        let b = generate_key();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_widget_type_serialization() {
        assert_eq!(serde_json::to_string(&WidgetType::Graph).unwrap(), "\"Graph\"");
        let parsed: WidgetType = serde_json::from_str("\"Readout\"").unwrap();
        assert_eq!(parsed, WidgetType::Readout);
    }
}
