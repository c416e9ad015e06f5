//! Configuration values.

/// A configuration value: a single string or an ordered list of strings.
///
/// Typed values (bools, integers) are kept as text and parsed on lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Scalar(String),
    List(Vec<String>),
}

impl ConfigValue {
    /// The scalar value, or the first element of a list.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(items) => items.first().map(String::as_str),
        }
    }

    /// The value as a list; a scalar is a single-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Scalar(s) if s.is_empty() => vec![],
            Self::Scalar(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
        }
    }

    /// Append another value, turning a scalar into a list.
    pub fn append(&mut self, other: ConfigValue) {
        let mut items = self.to_list();
        items.extend(other.to_list());
        *self = Self::List(items);
    }
}

/// Parse a boolean the way property files spell them.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
