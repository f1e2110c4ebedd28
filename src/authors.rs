//! Author list formatting.
//!
//! Renders CSL-JSON author descriptors into a single display string,
//! e.g. `"Ada Lovelace, Charles Babbage, and ACME Corp"`.

use serde_json::Value;

/// A single author as found in a CSL-JSON `author` array.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorDescriptor {
    /// Organizational author (`{"literal": "ACME Corp"}`)
    Literal(String),
    /// Personal author (`{"family": "Lovelace", "given": "Ada"}`)
    Personal {
        family: String,
        given: Option<String>,
    },
}

impl AuthorDescriptor {
    /// Converts one JSON author object.
    ///
    /// `literal` wins when both forms are present. Returns `None` for values
    /// that match neither form.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        if let Some(literal) = obj.get("literal").and_then(Value::as_str) {
            return Some(AuthorDescriptor::Literal(literal.to_string()));
        }

        let family = obj.get("family").and_then(Value::as_str)?;
        let given = obj.get("given").and_then(Value::as_str).map(str::to_string);
        Some(AuthorDescriptor::Personal {
            family: family.to_string(),
            given,
        })
    }

    /// The name as it should appear in the author list.
    pub fn display_name(&self) -> String {
        match self {
            AuthorDescriptor::Literal(name) => name.clone(),
            AuthorDescriptor::Personal { family, given } => match given {
                Some(given) => format!("{} {}", given, family),
                None => family.clone(),
            },
        }
    }
}

/// Converts a whole `author` field. Anything other than an array yields no authors.
pub fn authors_from_value(value: &Value) -> Vec<AuthorDescriptor> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(AuthorDescriptor::from_value).collect())
        .unwrap_or_default()
}

/// Joins author names Oxford-comma style.
///
/// # Examples
///
/// ```
/// use pubs_sync::authors::{format_authors, AuthorDescriptor};
///
/// let authors = vec![
///     AuthorDescriptor::Literal("A".to_string()),
///     AuthorDescriptor::Literal("B".to_string()),
///     AuthorDescriptor::Literal("C".to_string()),
/// ];
/// assert_eq!(format_authors(&authors), "A, B, and C");
/// ```
pub fn format_authors(authors: &[AuthorDescriptor]) -> String {
    let names: Vec<String> = authors
        .iter()
        .map(AuthorDescriptor::display_name)
        .filter(|name| !name.is_empty())
        .collect();

    match names.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn personal(given: &str, family: &str) -> AuthorDescriptor {
        AuthorDescriptor::Personal {
            family: family.to_string(),
            given: Some(given.to_string()),
        }
    }

    // --- Tests for format_authors ---

    #[test]
    fn test_format_authors_empty() {
        assert_eq!(format_authors(&[]), "");
    }

    #[test]
    fn test_format_authors_single_personal() {
        // Given: one personal author with a given name
        let authors = vec![personal("Ada", "Lovelace")];

        // When: we format the list
        let result = format_authors(&authors);

        // Then: given name comes first
        assert_eq!(result, "Ada Lovelace");
    }

    #[test]
    fn test_format_authors_two() {
        let authors = vec![personal("Ada", "Lovelace"), personal("Charles", "Babbage")];
        assert_eq!(format_authors(&authors), "Ada Lovelace and Charles Babbage");
    }

    #[test]
    fn test_format_authors_three_uses_oxford_comma() {
        let authors = vec![
            AuthorDescriptor::Literal("A".to_string()),
            AuthorDescriptor::Literal("B".to_string()),
            AuthorDescriptor::Literal("C".to_string()),
        ];
        assert_eq!(format_authors(&authors), "A, B, and C");
    }

    #[test]
    fn test_format_authors_organizational() {
        let authors = vec![AuthorDescriptor::Literal("ACME Corp".to_string())];
        assert_eq!(format_authors(&authors), "ACME Corp");
    }

    #[test]
    fn test_format_authors_family_only() {
        let authors = vec![AuthorDescriptor::Personal {
            family: "Plato".to_string(),
            given: None,
        }];
        assert_eq!(format_authors(&authors), "Plato");
    }

    #[test]
    fn test_format_authors_skips_empty_names() {
        // Given: an empty literal between two real names
        let authors = vec![
            personal("Ada", "Lovelace"),
            AuthorDescriptor::Literal(String::new()),
            personal("Charles", "Babbage"),
        ];

        // When: we format the list
        let result = format_authors(&authors);

        // Then: the empty name does not count toward the join rule
        assert_eq!(result, "Ada Lovelace and Charles Babbage");
    }

    // --- Tests for conversion from JSON ---

    #[test]
    fn test_from_value_literal_takes_precedence() {
        let value = json!({"literal": "ACME Corp", "family": "Ignored", "given": "X"});
        assert_eq!(
            AuthorDescriptor::from_value(&value),
            Some(AuthorDescriptor::Literal("ACME Corp".to_string()))
        );
    }

    #[test]
    fn test_from_value_malformed_descriptors() {
        assert_eq!(AuthorDescriptor::from_value(&json!({"given": "Ada"})), None);
        assert_eq!(AuthorDescriptor::from_value(&json!("Ada Lovelace")), None);
        assert_eq!(AuthorDescriptor::from_value(&json!({"family": 42})), None);
    }

    #[test]
    fn test_authors_from_value_drops_malformed_entries() {
        // Given: an author array mixing valid and malformed descriptors
        let value = json!([
            {"family": "Lovelace", "given": "Ada"},
            {"given": "Nobody"},
            {"literal": "ACME Corp"}
        ]);

        // When: we convert and format it
        let authors = authors_from_value(&value);

        // Then: only the valid descriptors contribute names
        assert_eq!(authors.len(), 2);
        assert_eq!(format_authors(&authors), "Ada Lovelace and ACME Corp");
    }

    #[test]
    fn test_authors_from_value_not_an_array() {
        assert!(authors_from_value(&json!({"family": "Lovelace"})).is_empty());
        assert!(authors_from_value(&Value::Null).is_empty());
    }
}
