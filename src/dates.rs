//! Best-effort publication year extraction from CSL-JSON `issued` values.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Year stored for records whose date cannot be determined.
pub const UNDATED: &str = "N.D.";

/// Free-text fields searched for a year, in order.
const FREE_TEXT_FIELDS: [&str; 2] = ["raw", "literal"];

/// Outcome of year extraction, recording which path produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearExtraction {
    /// Taken from the first `date-parts` entry
    DateParts(String),
    /// Matched inside a `raw` or `literal` free-text field
    FreeText(String),
    /// Nothing usable was found
    Undated,
}

impl YearExtraction {
    /// The year string to store in an entry (`"N.D."` when undated).
    pub fn year(&self) -> &str {
        match self {
            YearExtraction::DateParts(year) | YearExtraction::FreeText(year) => year,
            YearExtraction::Undated => UNDATED,
        }
    }

    pub fn is_dated(&self) -> bool {
        !matches!(self, YearExtraction::Undated)
    }
}

impl fmt::Display for YearExtraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.year())
    }
}

fn year_regex() -> &'static Regex {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    YEAR_RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap())
}

/// Extracts a publication year from an `issued` value.
///
/// Tries `date-parts` first, then the `raw` and `literal` free-text fields.
/// Never fails: a descriptor that is not an object, or whose `date-parts`
/// is structurally malformed, yields [`YearExtraction::Undated`].
pub fn extract_year(issued: &Value) -> YearExtraction {
    let Some(obj) = issued.as_object() else {
        return YearExtraction::Undated;
    };

    match obj.get("date-parts") {
        None | Some(Value::Null) => {}
        Some(parts) => {
            let Some(parts) = parts.as_array() else {
                return YearExtraction::Undated;
            };
            if let Some(first) = parts.first() {
                let Some(first) = first.as_array() else {
                    return YearExtraction::Undated;
                };
                if let Some(year) = first.first() {
                    return match year {
                        Value::Number(n) => YearExtraction::DateParts(n.to_string()),
                        Value::String(s) => YearExtraction::DateParts(s.clone()),
                        _ => YearExtraction::Undated,
                    };
                }
            }
        }
    }

    for field in FREE_TEXT_FIELDS {
        let text = match obj.get(field) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        if let Some(m) = year_regex().find(&text) {
            return YearExtraction::FreeText(m.as_str().to_string());
        }
    }

    YearExtraction::Undated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_year_date_parts() {
        // Given: a structured date with year and month
        let issued = json!({"date-parts": [[1999, 5]]});

        // When: we extract the year
        let result = extract_year(&issued);

        // Then: the first element is used
        assert_eq!(result, YearExtraction::DateParts("1999".to_string()));
        assert_eq!(result.year(), "1999");
    }

    #[test]
    fn test_extract_year_date_parts_string_year() {
        let issued = json!({"date-parts": [["2015", "3"]]});
        assert_eq!(extract_year(&issued).year(), "2015");
    }

    #[test]
    fn test_extract_year_literal() {
        let issued = json!({"literal": "Spring 2003 release"});
        assert_eq!(
            extract_year(&issued),
            YearExtraction::FreeText("2003".to_string())
        );
    }

    #[test]
    fn test_extract_year_raw_before_literal() {
        let issued = json!({"raw": "circa 1987", "literal": "2001"});
        assert_eq!(extract_year(&issued).year(), "1987");
    }

    #[test]
    fn test_extract_year_empty_date_parts_falls_back_to_raw() {
        // Given: an empty first date-parts entry and a raw date
        let issued = json!({"date-parts": [[]], "raw": "2012-04-01"});

        // When: we extract the year
        let result = extract_year(&issued);

        // Then: the raw field is used
        assert_eq!(result, YearExtraction::FreeText("2012".to_string()));
    }

    #[test]
    fn test_extract_year_ignores_embedded_digits() {
        // 4 digits glued to other digits are not a year
        let issued = json!({"raw": "ref 120245"});
        assert_eq!(extract_year(&issued), YearExtraction::Undated);
    }

    #[test]
    fn test_extract_year_out_of_range_century() {
        let issued = json!({"literal": "1850"});
        assert_eq!(extract_year(&issued), YearExtraction::Undated);
    }

    #[test]
    fn test_extract_year_non_string_raw() {
        let issued = json!({"raw": 2004});
        assert_eq!(extract_year(&issued).year(), "2004");
    }

    #[test]
    fn test_extract_year_empty_object() {
        let result = extract_year(&json!({}));
        assert_eq!(result, YearExtraction::Undated);
        assert_eq!(result.year(), UNDATED);
        assert!(!result.is_dated());
    }

    #[test]
    fn test_extract_year_non_object() {
        assert_eq!(extract_year(&json!("2020")), YearExtraction::Undated);
        assert_eq!(extract_year(&json!([2020])), YearExtraction::Undated);
        assert_eq!(extract_year(&Value::Null), YearExtraction::Undated);
    }

    #[test]
    fn test_extract_year_malformed_date_parts() {
        // Given: date-parts that is not a list of lists, plus a usable raw field
        let issued = json!({"date-parts": "2020", "raw": "2019"});

        // When: we extract the year
        let result = extract_year(&issued);

        // Then: the malformed structure short-circuits to the sentinel
        assert_eq!(result, YearExtraction::Undated);
        assert_eq!(extract_year(&json!({"date-parts": [2020]})), YearExtraction::Undated);
    }

    #[test]
    fn test_extract_year_non_scalar_first_part() {
        // Given: a first date-parts element that is neither a number nor a string
        for year in [json!(null), json!(true), json!({"y": 2020})] {
            let issued = json!({"date-parts": [[year]], "raw": "2019"});

            // Then: no year is rendered from it and free text is not consulted
            assert_eq!(extract_year(&issued), YearExtraction::Undated, "{}", issued);
        }
    }

    #[test]
    fn test_year_extraction_display() {
        assert_eq!(YearExtraction::DateParts("2021".to_string()).to_string(), "2021");
        assert_eq!(YearExtraction::Undated.to_string(), "N.D.");
    }
}
