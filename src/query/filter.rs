//! Filter clause and phrase construction for the index query language

use chrono::NaiveDate;

/// Escape a value for use inside a single-quoted filter literal.
/// Single quotes are doubled, so `O'Brien` becomes `O''Brien`.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// `field eq 'value'`
pub fn eq_clause(field: &str, value: &str) -> String {
    format!("{} eq '{}'", field, escape_literal(value))
}

/// `(field eq 'a' or field eq 'b')`, or a bare equality for a single value
pub fn any_of_clause(field: &str, values: &[String]) -> Option<String> {
    let clauses: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| eq_clause(field, v))
        .collect();

    match clauses.len() {
        0 => None,
        1 => clauses.into_iter().next(),
        _ => Some(format!("({})", clauses.join(" or "))),
    }
}

/// Half-open date range `[from, to)` over UTC midnights
pub fn range_clause(field: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "{field} ge {} and {field} lt {}",
        from.format("%Y-%m-%dT00:00:00Z"),
        to.format("%Y-%m-%dT00:00:00Z"),
    )
}

/// Quote a variant as a phrase for the full query syntax
pub fn quote_phrase(variant: &str) -> String {
    let mut quoted = String::with_capacity(variant.len() + 2);
    quoted.push('"');
    for c in variant.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_apostrophe() {
        assert_eq!(escape_literal("O'Brien"), "O''Brien");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn test_eq_clause_escapes_value() {
        assert_eq!(eq_clause("countyId", "O'Hare"), "countyId eq 'O''Hare'");
    }

    #[test]
    fn test_any_of_clause() {
        let kinds = vec!["I".to_string(), "B".to_string()];
        assert_eq!(
            any_of_clause("individualFlag", &kinds).unwrap(),
            "(individualFlag eq 'I' or individualFlag eq 'B')"
        );
        assert_eq!(
            any_of_clause("individualFlag", &["I".to_string()]).unwrap(),
            "individualFlag eq 'I'"
        );
        assert!(any_of_clause("individualFlag", &[" ".to_string()]).is_none());
    }

    #[test]
    fn test_range_clause() {
        let from = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(
            range_clause("closingDate", from, to),
            "closingDate ge 2024-05-01T00:00:00Z and closingDate lt 2024-05-02T00:00:00Z"
        );
    }

    #[test]
    fn test_quote_phrase() {
        assert_eq!(quote_phrase("Jon"), "\"Jon\"");
        assert_eq!(quote_phrase("O'Brien"), "\"O'Brien\"");
        assert_eq!(quote_phrase("a\"b"), "\"a\\\"b\"");
    }
}
