//! Parsing of free-form model output into a variant set

use crate::enrichment::VariantSet;

/// Parse a model response into variants of `original`.
///
/// Tries, in order: the JSON list between the first `[` and the last `]`;
/// a comma/newline split of the text with brackets and double quotes
/// stripped; and finally the original name alone.
pub fn parse_variants(content: &str, original: &str) -> VariantSet {
    if let Some(items) = json_list(content) {
        if items.iter().any(|item| !item.trim().is_empty()) {
            return VariantSet::from_candidates(original, items);
        }
    }

    let tokens = split_list(content);
    if !tokens.is_empty() {
        return VariantSet::from_candidates(original, tokens);
    }

    VariantSet::single(original)
}

fn json_list(content: &str) -> Option<Vec<String>> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str::<Vec<String>>(&content[start..=end]) {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::debug!("Model response is not a JSON string list: {}", e);
            None
        }
    }
}

fn split_list(content: &str) -> Vec<String> {
    content
        .replace(['[', ']', '"'], "")
        .split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_list() {
        let set = parse_variants(r#"["Jon", "John", "Johnny"]"#, "jon");
        assert_eq!(set.as_slice(), ["Jon", "John", "Johnny"]);
    }

    #[test]
    fn test_json_list_wrapped_in_prose() {
        let content = "Sure! Here are the variations:\n```json\n[\"Robert\", \"Bob\", \"Rob\"]\n```";
        let set = parse_variants(content, "Robert");
        assert_eq!(set.as_slice(), ["Robert", "Bob", "Rob"]);
    }

    #[test]
    fn test_original_prepended_when_missing() {
        let set = parse_variants(r#"["William", "Will", "Bill"]"#, "Billy");
        assert_eq!(set.as_slice(), ["Billy", "William", "Will", "Bill"]);
    }

    #[test]
    fn test_duplicates_removed() {
        let set = parse_variants(r#"["Kate", "kate", "KATE", "Katie", ""]"#, "Kate");
        assert_eq!(set.as_slice(), ["Kate", "Katie"]);
    }

    #[test]
    fn test_malformed_json_falls_back_to_split() {
        let set = parse_variants(r#"["Liz", "Beth", "Eliza",]"#, "Elizabeth");
        assert_eq!(set.as_slice(), ["Elizabeth", "Liz", "Beth", "Eliza"]);
    }

    #[test]
    fn test_newline_separated_output() {
        let set = parse_variants("Alexander\nAlex\r\nSasha", "Alex");
        assert_eq!(set.as_slice(), ["Alexander", "Alex", "Sasha"]);
    }

    #[test]
    fn test_empty_json_list_falls_through() {
        let set = parse_variants("[]", "Maria");
        assert_eq!(set.as_slice(), ["Maria"]);
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(parse_variants("", "Omar").as_slice(), ["Omar"]);
        assert_eq!(parse_variants(" , \n ", "Omar").as_slice(), ["Omar"]);
    }

    #[test]
    fn test_apostrophes_survive() {
        let set = parse_variants(r#"["O'Brien", "OBrien", "O Brien"]"#, "O'Brien");
        assert_eq!(set.as_slice(), ["O'Brien", "OBrien", "O Brien"]);
    }
}
