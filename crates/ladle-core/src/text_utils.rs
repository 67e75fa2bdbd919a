use once_cell::sync::Lazy;
use regex::Regex;

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// Normalize a recipe title for duplicate comparison: lower-case, strip
/// punctuation, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    collapse_whitespace(&stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_basic() {
        assert_eq!(collapse_whitespace("  a\t b \n c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn normalize_title_case_and_punctuation() {
        assert_eq!(normalize_title("Overnight Oats"), "overnight oats");
        assert_eq!(normalize_title("OVERNIGHT   OATS!"), "overnight oats");
        assert_eq!(normalize_title("Mom's \"Best\" Pie"), "moms best pie");
    }

    #[test]
    fn normalize_title_all_punctuation_is_empty() {
        assert_eq!(normalize_title("***---***"), "");
    }

    #[test]
    fn normalized_titles_compare_equal_across_formatting() {
        assert_eq!(
            normalize_title("Chicken & Rice Casserole"),
            normalize_title("chicken  rice CASSEROLE")
        );
    }
}
