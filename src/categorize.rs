//! Guideline heading categorizer.
//!
//! Maps free-form heading text ("Escalation", "Do's and Don'ts", "PROMOS &
//! EXCLUSIONS") onto the fixed category vocabulary the review app expects.
//! Headings that match no rule keep their cleaned form as a dynamic key.

use std::sync::OnceLock;

use regex::Regex;

use crate::text::normalize_text;

/// Category used when a heading is blank or cleans down to nothing.
pub const DEFAULT_CATEGORY: &str = "important";

/// Routing table applied to the cleaned heading key, in priority order.
/// First match wins; keep entries ordered from most to least specific.
const CATEGORY_RULES: [(&str, &str); 7] = [
    (r"send.*cs", "send_to_cs"),
    (r"^escalate$|^escalation$|escalat", "escalate"),
    (r"^tone$", "tone"),
    (r"template", "templates"),
    (r"do.*and.*don|dos_and_donts|don_ts|donts", "dos_and_donts"),
    (r"drive.*purchase", "drive_to_purchase"),
    (r"promo", "promo_and_exclusions"),
];

fn category_rules() -> &'static Vec<(Regex, &'static str)> {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        CATEGORY_RULES
            .iter()
            .map(|(pattern, key)| (Regex::new(pattern).unwrap(), *key))
            .collect()
    })
}

fn re_leading_junk() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^a-z0-9]+").unwrap())
}

fn re_non_alnum_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Map heading text to a category key.
///
/// Cleaning: NFKC, lowercase, strip leading punctuation, `&` → `and`,
/// collapse non-alphanumeric runs to single underscores. The cleaned key is
/// then routed through [`CATEGORY_RULES`]; unmatched keys pass through as-is.
/// Canonical keys route back to themselves, which keeps re-normalization of
/// already-stored notes stable.
pub fn categorize_heading(heading: &str) -> String {
    if heading.trim().is_empty() {
        return DEFAULT_CATEGORY.to_string();
    }

    let key = normalize_text(heading).trim().to_lowercase();
    let key = re_leading_junk().replace(&key, "");
    let key = key.replace('&', "and");
    let key = re_non_alnum_run()
        .replace_all(&key, "_")
        .trim_matches('_')
        .to_string();

    for (pattern, canonical) in category_rules() {
        if pattern.is_match(&key) {
            return (*canonical).to_string();
        }
    }

    if key.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_heading_defaults_to_important() {
        assert_eq!(categorize_heading(""), "important");
        assert_eq!(categorize_heading("   "), "important");
        assert_eq!(categorize_heading("!!!"), "important");
    }

    #[test]
    fn escalation_family() {
        assert_eq!(categorize_heading("Escalation"), "escalate");
        assert_eq!(categorize_heading("Escalate"), "escalate");
        assert_eq!(categorize_heading("Escalation Policy"), "escalate");
    }

    #[test]
    fn dos_and_donts_spellings() {
        assert_eq!(categorize_heading("Do's and Don'ts"), "dos_and_donts");
        assert_eq!(categorize_heading("Dos and Donts"), "dos_and_donts");
        assert_eq!(categorize_heading("DON'TS"), "dos_and_donts");
    }

    #[test]
    fn remaining_canonical_routes() {
        assert_eq!(categorize_heading("Send to CS"), "send_to_cs");
        assert_eq!(categorize_heading("Tone"), "tone");
        assert_eq!(categorize_heading("Templates to use"), "templates");
        assert_eq!(categorize_heading("Drive to Purchase"), "drive_to_purchase");
        assert_eq!(categorize_heading("Promos & Exclusions"), "promo_and_exclusions");
    }

    #[test]
    fn ampersand_becomes_and() {
        assert_eq!(categorize_heading("Shipping & Returns"), "shipping_and_returns");
    }

    #[test]
    fn unmatched_heading_keeps_cleaned_key() {
        assert_eq!(categorize_heading("  Brand Voice!  "), "brand_voice");
    }

    #[test]
    fn canonical_keys_are_fixpoints() {
        for key in [
            "important",
            "send_to_cs",
            "escalate",
            "tone",
            "templates",
            "dos_and_donts",
            "drive_to_purchase",
            "promo_and_exclusions",
        ] {
            assert_eq!(categorize_heading(key), key);
        }
    }
}
