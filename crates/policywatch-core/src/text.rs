//! Cleanup of generated summary text before it is shown.
//!
//! Summaries come from a language model and often open with boilerplate
//! ("Here's a concise summary ... for a product manager:") or carry
//! separator rules. Those are stripped; the markdown itself is left alone.

use std::sync::LazyLock;

use regex::Regex;

/// Preambles and meta commentary; only the first match of each is removed.
static PREAMBLES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?im)^Here's a concise summary.*?for a product manager[^:\n]*:?[ \t]*\n?",
        r"(?im)^As a Trust & Safety analyst,? here is a concise summary.*?for a Product Manager[^:\n]*:?[ \t]*\n?",
        r"(?im)^concise summary.*?for a product manager[^:\n]*:?[ \t]*\n?",
        r"(?im)highlighting key changes?[^:\n]*:?[ \t]*",
        r"(?im)highlighting.*?implications[^:\n]*:?[ \t]*",
        r"(?im)This diff (?:represents|introduces|shows).*?\.[ \t]*",
        r"(?im)^Based on this diff[^:\n]*:?[ \t]*\n?",
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// `---` and `***` rules on a line of their own.
static RULES: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:-{3,}|\*{3,})[ \t]*$").ok());

static BLANK_RUNS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\n{3,}").ok());

/// Strip generated filler from a summary and trim it.
///
/// Runs of three or more newlines collapse to one blank line.
pub fn clean_summary(text: &str) -> String {
    let mut cleaned = text.replace("\r\n", "\n");
    for re in PREAMBLES.iter() {
        cleaned = re.replace(&cleaned, "").into_owned();
    }
    if let Some(re) = RULES.as_ref() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    if let Some(re) = BLANK_RUNS.as_ref() {
        cleaned = re.replace_all(&cleaned, "\n\n").into_owned();
    }
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_product_manager_preamble() {
        let text = "Here's a concise summary of the policy for a product manager:\n\n## Key rules\n- No spam";
        assert_eq!(clean_summary(text), "## Key rules\n- No spam");
    }

    #[test]
    fn strips_analyst_preamble_case_insensitively() {
        let text = "as a trust & safety analyst here is a concise summary of changes for a product manager:\n**Bold** change";
        assert_eq!(clean_summary(text), "**Bold** change");
    }

    #[test]
    fn strips_diff_commentary() {
        let text = "This diff introduces a new section on scams. The appeals window is now 30 days.";
        assert_eq!(clean_summary(text), "The appeals window is now 30 days.");

        let text = "Based on this diff:\nHarassment rules now cover livestreams.";
        assert_eq!(clean_summary(text), "Harassment rules now cover livestreams.");
    }

    #[test]
    fn removes_rules_and_collapses_blank_runs() {
        let text = "First point\n---\n\n\n\nSecond point\n***\nThird";
        assert_eq!(clean_summary(text), "First point\n\nSecond point\n\nThird");
    }

    #[test]
    fn keeps_plain_text_and_inline_dashes() {
        assert_eq!(
            clean_summary("  Minimum age raised to 16 -- effective now. "),
            "Minimum age raised to 16 -- effective now."
        );
        assert_eq!(clean_summary(""), "");
    }
}
