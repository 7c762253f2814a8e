//! Article summary generation.
//!
//! [`Summariser`] is the seam used by loading and enrichment. The bundled
//! [`ExtractiveSummariser`] keeps leading sentences of the headline and
//! description and never fails.

/// Produces a short summary for an article.
pub trait Summariser: Send + Sync {
    /// Summarise an article from its headline and description.
    fn summarise(&self, title: &str, description: &str) -> String;
}

/// Sentences longer than this many characters are kept.
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Leading sentences considered for a summary.
pub const LEADING_SENTENCES: usize = 3;

/// Fallback descriptions are cut to this many characters.
pub const FALLBACK_CHARS: usize = 200;

/// Summariser that keeps the substantial leading sentences.
///
/// The headline and description are joined as `"{title}. {description}"`
/// and split on `.`. Of the first [`LEADING_SENTENCES`] pieces, those longer
/// than [`MIN_SENTENCE_CHARS`] after trimming are joined with `". "` and
/// terminated with `.`. When none qualify the description is returned,
/// truncated to [`FALLBACK_CHARS`] characters and suffixed with `...` when
/// longer.
///
/// # Examples
/// ```
/// use newsdesk_core::{ExtractiveSummariser, Summariser};
///
/// let summary = ExtractiveSummariser.summarise(
///     "Council approves new cycle lanes",
///     "Work starts next month on the riverside route. Short one.",
/// );
/// assert_eq!(
///     summary,
///     "Council approves new cycle lanes. Work starts next month on the riverside route."
/// );
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveSummariser;

impl Summariser for ExtractiveSummariser {
    fn summarise(&self, title: &str, description: &str) -> String {
        let text = format!("{title}. {description}");
        let kept: Vec<&str> = text
            .split('.')
            .take(LEADING_SENTENCES)
            .map(str::trim)
            .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
            .collect();
        if kept.is_empty() {
            truncate_description(description)
        } else {
            format!("{}.", kept.join(". "))
        }
    }
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > FALLBACK_CHARS {
        let mut cut: String = description.chars().take(FALLBACK_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        description.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn keeps_only_leading_long_sentences() {
        let summary = ExtractiveSummariser.summarise(
            "Storm closes the coastal railway line",
            "Engineers expect repairs to take a week. Buses replace trains. \
             A fourth sentence that is long enough but comes too late.",
        );
        assert_eq!(
            summary,
            "Storm closes the coastal railway line. Engineers expect repairs to take a week."
        );
    }

    #[rstest]
    fn short_text_falls_back_to_description() {
        let summary = ExtractiveSummariser.summarise("Short", "Also short.");
        assert_eq!(summary, "Also short.");
    }

    #[rstest]
    fn long_description_without_sentences_is_truncated() {
        let description = "word ".repeat(60);
        let summary = ExtractiveSummariser.summarise("Tiny", "");
        assert_eq!(summary, "");
        let summary = ExtractiveSummariser.summarise("Tiny", &description.replace(' ', "."));
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), FALLBACK_CHARS + 3);
    }

    #[rstest]
    fn counts_characters_not_bytes() {
        let summary = ExtractiveSummariser.summarise("Café", "Crème brûlée");
        assert_eq!(summary, "Crème brûlée");
    }
}
