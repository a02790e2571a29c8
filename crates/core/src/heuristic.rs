//! Detection of LLM answers that drift into step-by-step tutorials instead of
//! asking questions or emitting a specification.
//!
//! The thresholds are rough; keep detection behind [`ResponseFilter`] so a
//! better classifier can replace [`KeywordTutorialFilter`] without touching
//! the conversation flow.

/// Decides whether an assistant answer should be regenerated.
pub trait ResponseFilter: Send + Sync {
    fn is_tutorial(&self, text: &str) -> bool;
}

/// Phrases that show up in tutorial-style answers. Matched case-insensitively.
pub const TUTORIAL_INDICATORS: &[&str] = &[
    "## ",
    "**steps",
    "**part ",
    "follow these steps",
    "go to awesome bar",
    "click **\"new\"**",
    "fill in the details:",
    "client script",
    "web form for",
];

/// Answers longer than this are treated as tutorials regardless of content.
pub const MAX_ANSWER_CHARS: usize = 3000;

/// Keyword and length based tutorial detection.
#[derive(Debug, Clone)]
pub struct KeywordTutorialFilter {
    pub indicators: Vec<String>,
    pub max_chars: usize,
}

impl Default for KeywordTutorialFilter {
    fn default() -> Self {
        KeywordTutorialFilter {
            indicators: TUTORIAL_INDICATORS.iter().map(|s| s.to_string()).collect(),
            max_chars: MAX_ANSWER_CHARS,
        }
    }
}

impl ResponseFilter for KeywordTutorialFilter {
    fn is_tutorial(&self, text: &str) -> bool {
        if text.chars().count() > self.max_chars {
            return true;
        }
        let lower = text.to_lowercase();
        self.indicators
            .iter()
            .any(|ind| lower.contains(&ind.to_lowercase()))
    }
}

/// A filter that never trips.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl ResponseFilter for NoFilter {
    fn is_tutorial(&self, _text: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_question_is_not_a_tutorial() {
        let f = KeywordTutorialFilter::default();
        assert!(!f.is_tutorial("Which fields should be mandatory?"));
    }

    #[test]
    fn markdown_headers_trip_the_filter() {
        let f = KeywordTutorialFilter::default();
        assert!(f.is_tutorial("## Step 1\nOpen the desk"));
        assert!(f.is_tutorial("### Details"));
    }

    #[test]
    fn indicators_match_regardless_of_case() {
        let f = KeywordTutorialFilter::default();
        assert!(f.is_tutorial("**Steps to create the form**"));
        assert!(f.is_tutorial("Please FOLLOW THESE STEPS carefully"));
    }

    #[test]
    fn overlong_answers_trip_the_filter() {
        let f = KeywordTutorialFilter::default();
        assert!(f.is_tutorial(&"a".repeat(MAX_ANSWER_CHARS + 1)));
        assert!(!f.is_tutorial(&"a".repeat(MAX_ANSWER_CHARS)));
    }

    #[test]
    fn no_filter_accepts_everything() {
        assert!(!NoFilter.is_tutorial("## follow these steps"));
    }
}
