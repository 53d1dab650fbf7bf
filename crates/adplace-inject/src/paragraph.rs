//! Paragraph placement as a text splice

use adplace_core::{AdId, StreamKind};
use regex::Regex;

use crate::counter::{CountingRule, StreamCounter};

pub const DEFAULT_DELIMITER: &str = "</p>";

/// Result of splicing ads into content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOutcome {
    pub content: String,
    /// Ads actually inserted, once per insertion
    pub emitted: Vec<AdId>,
}

/// Inserts ad markup after paragraph boundaries
#[derive(Debug, Clone)]
pub struct ParagraphSplicer {
    delimiter: Regex,
}

impl ParagraphSplicer {
    /// Match `delimiter` literally and case-insensitively. Blank means `</p>`.
    pub fn new(delimiter: &str) -> Result<Self, regex::Error> {
        let delimiter = if delimiter.trim().is_empty() {
            DEFAULT_DELIMITER
        } else {
            delimiter
        };
        Ok(Self {
            delimiter: Regex::new(&format!("(?i){}", regex::escape(delimiter)))?,
        })
    }

    /// Number of paragraph boundaries in `content`
    pub fn count(&self, content: &str) -> usize {
        self.delimiter.find_iter(content).count()
    }

    /// Walk the paragraph boundaries of `content`, counting each on a fresh
    /// paragraph stream, and insert `emit(ad)` after every boundary where an ad
    /// fires. `emit` returning an empty string means the ad is not shown.
    pub fn splice(
        &self,
        content: &str,
        rules: &[CountingRule],
        emit: &mut dyn FnMut(AdId) -> String,
    ) -> SpliceOutcome {
        let mut counter = StreamCounter::new(StreamKind::Paragraph);
        let mut output = String::with_capacity(content.len());
        let mut emitted = Vec::new();
        let mut last = 0;

        for boundary in self.delimiter.find_iter(content) {
            output.push_str(&content[last..boundary.end()]);
            last = boundary.end();

            for ad in counter.advance(rules) {
                let markup = emit(ad);
                if markup.is_empty() {
                    continue;
                }
                output.push_str(&markup);
                emitted.push(ad);
            }
        }
        output.push_str(&content[last..]);

        SpliceOutcome {
            content: output,
            emitted,
        }
    }
}

impl Default for ParagraphSplicer {
    fn default() -> Self {
        Self {
            delimiter: Regex::new("(?i)</p>").unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(paragraphs: usize) -> String {
        (1..=paragraphs).map(|i| format!("<p>p{}</p>", i)).collect()
    }

    fn tag(ad: AdId) -> String {
        format!("[ad{}]", ad)
    }

    #[test]
    fn test_once_after_second_paragraph() {
        let splicer = ParagraphSplicer::default();
        let rules = [CountingRule::new(AdId(1), 2, false)];
        let outcome = splicer.splice(&body(5), &rules, &mut tag);

        assert_eq!(
            outcome.content,
            "<p>p1</p><p>p2</p>[ad1]<p>p3</p><p>p4</p><p>p5</p>"
        );
        assert_eq!(outcome.emitted, vec![AdId(1)]);
    }

    #[test]
    fn test_priority_ordered_scenario() {
        // A (priority 8, once after 2) listed before B (priority 3, every 2)
        let rules = [
            CountingRule::new(AdId(1), 2, false),
            CountingRule::new(AdId(2), 2, true),
        ];
        let outcome = ParagraphSplicer::default().splice(&body(6), &rules, &mut tag);

        assert_eq!(
            outcome.content,
            "<p>p1</p><p>p2</p>[ad1][ad2]<p>p3</p><p>p4</p>[ad2]<p>p5</p><p>p6</p>[ad2]"
        );
        assert_eq!(outcome.emitted, vec![AdId(1), AdId(2), AdId(2), AdId(2)]);
    }

    #[test]
    fn test_delimiter_case_insensitive_and_trailing_text_kept() {
        let content = "<P>one</P>\n<p>two</p>\ntail";
        let rules = [CountingRule::new(AdId(4), 1, true)];
        let outcome = ParagraphSplicer::default().splice(content, &rules, &mut tag);
        assert_eq!(outcome.content, "<P>one</P>[ad4]\n<p>two</p>[ad4]\ntail");
    }

    #[test]
    fn test_not_enough_paragraphs() {
        let rules = [CountingRule::new(AdId(1), 3, false)];
        let outcome = ParagraphSplicer::default().splice(&body(2), &rules, &mut tag);
        assert_eq!(outcome.content, body(2));
        assert!(outcome.emitted.is_empty());
    }

    #[test]
    fn test_empty_markup_not_emitted() {
        let rules = [CountingRule::new(AdId(1), 1, true)];
        let outcome = ParagraphSplicer::default().splice(&body(3), &rules, &mut |_| String::new());
        assert_eq!(outcome.content, body(3));
        assert!(outcome.emitted.is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let splicer = ParagraphSplicer::new("\n\n").unwrap();
        let rules = [CountingRule::new(AdId(1), 1, false)];
        let outcome = splicer.splice("a\n\nb\n\nc", &rules, &mut tag);
        assert_eq!(outcome.content, "a\n\n[ad1]b\n\nc");
        assert_eq!(splicer.count("a\n\nb\n\nc"), 2);
    }

    #[test]
    fn test_blank_delimiter_falls_back() {
        let splicer = ParagraphSplicer::new("  ").unwrap();
        assert_eq!(splicer.count(&body(3)), 3);
    }
}
