use regex::{Regex, RegexBuilder};
use tracing::warn;

use super::MatchTermSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Case-insensitive matcher for every active term.
///
/// Text is lowercased the same way rows are matched, then matches are mapped
/// back onto the original characters. Alternation follows term order, so
/// overlapping candidates resolve leftmost-first and matches never overlap.
#[derive(Clone, Debug)]
pub struct Highlighter {
    re: Option<Regex>,
}

impl Highlighter {
    pub fn new(terms: &MatchTermSet) -> Self {
        if terms.is_empty() {
            return Self { re: None };
        }
        let pattern = terms
            .terms()
            .iter()
            .map(|t| regex::escape(&t.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");
        let re = match RegexBuilder::new(&pattern).build() {
            Ok(re) => Some(re),
            Err(err) => {
                warn!(terms = terms.terms().len(), "highlighting disabled: {err}");
                None
            }
        };
        Self { re }
    }

    pub fn segments<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let re = match self.re.as_ref() {
            Some(re) => re,
            None => return vec![Segment { text, matched: false }],
        };
        // byte i of `lowered` came from the original char spanning spans[i]
        let mut lowered = String::with_capacity(text.len());
        let mut spans = Vec::with_capacity(text.len());
        for (start, ch) in text.char_indices() {
            let end = start + ch.len_utf8();
            for lc in ch.to_lowercase() {
                lowered.push(lc);
                spans.extend(std::iter::repeat((start, end)).take(lc.len_utf8()));
            }
        }

        let mut out = Vec::new();
        let mut last = 0;
        for m in re.find_iter(&lowered) {
            if m.start() == m.end() {
                continue;
            }
            let start = spans[m.start()].0.max(last);
            let end = spans[m.end() - 1].1;
            if end <= start {
                continue;
            }
            if start > last {
                out.push(Segment {
                    text: &text[last..start],
                    matched: false,
                });
            }
            out.push(Segment {
                text: &text[start..end],
                matched: true,
            });
            last = end;
        }
        if last < text.len() || out.is_empty() {
            out.push(Segment {
                text: &text[last..],
                matched: false,
            });
        }
        out
    }

    /// Wraps every match in `open`/`close`.
    pub fn mark(&self, text: &str, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for seg in self.segments(text) {
            if seg.matched {
                out.push_str(open);
                out.push_str(seg.text);
                out.push_str(close);
            } else {
                out.push_str(seg.text);
            }
        }
        out
    }
}
