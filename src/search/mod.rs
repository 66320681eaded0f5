pub mod highlight;

use std::collections::BTreeSet;

use crate::dataset::{Dataset, Record};

pub const DEFAULT_ISSUE_TERMS: [&str; 2] = ["headset", "connection"];

/// Lowercase substrings the active search matches against.
///
/// An empty set matches every record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchTermSet {
    terms: Vec<String>,
}

impl MatchTermSet {
    /// Splits `query` on whitespace and `|`, lowercased, empty tokens dropped.
    pub fn parse(query: &str) -> Self {
        let lower = query.trim().to_lowercase();
        let terms = lower
            .split(|c: char| c.is_whitespace() || c == '|')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { terms }
    }

    pub fn from_terms<S: AsRef<str>>(terms: &[S]) -> Self {
        Self {
            terms: terms
                .iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Query terms when the query is non-blank, else the issue terms when the
    /// toggle is on, else nothing.
    pub fn for_state<S: AsRef<str>>(state: &QueryState, issue_terms: &[S]) -> Self {
        if !state.query.trim().is_empty() {
            return Self::parse(&state.query);
        }
        if state.issues_only {
            return Self::from_terms(issue_terms);
        }
        Self::default()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Human-readable label used in report titles and file names.
    pub fn label(&self) -> String {
        if self.terms.is_empty() {
            "(all rows)".to_string()
        } else {
            self.terms.join(" OR ")
        }
    }

    pub fn matches(&self, record: &Record, headers: &[String]) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        headers.iter().any(|h| {
            let val = record.get(h).to_lowercase();
            self.terms.iter().any(|t| val.contains(t.as_str()))
        })
    }
}

/// Search state owned by the UI layer.
///
/// Transitions that change what is matched reset the page to 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState {
    pub query: String,
    pub issues_only: bool,
    pub center: Option<String>,
    pub page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            query: String::new(),
            issues_only: false,
            center: None,
            page: 1,
        }
    }
}

impl QueryState {
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_issues_only(&self, issues_only: bool) -> Self {
        Self {
            issues_only,
            page: 1,
            ..self.clone()
        }
    }

    /// `None` or a blank value selects every center. Stored trimmed, like the
    /// record values it is compared with.
    pub fn with_center(&self, center: Option<String>) -> Self {
        let center = center
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Self {
            center,
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Quick-search chip: replaces the query and turns the toggle off.
    pub fn quick_search(&self, term: impl Into<String>) -> Self {
        Self {
            query: term.into(),
            issues_only: false,
            page: 1,
            ..self.clone()
        }
    }

    pub fn cleared(&self) -> Self {
        Self::default()
    }
}

pub fn center_matches(record: &Record, call_center_field: Option<&str>, center: Option<&str>) -> bool {
    match center {
        None => true,
        Some(c) => record.trimmed(call_center_field) == c,
    }
}

/// Records matching both the term set and the center filter, fetch order kept.
pub fn filter_records<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    headers: &[String],
    terms: &MatchTermSet,
    call_center_field: Option<&str>,
    center: Option<&str>,
) -> Vec<&'a Record> {
    records
        .into_iter()
        .filter(|r| terms.matches(r, headers))
        .filter(|r| center_matches(r, call_center_field, center))
        .collect()
}

/// Distinct non-empty center values across the whole dataset, sorted.
pub fn distinct_centers(dataset: &Dataset, call_center_field: Option<&str>) -> Vec<String> {
    let set: BTreeSet<&str> = dataset
        .records
        .iter()
        .map(|r| r.trimmed(call_center_field))
        .filter(|v| !v.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}
