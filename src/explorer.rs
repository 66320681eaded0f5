use crate::aggregate::{self, CenterCount};
use crate::dataset::{Dataset, Record};
use crate::paginate::{Pager, DEFAULT_PAGE_SIZE};
use crate::report::layout::{DrawingSurface, LayoutPolicy};
use crate::report::{self, ReportError, ReportInput};
use crate::schema::FieldMapping;
use crate::search::{self, MatchTermSet, QueryState, DEFAULT_ISSUE_TERMS};

/// Result of applying one query state to the dataset.
#[derive(Clone, Debug)]
pub struct SearchView<'a> {
    pub terms: MatchTermSet,
    pub records: Vec<&'a Record>,
    pub counts: Vec<CenterCount>,
    pub pager: Pager,
    /// Requested page clamped into `1..=page_count`.
    pub page: usize,
}

impl<'a> SearchView<'a> {
    pub fn page_records(&self) -> &[&'a Record] {
        self.pager.slice(&self.records, self.page)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A fetched dataset with its field mapping, resolved once at construction.
#[derive(Clone, Debug)]
pub struct Explorer {
    dataset: Dataset,
    mapping: FieldMapping,
    issue_terms: Vec<String>,
    page_size: usize,
}

impl Explorer {
    pub fn new(dataset: Dataset) -> Self {
        let mapping = FieldMapping::infer(&dataset.headers);
        Self {
            dataset,
            mapping,
            issue_terms: DEFAULT_ISSUE_TERMS.iter().map(|t| t.to_string()).collect(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_issue_terms(mut self, terms: Vec<String>) -> Self {
        if !terms.is_empty() {
            self.issue_terms = terms;
        }
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn headers(&self) -> &[String] {
        &self.dataset.headers
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn issue_terms(&self) -> &[String] {
        &self.issue_terms
    }

    pub fn centers(&self) -> Vec<String> {
        search::distinct_centers(&self.dataset, self.mapping.call_center_field())
    }

    pub fn terms(&self, state: &QueryState) -> MatchTermSet {
        MatchTermSet::for_state(state, &self.issue_terms)
    }

    pub fn view(&self, state: &QueryState) -> SearchView<'_> {
        let terms = self.terms(state);
        let call_center = self.mapping.call_center_field();
        let records = search::filter_records(
            &self.dataset.records,
            &self.dataset.headers,
            &terms,
            call_center,
            state.center.as_deref(),
        );
        let counts = aggregate::count_by_center(&records, call_center);
        let pager = Pager::new(records.len(), self.page_size);
        let page = state.page.clamp(1, pager.page_count());
        SearchView {
            terms,
            records,
            counts,
            pager,
            page,
        }
    }

    /// Lays out the report for `state` onto `surface`.
    pub fn export(
        &self,
        state: &QueryState,
        surface: &mut dyn DrawingSurface,
        generated_at: &str,
    ) -> Result<(), ReportError> {
        let view = self.view(state);
        let input = ReportInput {
            terms: &view.terms,
            counts: &view.counts,
            records: &view.records,
            mapping: &self.mapping,
            generated_at,
        };
        report::generate(&input, surface, &LayoutPolicy::default())
    }
}
