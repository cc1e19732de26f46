//! Filter state for paged result views.

use serde::{Deserialize, Serialize};

use super::page::{Page, paginate, total_pages};
use crate::model::InstitutionRecord;
use crate::search::normalize_text;

/// Upstream filters applied before paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionFilter {
    /// Free text matched against name, locality and program.
    pub text: Option<String>,
    pub region: Option<String>,
    pub locality: Option<String>,
    pub founder_type: Option<String>,
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn same(wanted: &Option<String>, actual: &str) -> bool {
    blank(wanted) || wanted.as_deref().is_some_and(|w| normalize_text(w) == normalize_text(actual))
}

impl InstitutionFilter {
    pub fn is_empty(&self) -> bool {
        blank(&self.text) && blank(&self.region) && blank(&self.locality) && blank(&self.founder_type)
    }

    /// Whether `record` passes every set filter.
    pub fn matches(&self, record: &InstitutionRecord) -> bool {
        if !same(&self.region, &record.region) || !same(&self.locality, &record.locality) {
            return false;
        }

        if !blank(&self.founder_type)
            && !record.founder_type.as_deref().is_some_and(|f| same(&self.founder_type, f))
        {
            return false;
        }

        match self.text.as_deref().map(normalize_text) {
            Some(needle) if !needle.is_empty() => [&record.name, &record.locality, &record.program_name]
                .iter()
                .any(|field| normalize_text(field).contains(&needle)),
            _ => true,
        }
    }

    pub fn apply<'a>(&'a self, records: &'a [InstitutionRecord]) -> impl Iterator<Item = &'a InstitutionRecord> + 'a {
        records.iter().filter(move |r| self.matches(r))
    }
}

/// A filtered, paged view whose page resets whenever a filter changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedView {
    filter: InstitutionFilter,
    current_page: usize,
    page_size: usize,
}

impl PagedView {
    pub fn new(page_size: usize) -> Self {
        Self { filter: InstitutionFilter::default(), current_page: 1, page_size }
    }

    pub fn filter(&self) -> &InstitutionFilter {
        &self.filter
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the whole filter. Returns whether it changed.
    pub fn set_filter(&mut self, filter: InstitutionFilter) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        self.current_page = 1;
        true
    }

    pub fn set_text(&mut self, text: Option<String>) -> bool {
        let filter = InstitutionFilter { text, ..self.filter.clone() };
        self.set_filter(filter)
    }

    pub fn set_region(&mut self, region: Option<String>) -> bool {
        let filter = InstitutionFilter { region, ..self.filter.clone() };
        self.set_filter(filter)
    }

    pub fn set_locality(&mut self, locality: Option<String>) -> bool {
        let filter = InstitutionFilter { locality, ..self.filter.clone() };
        self.set_filter(filter)
    }

    pub fn set_founder_type(&mut self, founder_type: Option<String>) -> bool {
        let filter = InstitutionFilter { founder_type, ..self.filter.clone() };
        self.set_filter(filter)
    }

    /// Request a page; values below 1 become 1.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Filter `records` and cut out the current page, clamped to the last page.
    pub fn render(&mut self, records: &[InstitutionRecord]) -> Page<InstitutionRecord> {
        let filtered: Vec<InstitutionRecord> = self.filter.apply(records).cloned().collect();
        let pages = total_pages(filtered.len(), self.page_size);
        self.current_page = self.current_page.min(pages.max(1));
        paginate(&filtered, self.current_page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, region: &str, founder: Option<&str>) -> InstitutionRecord {
        InstitutionRecord {
            id: name.to_string(),
            name: name.to_string(),
            locality: "Mjesto".to_string(),
            region: region.to_string(),
            address: String::new(),
            phones: Vec::new(),
            emails: Vec::new(),
            website: None,
            program_name: "Opća gimnazija".to_string(),
            program_offering_id: name.to_string(),
            founder_type: founder.map(str::to_string),
            duration_years: Some(4),
        }
    }

    fn directory() -> Vec<InstitutionRecord> {
        (0..25)
            .map(|i| {
                let region = if i % 2 == 0 { "Grad Zagreb" } else { "Istarska" };
                let founder = if i % 5 == 0 { Some("Privatni") } else { Some("Javni") };
                record(&format!("Škola {i}"), region, founder)
            })
            .collect()
    }

    #[test]
    fn test_filter_by_region_case_insensitive() {
        let filter = InstitutionFilter { region: Some("grad zagreb".into()), ..Default::default() };
        let records = directory();
        assert_eq!(filter.apply(&records).count(), 13);
    }

    #[test]
    fn test_filter_by_region_folds_non_ascii_capitals() {
        let filter = InstitutionFilter { region: Some("šibensko-kninska".into()), ..Default::default() };
        assert!(filter.matches(&record("Gimnazija", "Šibensko-kninska", None)));
        assert!(!filter.matches(&record("Gimnazija", "Splitsko-dalmatinska", None)));
    }

    #[test]
    fn test_filter_by_founder_type() {
        let filter = InstitutionFilter { founder_type: Some("Privatni".into()), ..Default::default() };
        let records = directory();
        assert_eq!(filter.apply(&records).count(), 5);

        let mut unknown = record("X", "Istarska", None);
        unknown.founder_type = None;
        assert!(!filter.matches(&unknown));
    }

    #[test]
    fn test_filter_text_folds_diacritics() {
        let filter = InstitutionFilter { text: Some("skola 1".into()), ..Default::default() };
        assert!(filter.matches(&record("Škola 12", "Istarska", None)));
        assert!(!filter.matches(&record("Gimnazija", "Istarska", None)));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = InstitutionFilter { text: Some("  ".into()), ..Default::default() };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&directory()).count(), 25);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let records = directory();
        let mut view = PagedView::new(10);
        view.set_page(3);
        assert_eq!(view.render(&records).current_page, 3);

        assert!(view.set_region(Some("Istarska".into())));
        assert_eq!(view.current_page(), 1);

        view.set_page(2);
        assert!(!view.set_region(Some("Istarska".into())));
        assert_eq!(view.current_page(), 2);

        assert!(view.set_text(Some("1".into())));
        assert_eq!(view.current_page(), 1);

        view.set_page(2);
        assert!(view.set_founder_type(Some("Javni".into())));
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_render_clamps_page() {
        let records = directory();
        let mut view = PagedView::new(10);
        view.set_page(9);

        let page = view.render(&records);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_render_no_matches() {
        let mut view = PagedView::new(10);
        view.set_region(Some("Nepostojeća".into()));
        let page = view.render(&directory());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
    }
}
