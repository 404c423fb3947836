//! Incremental reveal ("load more") over a derived product view.

use super::FilterSpec;
use crate::logging::log_page_advanced;

/// Visible-count cursor. Grows by one page per request while items remain,
/// and snaps back to the first page whenever the filter inputs change.
#[derive(Debug, Clone)]
pub struct Pager {
    page_size: usize,
    visible: usize,
    last_spec: Option<FilterSpec>,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            visible: page_size,
            last_spec: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// Advance by one page if more items remain. Returns whether it advanced.
    pub fn request_more(&mut self, total: usize) -> bool {
        if !self.has_more(total) {
            return false;
        }
        self.visible += self.page_size;
        log_page_advanced(self.visible, total);
        true
    }

    pub fn reset(&mut self) {
        self.visible = self.page_size;
    }

    /// Reset to the first page if `spec` differs from the last one seen.
    /// Returns whether a reset happened.
    pub fn sync(&mut self, spec: &FilterSpec) -> bool {
        if self.last_spec.as_ref() == Some(spec) {
            return false;
        }
        let first = self.last_spec.is_none();
        self.last_spec = Some(spec.clone());
        self.reset();
        !first
    }

    /// The currently revealed prefix of `view`.
    pub fn visible<'a, T>(&self, view: &'a [T]) -> &'a [T] {
        &view[..self.visible.min(view.len())]
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(12)
    }
}
