//! Delivery of confirmed values to the caller.

use super::StabilityFilter;

/// Caller-supplied handler for confirmed values.
pub type ScanCallback = Box<dyn FnMut(&str) + Send>;

/// A [`StabilityFilter`] bound to the caller's callback.
///
/// One reporter lives for exactly one scanning session, so the last result
/// resets whenever a new session starts.
pub struct ResultReporter {
    filter: StabilityFilter,
    callback: ScanCallback,
}

impl ResultReporter {
    pub fn new(callback: ScanCallback) -> Self {
        Self {
            filter: StabilityFilter::new(),
            callback,
        }
    }

    /// Runs one decode outcome through the filter and invokes the callback
    /// synchronously if it was confirmed. Returns whether it fired.
    pub fn report(&mut self, decoded: Option<String>) -> bool {
        match self.filter.observe(decoded) {
            Some(value) => {
                (self.callback)(value);
                true
            }
            None => false,
        }
    }

    pub fn filter(&self) -> &StabilityFilter {
        &self.filter
    }
}

impl std::fmt::Debug for ResultReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultReporter")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
