//! Repeat-confirmation of decoded values.

/// Confirms a value once it is read twice in a row.
///
/// A value is reported on its second and every following consecutive
/// identical reading, never on its first. Absent readings leave the state
/// untouched, so `X, miss, X` still confirms `X`. A value flickering
/// `A, B, A, B` never confirms.
#[derive(Debug, Default)]
pub struct StabilityFilter {
    last_result: Option<String>,
}

impl StabilityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one decode outcome. Returns the value when it is confirmed.
    pub fn observe(&mut self, decoded: Option<String>) -> Option<&str> {
        let value = decoded?;

        if self.last_result.as_deref() == Some(value.as_str()) {
            tracing::trace!(value = %value, "reading confirmed");
            return self.last_result.as_deref();
        }

        tracing::trace!(value = %value, "new reading awaiting confirmation");
        self.last_result = Some(value);
        None
    }

    /// Most recent decoded value, confirmed or not.
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }
}
