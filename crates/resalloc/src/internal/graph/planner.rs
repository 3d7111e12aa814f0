use smallvec::SmallVec;

use crate::internal::common::ids::JobId;

/// Seconds on the planning timeline. Zero is "now".
pub type Timestamp = i64;

/// Amount of a vertex committed to a job during `[start, end)`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Span {
    pub job_id: JobId,
    pub start: Timestamp,
    pub end: Timestamp,
    pub amount: u64,
    /// Exclusive spans make the whole subtree unavailable to other jobs.
    pub exclusive: bool,
}

impl Span {
    #[inline]
    pub fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        self.start < end && start < self.end
    }

    #[inline]
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at < self.end
    }
}

/// Timeline of the capacity of a single vertex.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Planner {
    size: u64,
    spans: SmallVec<[Span; 2]>,
}

impl Planner {
    pub fn new(size: u64) -> Self {
        Planner {
            size,
            spans: SmallVec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn used_at(&self, at: Timestamp) -> u64 {
        self.spans
            .iter()
            .filter(|s| s.contains(at))
            .map(|s| s.amount)
            .sum()
    }

    /// Peak usage at any instant of `[start, end)`.
    ///
    /// Usage only grows at the start of a span, so it is enough to probe the window
    /// start and the starts of spans falling inside the window.
    pub fn used_during(&self, start: Timestamp, end: Timestamp) -> u64 {
        self.spans
            .iter()
            .filter(|s| s.overlaps(start, end))
            .map(|s| self.used_at(s.start.max(start)))
            .max()
            .unwrap_or(0)
    }

    #[inline]
    pub fn available_during(&self, start: Timestamp, end: Timestamp) -> u64 {
        self.size.saturating_sub(self.used_during(start, end))
    }

    #[inline]
    pub fn is_idle(&self, start: Timestamp, end: Timestamp) -> bool {
        !self.spans.iter().any(|s| s.overlaps(start, end))
    }

    #[inline]
    pub fn has_exclusive(&self, start: Timestamp, end: Timestamp) -> bool {
        self.spans
            .iter()
            .any(|s| s.exclusive && s.overlaps(start, end))
    }

    #[inline]
    pub fn has_exclusive_at(&self, at: Timestamp) -> bool {
        self.spans.iter().any(|s| s.exclusive && s.contains(at))
    }

    pub fn add_span(&mut self, span: Span) {
        debug_assert!(span.start < span.end);
        debug_assert!(span.amount <= self.available_during(span.start, span.end));
        self.spans.push(span);
    }

    /// Removes all spans of the job, returns how many were removed.
    pub fn remove_job(&mut self, job_id: JobId) -> usize {
        let count = self.spans.len();
        self.spans.retain(|s| s.job_id != job_id);
        count - self.spans.len()
    }

    pub fn end_times(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.spans.iter().map(|s| s.end)
    }

    pub fn validate(&self) {
        #[cfg(debug_assertions)]
        for span in &self.spans {
            assert!(self.used_at(span.start) <= self.size);
        }
    }
}
