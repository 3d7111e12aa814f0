use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

use crate::internal::common::Map;
use crate::internal::common::error::AllocError;
use crate::internal::common::ids::{JobId, VertexId};
use crate::internal::graph::Timestamp;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum JobState {
    Allocated,
    Reserved,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Allocated => "allocated",
            JobState::Reserved => "reserved",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: JobId,
    pub state: JobState,
    pub scheduled_at: Timestamp,
    pub duration: Timestamp,
    /// Seconds spent in the matching call that created this record
    pub overhead: f64,
    /// Vertices holding a span of this job
    pub vertices: Vec<VertexId>,
    /// Serialized subgraph of the allocation
    pub artifact: String,
    pub created: SystemTime,
}

impl JobRecord {
    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.state == JobState::Reserved
    }
}

/// Overheads of successful matches.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MatchStatistics {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub accum: f64,
    pub last: f64,
}

impl MatchStatistics {
    pub fn record(&mut self, overhead: f64) {
        if self.count == 0 {
            self.min = overhead;
            self.max = overhead;
        } else {
            self.min = self.min.min(overhead);
            self.max = self.max.max(overhead);
        }
        self.count += 1;
        self.accum += overhead;
        self.last = overhead;
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.accum / self.count as f64
        }
    }
}

#[derive(Default, Debug)]
pub struct JobLedger {
    jobs: Map<JobId, JobRecord>,
    statistics: MatchStatistics,
}

impl JobLedger {
    #[inline]
    pub fn contains(&self, job_id: JobId) -> bool {
        self.jobs.contains_key(&job_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, job_id: JobId) -> crate::Result<&JobRecord> {
        self.jobs
            .get(&job_id)
            .ok_or(AllocError::UnknownJobId(job_id))
    }

    pub fn insert(&mut self, record: JobRecord) -> crate::Result<()> {
        if self.jobs.contains_key(&record.job_id) {
            return Err(AllocError::DuplicateJobId(record.job_id));
        }
        self.statistics.record(record.overhead);
        self.jobs.insert(record.job_id, record);
        Ok(())
    }

    pub fn remove(&mut self, job_id: JobId) -> Option<JobRecord> {
        self.jobs.remove(&job_id)
    }

    /// Active job ids in ascending order.
    pub fn job_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.jobs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[inline]
    pub fn statistics(&self) -> &MatchStatistics {
        &self.statistics
    }
}
