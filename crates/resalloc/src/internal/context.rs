use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime};

use crate::internal::common::Set;
use crate::internal::common::error::AllocError;
use crate::internal::common::ids::{JobId, VertexId};
use crate::internal::common::utils::format_comma_delimited;
use crate::internal::configuration::MatcherConfiguration;
use crate::internal::graph::{
    GraphDescription, ResourceGraph, Timestamp, describe_graph, describe_subgraph,
};
use crate::internal::jobspec::normalize;
use crate::internal::ledger::{JobLedger, JobRecord, JobState, MatchStatistics};
use crate::internal::matcher::{match_demands, resolve_demands};

/// Result of a successful `match_allocate`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MatchResult {
    pub reserved: bool,
    /// Claimed subgraph in the graph description format
    pub allocation: String,
    pub scheduled_at: Timestamp,
    pub overhead: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobInfo {
    pub reserved: bool,
    pub scheduled_at: Timestamp,
    pub overhead: f64,
    pub state: JobState,
    pub duration: Timestamp,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContextStats {
    pub vertices: usize,
    pub edges: usize,
    pub jobs: usize,
    pub matches: MatchStatistics,
}

struct Session {
    graph: ResourceGraph,
    ledger: JobLedger,
}

enum ContextState {
    Uninitialized,
    Ready(Box<Session>),
    Closed,
}

impl ContextState {
    fn session(&self) -> crate::Result<&Session> {
        match self {
            ContextState::Ready(session) => Ok(&**session),
            ContextState::Uninitialized => Err(AllocError::NotInitialized),
            ContextState::Closed => Err(AllocError::ContextClosed),
        }
    }

    fn session_mut(&mut self) -> crate::Result<&mut Session> {
        match self {
            ContextState::Ready(session) => Ok(&mut **session),
            ContextState::Uninitialized => Err(AllocError::NotInitialized),
            ContextState::Closed => Err(AllocError::ContextClosed),
        }
    }
}

/// One resource graph together with the jobs placed on it.
///
/// Mutating operations take the write lock for their whole duration, queries take
/// the read lock. A failed operation leaves the graph and the jobs untouched.
pub struct Context {
    configuration: MatcherConfiguration,
    state: RwLock<ContextState>,
}

impl Default for Context {
    fn default() -> Self {
        Self::with_configuration(MatcherConfiguration::default())
    }
}

impl Context {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn with_configuration(configuration: MatcherConfiguration) -> Self {
        Context {
            configuration,
            state: RwLock::new(ContextState::Uninitialized),
        }
    }

    #[inline]
    pub fn configuration(&self) -> &MatcherConfiguration {
        &self.configuration
    }

    /// Loads the resource graph. Can succeed only once per context.
    pub fn initialize(&self, graph_description: &str) -> crate::Result<()> {
        let mut state = self.state.write();
        match *state {
            ContextState::Uninitialized => {}
            ContextState::Ready(_) => return Err(AllocError::AlreadyInitialized),
            ContextState::Closed => return Err(AllocError::ContextClosed),
        }
        let graph = GraphDescription::parse(graph_description)?.into_graph()?;
        log::debug!(
            "Context initialized with {} vertices, policy {:?}",
            graph.n_vertices(),
            self.configuration.policy
        );
        *state = ContextState::Ready(Box::new(Session {
            graph,
            ledger: JobLedger::default(),
        }));
        Ok(())
    }

    /// Allocates resources for the job now or, if that is impossible and
    /// `or_else_reserve` is set, reserves them at the earliest moment they become free.
    pub fn match_allocate(
        &self,
        or_else_reserve: bool,
        jobspec: &str,
        job_id: JobId,
    ) -> crate::Result<MatchResult> {
        let started = Instant::now();
        let mut state = self.state.write();
        let session = state.session_mut()?;
        if session.ledger.contains(job_id) {
            return Err(AllocError::DuplicateJobId(job_id));
        }

        let jobspec = normalize(jobspec)?;
        let demands = resolve_demands(&jobspec.resources, session.graph.types())?;
        let duration = jobspec
            .duration
            .map(|d| d.min(Timestamp::MAX as u64) as Timestamp)
            .unwrap_or_else(|| self.configuration.default_duration_secs());

        let outcome = trace_time!("match_allocate", job_id, {
            match_demands(
                &session.graph,
                &self.configuration,
                &demands,
                duration,
                or_else_reserve,
            )
        })?;
        let artifact = describe_subgraph(&session.graph, &outcome.claims)?;

        let graph = &mut session.graph;
        graph.commit(
            job_id,
            &outcome.claims,
            outcome.start,
            outcome.start + duration,
        );
        let vertices: Set<VertexId> = outcome
            .claims
            .iter()
            .filter(|c| c.amount > 0)
            .map(|c| graph.vertex(c.vertex).id())
            .collect();
        let mut vertices: Vec<VertexId> = vertices.into_iter().collect();
        vertices.sort_unstable();

        let overhead = started.elapsed().as_secs_f64();
        log::debug!(
            "Job {job_id} {} at {} for {duration}s on vertices {} ({} visits)",
            if outcome.reserved {
                "reserved"
            } else {
                "allocated"
            },
            outcome.start,
            format_comma_delimited(&vertices),
            outcome.visits
        );
        session.ledger.insert(JobRecord {
            job_id,
            state: if outcome.reserved {
                JobState::Reserved
            } else {
                JobState::Allocated
            },
            scheduled_at: outcome.start,
            duration,
            overhead,
            vertices,
            artifact: artifact.clone(),
            created: SystemTime::now(),
        })?;

        Ok(MatchResult {
            reserved: outcome.reserved,
            allocation: artifact,
            scheduled_at: outcome.start,
            overhead,
        })
    }

    pub fn info(&self, job_id: JobId) -> crate::Result<JobInfo> {
        let state = self.state.read();
        let record = state.session()?.ledger.get(job_id)?;
        Ok(JobInfo {
            reserved: record.is_reserved(),
            scheduled_at: record.scheduled_at,
            overhead: record.overhead,
            state: record.state,
            duration: record.duration,
        })
    }

    /// Removes the job and frees everything it holds.
    /// A missing job is an error unless `noent_ok` is set.
    pub fn cancel(&self, job_id: JobId, noent_ok: bool) -> crate::Result<()> {
        let mut state = self.state.write();
        let session = state.session_mut()?;
        match session.ledger.remove(job_id) {
            Some(record) => {
                let removed = session.graph.release(job_id, &record.vertices);
                log::debug!("Job {job_id} canceled, {removed} spans released");
                Ok(())
            }
            None if noent_ok => Ok(()),
            None => Err(AllocError::UnknownJobId(job_id)),
        }
    }

    /// Drops the graph and all jobs. Every later operation fails with `ContextClosed`.
    pub fn destroy(&self) {
        let mut state = self.state.write();
        if let ContextState::Ready(session) = std::mem::replace(&mut *state, ContextState::Closed)
        {
            if !session.ledger.is_empty() {
                log::debug!(
                    "Context destroyed with active jobs: {}",
                    format_comma_delimited(session.ledger.job_ids())
                );
            }
        }
    }

    /// The whole graph in the description format accepted by `initialize`.
    pub fn describe(&self) -> crate::Result<String> {
        let state = self.state.read();
        describe_graph(&state.session()?.graph)
    }

    pub fn stat(&self) -> crate::Result<ContextStats> {
        let state = self.state.read();
        let session = state.session()?;
        Ok(ContextStats {
            vertices: session.graph.n_vertices(),
            edges: session.graph.n_edges(),
            jobs: session.ledger.len(),
            matches: session.ledger.statistics().clone(),
        })
    }

    /// Free units of a resource type at the instant `at`.
    pub fn available(&self, resource_type: &str, at: Timestamp) -> crate::Result<u64> {
        let state = self.state.read();
        let graph = &state.session()?.graph;
        let Some(type_id) = graph.types().get_index(resource_type) else {
            return Err(AllocError::UnknownResourceType(resource_type.to_string()));
        };
        Ok(graph.available(type_id, at))
    }

    /// Allocation artifact of an active job.
    pub fn allocation(&self, job_id: JobId) -> crate::Result<String> {
        let state = self.state.read();
        Ok(state.session()?.ledger.get(job_id)?.artifact.clone())
    }

    #[cfg(test)]
    pub(crate) fn with_graph<R>(&self, f: impl FnOnce(&ResourceGraph) -> R) -> R {
        let state = self.state.read();
        match state.session() {
            Ok(session) => f(&session.graph),
            Err(e) => panic!("Graph is not available: {e}"),
        }
    }
}
