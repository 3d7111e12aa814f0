use crate::internal::common::ids::JobId;

pub struct ScopedTimer {
    method: &'static str,
    job_id: JobId,
}

impl ScopedTimer {
    pub fn new(method: &'static str, job_id: JobId) -> Self {
        tracing::info!(
            action = "measure",
            process = "matcher",
            method = method,
            job = job_id.as_num(),
            event = "start"
        );
        Self { method, job_id }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        tracing::info!(
            action = "measure",
            process = "matcher",
            method = self.method,
            job = self.job_id.as_num(),
            event = "end"
        );
    }
}

macro_rules! trace_time {
    ($method:tt, $job_id:expr, $block:expr) => {{
        let _timer = $crate::internal::common::trace::ScopedTimer::new($method, $job_id);
        $block
    }};
}
