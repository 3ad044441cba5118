use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owns the timer tasks for periodic jobs.
///
/// Each job gets a single dedicated task that drives a `tokio::time::interval`
/// and awaits the job future before the next tick, so two runs of the same job
/// never overlap. A run that outlasts its period delays the next tick instead
/// of stacking up.
///
/// `shutdown` aborts all job tasks; the binary calls it on ctrl-c.
pub struct Scheduler {
    jobs: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Spawn a repeating job.
    ///
    /// The first run fires immediately, then every `period`.
    pub fn spawn_repeating<F, Fut>(&mut self, name: &'static str, period: Duration, job: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                tracing::debug!(job = name, "scheduled job run starting");
                job().await;
            }
        });

        self.jobs.push(handle);
    }

    /// Cancel all scheduled jobs.
    pub fn shutdown(self) {
        for handle in self.jobs {
            handle.abort();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
