use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::errors::Result;

/// When a job should next run.
///
/// Only the two trigger shapes the bot needs exist; there is no cron DSL.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Fixed delay between scheduled fire instants.
    Interval(Duration),
    /// Once per day at a wall-clock time in the given timezone.
    Daily { time: NaiveTime, tz: Tz },
}

impl Trigger {
    /// Next scheduled fire instant strictly after `after`.
    pub fn next_fire(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Trigger::Interval(every) => {
                let step = ChronoDuration::from_std(*every)
                    .unwrap_or_else(|_| ChronoDuration::seconds(300));
                after + step
            }
            Trigger::Daily { time, tz } => {
                let mut date = after.with_timezone(tz).date_naive();
                // A DST gap can swallow the wall-clock time on one day, so
                // probe a few days forward.
                for _ in 0..3 {
                    if let Some(fire) = daily_fire_on(date, *time, *tz) {
                        if fire > after {
                            return fire;
                        }
                    }
                    date = date.succ_opt().unwrap_or(date);
                }
                after + ChronoDuration::days(1)
            }
        }
    }
}

fn daily_fire_on(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether an occurrence scheduled at `scheduled` may still run at `now`.
///
/// Within the grace window a late occurrence runs once; beyond it the
/// occurrence is skipped outright, never queued.
pub fn within_grace(scheduled: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> bool {
    match (now - scheduled).to_std() {
        Ok(lateness) => lateness <= grace,
        // Woke up early; the occurrence is still ahead of us.
        Err(_) => true,
    }
}

type JobFn = Box<dyn Fn(Arc<AppContext>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

struct Job {
    name: &'static str,
    trigger: Trigger,
    misfire_grace: Duration,
    run: JobFn,
}

/// Minimal time-driven job runner.
///
/// Each registered job gets its own task; the loop awaits the job body, so
/// two runs of the same job can never overlap, while distinct jobs run
/// concurrently. A failing job body is logged at the boundary and the job
/// stays scheduled.
pub struct JobRunner {
    ctx: Arc<AppContext>,
    jobs: Vec<Job>,
}

impl JobRunner {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            jobs: Vec::new(),
        }
    }

    pub fn register<F, Fut>(&mut self, name: &'static str, trigger: Trigger, misfire_grace: Duration, job: F)
    where
        F: Fn(Arc<AppContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.jobs.push(Job {
            name,
            trigger,
            misfire_grace,
            run: Box::new(move |ctx| Box::pin(job(ctx))),
        });
    }

    /// Spawns every registered job and returns their task handles.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        let JobRunner { ctx, jobs } = self;
        jobs.into_iter()
            .map(|job| {
                let ctx = ctx.clone();
                tokio::spawn(run_job(ctx, job))
            })
            .collect()
    }
}

async fn run_job(ctx: Arc<AppContext>, job: Job) {
    info!("⏰ Scheduled job '{}'", job.name);
    let mut scheduled = job.trigger.next_fire(Utc::now());

    loop {
        let now = Utc::now();
        if scheduled > now {
            let wait = (scheduled - now).to_std().unwrap_or(Duration::ZERO);
            sleep(wait).await;
        }

        if within_grace(scheduled, Utc::now(), job.misfire_grace) {
            debug!("⏰ Running job '{}'", job.name);
            if let Err(e) = (job.run)(ctx.clone()).await {
                error!("⏰ Job '{}' failed: {:#}", job.name, e);
            }
        } else {
            warn!(
                "⏰ Job '{}' missed its {} slot beyond the grace window, skipping",
                job.name, scheduled
            );
        }

        // Advance, dropping any occurrences that are already unrecoverable
        // after a long stall.
        scheduled = job.trigger.next_fire(scheduled);
        let now = Utc::now();
        while !within_grace(scheduled, now, job.misfire_grace) {
            debug!("⏰ Job '{}' dropping stale occurrence at {}", job.name, scheduled);
            scheduled = job.trigger.next_fire(scheduled);
        }
    }
}
