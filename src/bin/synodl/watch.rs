use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use synodl::client::DownloadStation;
use synodl::utils::format_task_table;

const POLL_STEP: Duration = Duration::from_millis(100);

/// Prints the task table again and again until `stop` is set
pub struct ProgressWatcher<'a> {
    synods: &'a DownloadStation,
    interval: Duration,
    stop: &'a AtomicBool,
}

impl<'a> ProgressWatcher<'a> {
    pub fn new(synods: &'a DownloadStation, interval: Duration, stop: &'a AtomicBool) -> Self {
        Self {
            synods,
            interval,
            stop,
        }
    }

    pub fn start(&self) -> Result<()> {
        while !self.stopped() {
            self.update()?;
            self.wait();
        }
        Ok(())
    }

    fn update(&self) -> Result<()> {
        let tasks = self.synods.list()?;
        println!("{}", format_task_table(&tasks.tasks));
        Ok(())
    }

    /// Sleeps for the interval, waking up early on stop
    fn wait(&self) {
        let started = Instant::now();
        while !self.stopped() && started.elapsed() < self.interval {
            thread::sleep(POLL_STEP.min(self.interval));
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}
