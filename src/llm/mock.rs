//! In-memory backend for exercising the registry and synthesizer.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::backend::{Capability, ModelBackend};

pub struct MockBackend {
    summary: String,
    failing: Mutex<HashSet<Capability>>,
    fail_summarize: Mutex<bool>,
    load_calls: Mutex<HashMap<Capability, usize>>,
    summarize_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            failing: Mutex::new(HashSet::new()),
            fail_summarize: Mutex::new(false),
            load_calls: Mutex::new(HashMap::new()),
            summarize_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, capability: Capability, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(capability);
        } else {
            set.remove(&capability);
        }
    }

    pub fn set_summarize_failing(&self, failing: bool) {
        *self.fail_summarize.lock().unwrap() = failing;
    }

    pub fn load_calls(&self, capability: Capability) -> usize {
        self.load_calls
            .lock()
            .unwrap()
            .get(&capability)
            .copied()
            .unwrap_or(0)
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load(&self, capability: Capability) -> Result<()> {
        *self.load_calls.lock().unwrap().entry(capability).or_insert(0) += 1;
        // let concurrent callers interleave
        tokio::task::yield_now().await;
        if self.failing.lock().unwrap().contains(&capability) {
            bail!("{capability} weights unavailable");
        }
        Ok(())
    }

    async fn summarize(&self, _text: &str) -> Result<String> {
        self.summarize_calls.fetch_add(1, Ordering::Relaxed);
        if *self.fail_summarize.lock().unwrap() {
            bail!("inference timed out");
        }
        Ok(self.summary.clone())
    }
}
