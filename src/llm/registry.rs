use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Result, bail};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, info, warn};

use super::backend::{Capability, ModelBackend};

/// `(loaded_so_far, total, model_name)`, called once per capability that
/// finished loading.
pub type ProgressFn = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

type LoadFuture = Shared<BoxFuture<'static, ()>>;

#[derive(Default)]
struct Readiness {
    flags: [AtomicBool; 3],
}

impl Readiness {
    fn get(&self, capability: Capability) -> bool {
        self.flags[capability.index()].load(Ordering::Acquire)
    }

    fn set(&self, capability: Capability) {
        self.flags[capability.index()].store(true, Ordering::Release);
    }
}

/// Owns a model backend and tracks which of its capabilities are ready.
///
/// Loading is memoized: callers that arrive while a load is running wait on
/// that same load instead of starting another, and capabilities that are
/// already ready are never loaded again. A capability that fails to load is
/// logged and left not ready; the next [`ModelRegistry::load`] retries it.
pub struct ModelRegistry {
    backend: Arc<dyn ModelBackend>,
    readiness: Arc<Readiness>,
    in_flight: Mutex<Option<LoadFuture>>,
}

impl ModelRegistry {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            readiness: Arc::new(Readiness::default()),
            in_flight: Mutex::new(None),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn is_ready(&self, capability: Capability) -> bool {
        self.readiness.get(capability)
    }

    pub fn all_ready(&self) -> bool {
        Capability::ALL.iter().all(|c| self.is_ready(*c))
    }

    pub fn ready_capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.is_ready(*c))
            .collect()
    }

    /// Loads every capability that is not ready yet. Never fails: check the
    /// readiness flags afterwards to see what succeeded.
    pub async fn load(&self, on_progress: Option<ProgressFn>) {
        if self.all_ready() {
            debug!("models already loaded, skipping reload");
            return;
        }

        self.join_or_start_load(on_progress).await;
        self.clear_finished_load();
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        if !self.is_ready(Capability::Summarization) {
            bail!("{} is not loaded", Capability::Summarization);
        }
        self.backend.summarize(text).await
    }

    fn join_or_start_load(&self, on_progress: Option<ProgressFn>) -> LoadFuture {
        let mut slot = self.lock_in_flight();
        // join only while the load is still running
        if let Some(load) = slot.as_ref()
            && load.peek().is_none()
        {
            debug!("joining in-flight model load");
            return load.clone();
        }

        let load = load_capabilities(
            Arc::clone(&self.backend),
            Arc::clone(&self.readiness),
            on_progress,
        )
        .boxed()
        .shared();
        *slot = Some(load.clone());
        load
    }

    fn clear_finished_load(&self) {
        let mut slot = self.lock_in_flight();
        if slot.as_ref().is_some_and(|load| load.peek().is_some()) {
            *slot = None;
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<LoadFuture>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

async fn load_capabilities(
    backend: Arc<dyn ModelBackend>,
    readiness: Arc<Readiness>,
    on_progress: Option<ProgressFn>,
) {
    let total = Capability::ALL.len();
    let mut loaded = 0;

    for capability in Capability::ALL {
        if readiness.get(capability) {
            continue;
        }
        match backend.load(capability).await {
            Ok(()) => {
                readiness.set(capability);
                loaded += 1;
                info!(backend = backend.name(), "{capability} loaded");
                if let Some(report) = &on_progress {
                    report(loaded, total, capability.display_name());
                }
            }
            Err(err) => {
                warn!(backend = backend.name(), "{capability} load failed: {err:#}");
            }
        }
    }
}
