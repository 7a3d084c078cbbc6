//! Off-screen preload probes.
//!
//! A [`Probe`] is the handle to one background retrieval started by a
//! [`Preloader`]. Completion is reported as a [`ProbeEvent`] on the shared
//! event channel, unless the handle was dropped first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::domain::entities::{LoadEvent, LoadedImage};
use crate::domain::ports::{FetchResult, ImageFetcherPort};

/// Identifies one mounted image instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Creates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message sent when a preload finishes retrieving its source.
#[derive(Debug, Clone)]
pub struct ProbeEvent {
    pub(crate) instance: InstanceId,
    pub(crate) generation: u64,
    pub(crate) source: String,
    pub(crate) result: FetchResult<LoadedImage>,
}

impl ProbeEvent {
    /// The instance that started the preload.
    #[must_use]
    pub const fn instance(&self) -> InstanceId {
        self.instance
    }

    /// The source the preload was bound to.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the preload retrieved its source.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The load event the surface reports once it shows this source.
    #[must_use]
    pub fn load_event(&self) -> Option<LoadEvent> {
        self.result.as_ref().ok().map(LoadedImage::to_load_event)
    }
}

/// Handle to an in-flight preload.
///
/// Dropping the handle detaches the preload: its result is discarded and no
/// event is sent. The retrieval itself is left to finish in the background.
#[derive(Debug)]
pub struct Probe {
    generation: u64,
    source: String,
    attached: Arc<AtomicBool>,
}

impl Probe {
    /// Sequence number distinguishing this preload from earlier ones of the same instance.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The candidate source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        if self.attached.swap(false, Ordering::AcqRel) {
            trace!(source = %self.source, generation = self.generation, "Probe detached");
        }
    }
}

/// Starts preloads and routes their completions to the owning event loop.
#[derive(Clone)]
pub struct Preloader {
    fetcher: Arc<dyn ImageFetcherPort>,
    event_tx: mpsc::UnboundedSender<ProbeEvent>,
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader").finish_non_exhaustive()
    }
}

impl Preloader {
    /// Creates a preloader that reports completions on `event_tx`.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ImageFetcherPort>,
        event_tx: &mpsc::UnboundedSender<ProbeEvent>,
    ) -> Self {
        Self {
            fetcher,
            event_tx: event_tx.clone(),
        }
    }

    /// Starts retrieving `source` in the background.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub(crate) fn start(&self, instance: InstanceId, generation: u64, source: String) -> Probe {
        let attached = Arc::new(AtomicBool::new(true));

        let fetcher = self.fetcher.clone();
        let event_tx = self.event_tx.clone();
        let task_attached = attached.clone();
        let task_source = source.clone();

        tokio::spawn(async move {
            let result = fetcher.fetch(&task_source).await;

            if !task_attached.load(Ordering::Acquire) {
                trace!(source = %task_source, generation, "Discarding detached probe result");
                return;
            }

            let event = ProbeEvent {
                instance,
                generation,
                source: task_source,
                result,
            };
            if event_tx.send(event).is_err() {
                debug!(instance = %instance, "Probe event receiver closed");
            }
        });

        debug!(instance = %instance, source = %source, generation, "Probe started");

        Probe {
            generation,
            source,
            attached,
        }
    }
}
