//! Preloading image swapper.
//!
//! A [`SmartImage`] keeps its visible surface bound to the last source that
//! was confirmed fully loaded. New sources are retrieved off-screen by a
//! [`Probe`] and only swapped in once the probe reports success, so the
//! message list never shows a broken or half-loaded image and never jumps.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, trace};

use super::probe::{InstanceId, Preloader, Probe, ProbeEvent};
use crate::domain::entities::LoadEvent;

/// Attributes forwarded verbatim to the rendered surface.
pub type DisplayAttributes = BTreeMap<String, String>;

/// Callback invoked with the first genuine load event of an instance.
pub type OnLoadCallback = Box<dyn FnMut(&LoadEvent) + Send>;

/// Input properties of a smart image.
#[derive(Debug, Clone, Default)]
pub struct SmartImageProps {
    /// Source bound on mount.
    pub source: String,
    /// Alternative text for accessibility.
    pub alt_text: String,
    /// Passthrough display attributes.
    pub attributes: DisplayAttributes,
}

impl SmartImageProps {
    /// Creates props for `source` with no alt text or attributes.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Sets the alternative text.
    #[must_use]
    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = alt_text.into();
        self
    }

    /// Adds a passthrough attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// How the rendered surface is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Occupies the full width of its container.
    Block,
}

/// Snapshot of the visible surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedImage {
    /// Source bound to the surface.
    pub source: String,
    /// Alternative text.
    pub alt_text: String,
    /// Attributes forwarded from the props.
    pub attributes: DisplayAttributes,
    /// Layout of the surface; always [`DisplayMode::Block`].
    pub display: DisplayMode,
}

/// Result of a source change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRequest {
    /// Same as the last requested source; nothing changed.
    Unchanged,
    /// The source is already bound; any pending preload was dropped.
    AlreadyBound,
    /// A preload was started for the new source.
    Preloading,
}

/// Result of handling a preload completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The surface was rebound to the preloaded source.
    Swapped {
        /// Previously bound source.
        from: String,
        /// Newly bound source.
        to: String,
    },
    /// The preload failed; the surface keeps its source.
    Failed,
    /// The preload was superseded or already discarded.
    Stale,
    /// The event belongs to another instance.
    Foreign,
}

/// An image surface that swaps sources only after they are preloaded.
pub struct SmartImage {
    id: InstanceId,
    current_source: String,
    requested_source: String,
    alt_text: String,
    attributes: DisplayAttributes,
    on_load: Option<OnLoadCallback>,
    // One-shot: swaps after the first delivered load never re-notify.
    has_fired: bool,
    probe: Option<Probe>,
    next_generation: u64,
    preloader: Preloader,
}

impl std::fmt::Debug for SmartImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartImage")
            .field("id", &self.id)
            .field("current_source", &self.current_source)
            .field("requested_source", &self.requested_source)
            .field("has_fired", &self.has_fired)
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

impl SmartImage {
    /// Mounts a new instance bound to `props.source` right away.
    #[must_use]
    pub fn mount(
        props: SmartImageProps,
        on_load: Option<OnLoadCallback>,
        preloader: Preloader,
    ) -> Self {
        let id = InstanceId::new();
        debug!(instance = %id, source = %props.source, "Mounted smart image");

        Self {
            id,
            requested_source: props.source.clone(),
            current_source: props.source,
            alt_text: props.alt_text,
            attributes: props.attributes,
            on_load,
            has_fired: false,
            probe: None,
            next_generation: 0,
            preloader,
        }
    }

    /// Identifier carried by this instance's preload events.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// The source bound to the visible surface.
    #[must_use]
    pub fn current_source(&self) -> &str {
        &self.current_source
    }

    /// The source currently being preloaded, if any.
    #[must_use]
    pub fn pending_source(&self) -> Option<&str> {
        self.probe.as_ref().map(Probe::source)
    }

    /// Whether a preload is outstanding.
    #[must_use]
    pub const fn is_preloading(&self) -> bool {
        self.probe.is_some()
    }

    /// Whether the load notification has been delivered.
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.has_fired
    }

    /// Requests that the surface show `source`.
    ///
    /// Repeating the last requested source is a no-op, so a source whose
    /// preload failed is not retried.
    ///
    /// # Panics
    /// Panics if a preload must be started outside of a Tokio runtime.
    pub fn set_source(&mut self, source: impl Into<String>) -> SourceRequest {
        let source = source.into();
        if source == self.requested_source {
            return SourceRequest::Unchanged;
        }
        self.requested_source.clone_from(&source);

        if let Some(old) = self.probe.take() {
            debug!(
                instance = %self.id,
                superseded = %old.source(),
                requested = %source,
                "Superseding pending probe"
            );
        }

        if source == self.current_source {
            return SourceRequest::AlreadyBound;
        }

        self.next_generation += 1;
        self.probe = Some(self.preloader.start(self.id, self.next_generation, source));
        SourceRequest::Preloading
    }

    /// Applies a preload completion if it is still the live preload.
    pub fn handle_probe_event(&mut self, event: ProbeEvent) -> ProbeOutcome {
        if event.instance != self.id {
            return ProbeOutcome::Foreign;
        }

        let is_live = self
            .probe
            .as_ref()
            .is_some_and(|probe| probe.generation() == event.generation);
        if !is_live {
            trace!(
                instance = %self.id,
                source = %event.source,
                generation = event.generation,
                "Ignoring stale probe event"
            );
            return ProbeOutcome::Stale;
        }

        self.probe = None;

        match event.result {
            Ok(image) => {
                let from = std::mem::replace(&mut self.current_source, event.source);
                info!(
                    instance = %self.id,
                    from = %from,
                    to = %self.current_source,
                    origin = %image.origin,
                    "Swapped image source"
                );
                ProbeOutcome::Swapped {
                    from,
                    to: self.current_source.clone(),
                }
            }
            Err(e) => {
                debug!(
                    instance = %self.id,
                    source = %event.source,
                    error = %e,
                    "Preload failed; keeping current source"
                );
                ProbeOutcome::Failed
            }
        }
    }

    /// Handles the visible surface reporting that its source finished loading.
    ///
    /// The callback runs for the first bound source that loads, whether it was
    /// the mounted one or a swapped-in one. Returns true if it was invoked.
    pub fn handle_surface_load(&mut self, event: &LoadEvent) -> bool {
        if event.source != self.current_source {
            trace!(instance = %self.id, source = %event.source, "Ignoring load for unbound source");
            return false;
        }

        if self.has_fired {
            return false;
        }
        self.has_fired = true;

        if let Some(on_load) = self.on_load.as_mut() {
            on_load(event);
        }
        true
    }

    /// Returns the surface as it should be displayed now.
    #[must_use]
    pub fn render(&self) -> RenderedImage {
        RenderedImage {
            source: self.current_source.clone(),
            alt_text: self.alt_text.clone(),
            attributes: self.attributes.clone(),
            display: DisplayMode::Block,
        }
    }

    /// Unmounts the instance, discarding any pending preload.
    pub fn unmount(mut self) {
        if let Some(probe) = self.probe.take() {
            debug!(instance = %self.id, source = %probe.source(), "Discarding probe on unmount");
        }
        debug!(instance = %self.id, "Unmounted smart image");
    }
}
