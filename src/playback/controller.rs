//! Lifecycle of one embedded player.
//!
//! A controller is `Playing` exactly while its embed is mounted. It starts
//! only on explicit activation, and stops when another controller on the same
//! bus announces itself or when its container leaves the viewport. Stopping
//! always unmounts: third-party embeds have no pause control we can trust.

use super::bus::{PlaybackBus, Subscription};
use super::embed::{EmbedRequest, EmbedSource, EmbedTemplate};
use super::identity::InstanceId;
use super::viewport::{Observation, ViewportObserver, VisibilityCallback, VisibilityThreshold};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Mount/unmount capability for the opaque embed.
pub trait EmbedHost: 'static {
    type Handle: 'static;

    fn mount(&self, source: &EmbedSource) -> Self::Handle;
    fn unmount(&self, handle: Self::Handle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Yielded(InstanceId),
    LeftViewport,
    TornDown,
}

struct Mounted<Handle> {
    source: EmbedSource,
    handle: Handle,
}

struct ControllerInner<H: EmbedHost> {
    host: H,
    template: EmbedTemplate,
    threshold: VisibilityThreshold,
    mounted: Option<Mounted<H::Handle>>,
    subscription: Option<Subscription>,
    observation: Option<Observation>,
    torn_down: bool,
}

/// Drives one embed and keeps it from playing alongside its siblings.
///
/// Clones share state. Dropping the last clone releases the bus subscription
/// and the viewport watcher; call [`MediaController::teardown`] to also
/// unmount through the host.
pub struct MediaController<H: EmbedHost> {
    id: InstanceId,
    bus: PlaybackBus,
    inner: Rc<RefCell<ControllerInner<H>>>,
}

impl<H: EmbedHost> Clone for MediaController<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            bus: self.bus.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<H: EmbedHost> PartialEq for MediaController<H> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<H: EmbedHost> MediaController<H> {
    pub fn new(
        bus: &PlaybackBus,
        host: H,
        template: EmbedTemplate,
        threshold: VisibilityThreshold,
    ) -> Self {
        let id = InstanceId::next();
        let inner = Rc::new(RefCell::new(ControllerInner {
            host,
            template,
            threshold,
            mounted: None,
            subscription: None,
            observation: None,
            torn_down: false,
        }));

        let weak = Rc::downgrade(&inner);
        let subscription = bus.subscribe(move |announced| {
            if announced == id {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                stop(&inner, id, StopReason::Yielded(announced));
            }
        });
        inner.borrow_mut().subscription = Some(subscription);

        Self {
            id,
            bus: bus.clone(),
            inner,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn state(&self) -> PlaybackState {
        if self.inner.borrow().mounted.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn current_source(&self) -> Option<EmbedSource> {
        self.inner
            .borrow()
            .mounted
            .as_ref()
            .map(|mounted| mounted.source.clone())
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.borrow().torn_down
    }

    /// User asked to play. Returns whether the controller is now `Playing`.
    ///
    /// A request without a content id leaves the controller `Idle` and
    /// announces nothing.
    pub fn activate(&self, request: &EmbedRequest) -> bool {
        let source = {
            let inner = self.inner.borrow();
            if inner.torn_down {
                return false;
            }
            match inner.template.build(request) {
                Some(source) => source,
                None => {
                    debug!(id = %self.id, "embed request has no content id; staying idle");
                    return false;
                }
            }
        };

        // Siblings stop before we mount. Our own listener ignores our id.
        self.bus.announce(self.id);

        let mut inner = self.inner.borrow_mut();
        if inner.torn_down {
            return false;
        }
        if let Some(current) = inner.mounted.as_ref() {
            if current.source == source {
                return true;
            }
        }

        if let Some(previous) = inner.mounted.take() {
            debug!(id = %self.id, from = %previous.source, to = %source, "remounting embed");
            inner.host.unmount(previous.handle);
        }
        let handle = inner.host.mount(&source);
        debug!(id = %self.id, %source, "embed mounted");
        inner.mounted = Some(Mounted { source, handle });
        true
    }

    /// Visibility report for the container. Only ever stops playback.
    pub fn handle_visibility(&self, visible: bool) {
        if !visible {
            stop(&self.inner, self.id, StopReason::LeftViewport);
        }
    }

    /// Register the single viewport watcher for this controller.
    ///
    /// Returns false when a watcher is already registered, the controller is
    /// torn down, or the runtime cannot observe visibility. In the last case
    /// the controller keeps working without stop-on-exit.
    pub fn watch_viewport(&self, observer: &dyn ViewportObserver) -> bool {
        let threshold = {
            let inner = self.inner.borrow();
            if inner.torn_down || inner.observation.is_some() {
                return false;
            }
            inner.threshold
        };

        let weak = Rc::downgrade(&self.inner);
        let id = self.id;
        let on_change: VisibilityCallback = Rc::new(move |visible| {
            if visible {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                stop(&inner, id, StopReason::LeftViewport);
            }
        });

        match observer.observe(threshold, on_change) {
            Some(observation) => {
                self.inner.borrow_mut().observation = Some(observation);
                true
            }
            None => {
                debug!(id = %self.id, "viewport observer unavailable; stop-on-exit disabled");
                false
            }
        }
    }

    /// Release the subscription and watcher and unmount. Safe to call twice.
    pub fn teardown(&self) {
        let (subscription, observation) = {
            let mut inner = self.inner.borrow_mut();
            if inner.torn_down {
                return;
            }
            inner.torn_down = true;
            (inner.subscription.take(), inner.observation.take())
        };
        drop(subscription);
        drop(observation);
        stop(&self.inner, self.id, StopReason::TornDown);
    }
}

fn stop<H: EmbedHost>(inner: &RefCell<ControllerInner<H>>, id: InstanceId, reason: StopReason) {
    let Some(mounted) = inner.borrow_mut().mounted.take() else {
        return;
    };
    debug!(%id, ?reason, source = %mounted.source, "embed unmounted");
    inner.borrow().host.unmount(mounted.handle);
}
