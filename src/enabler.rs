//! Reconciles the radio toggle with the hardware-confirmed interface state.
//!
//! The enabler never shows a requested state optimistically: a user request
//! only disables the control and issues the command, the control follows once
//! the interface reports the outcome. Events reach the enabler through a
//! single-consumer queue opened on `activate` and dropped on `deactivate`.

use crate::{
    config::EnablerConfig,
    dependency::DependencyResolver,
    interface_status_source::InterfaceStatusSource,
    properties::PropertyStore,
    surface::ControlSurface,
    types::{ConnectivityState, EnablementState, StatusEvent},
};
use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};

pub struct RadioEnabler<I, S, D, P> {
    source: I,
    surface: S,
    resolver: D,
    properties: P,
    config: EnablerConfig,
    supported: bool,
    original_label: Option<String>,
    enable_requested: bool,
    events: Option<UnboundedReceiver<StatusEvent>>,
}

impl<I, S, D, P> RadioEnabler<I, S, D, P>
where
    I: InterfaceStatusSource,
    S: ControlSurface,
    D: DependencyResolver,
    P: PropertyStore,
{
    /// Bind an enabler to `surface`
    ///
    /// On a device without the radio feature the enabler is inert and the
    /// surface is left untouched.
    pub fn new(
        source: I,
        mut surface: S,
        resolver: D,
        properties: P,
        config: EnablerConfig,
    ) -> Self {
        let supported = source.is_supported();

        let original_label = if supported {
            surface.set_persistent(false);
            Some(surface.original_label())
        } else {
            info!("radio not supported on this device");
            None
        };

        Self {
            source,
            surface,
            resolver,
            properties,
            config,
            supported,
            original_label,
            enable_requested: false,
            events: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_active(&self) -> bool {
        self.events.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn properties(&self) -> &P {
        &self.properties
    }

    pub fn resolver_mut(&mut self) -> &mut D {
        &mut self.resolver
    }

    /// Start reflecting the interface on the surface
    pub fn activate(&mut self) {
        if !self.supported {
            return;
        }

        if self.is_active() {
            debug!("activate: already active");
            return;
        }

        let state = self.source.query_state();
        debug!("activate: interface is {state}");

        self.surface.set_enabled(state.is_interactive());

        let (tx, rx) = mpsc::unbounded_channel();

        if let Err(e) = self.source.subscribe(tx) {
            error!("failed to subscribe to interface status: {e:#}");
            return;
        }

        self.events = Some(rx);
        self.surface.set_request_handler(true);
    }

    /// Stop reflecting the interface
    ///
    /// Events still queued or sent afterwards never reach the surface.
    pub fn deactivate(&mut self) {
        if !self.supported {
            return;
        }

        let Some(mut events) = self.events.take() else {
            debug!("deactivate: not active");
            return;
        };

        self.source.unsubscribe();
        self.surface.set_request_handler(false);

        events.close();
        let mut discarded = 0;
        while events.try_recv().is_ok() {
            discarded += 1;
        }

        if discarded > 0 {
            debug!("deactivate: discarded {discarded} pending events");
        }
    }

    /// Handle a user flip of the control
    ///
    /// Always returns `true`: the surface must not apply `requested` itself,
    /// the checked state only follows confirmed interface state.
    pub fn on_user_request(&mut self, requested: bool) -> bool {
        if !self.is_active() {
            warn!("ignoring user request ({requested}) while inactive");
            return true;
        }

        self.surface.set_enabled(false);

        let accepted = self.source.request_enabled(requested);

        if requested && !self.enable_requested {
            debug!("first enable request, applying radio properties");
            self.enable_requested = true;
            self.apply_first_enable_properties();
        } else if requested {
            debug!("repeated enable request");
        } else {
            self.source
                .set_indicator_visibility(&self.config.indicator_id, false);
        }

        info!("request_enabled({requested}) returned {accepted}");

        if !accepted {
            self.surface
                .set_status_text(Some(self.config.messages.command_failed(requested)));
        }

        true
    }

    /// Ask the radio to scan again, only honored while it is enabled
    pub fn request_rescan(&mut self) -> bool {
        if !self.is_active() || self.source.query_state() != EnablementState::Enabled {
            debug!("rescan ignored: radio not enabled");
            return false;
        }

        let accepted = self.source.rescan();
        info!("rescan returned {accepted}");
        accepted
    }

    pub fn handle_event(&mut self, event: StatusEvent) {
        if !self.is_active() {
            debug!("dropping {event:?}: not active");
            return;
        }

        match event {
            StatusEvent::EnablementChanged { current, previous } => {
                self.handle_enablement_changed(current, previous)
            }
            StatusEvent::ConnectivityChanged(state) => self.handle_connectivity_changed(state),
        }
    }

    /// Handle every queued event in delivery order
    ///
    /// Returns the number of events handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;

        loop {
            let Some(events) = self.events.as_mut() else {
                break;
            };

            match events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        handled
    }

    /// Wait for the next queued event
    ///
    /// Returns `None` if the enabler is inactive or the source dropped its sink.
    pub async fn next_event(&mut self) -> Option<StatusEvent> {
        self.events.as_mut()?.recv().await
    }

    fn handle_enablement_changed(&mut self, current: EnablementState, previous: EnablementState) {
        debug!("interface status changed from {previous} to {current}");

        match current {
            EnablementState::Disabled | EnablementState::Enabled => {
                let enabled = current == EnablementState::Enabled;

                self.surface.set_checked(enabled);

                if enabled {
                    self.surface.set_status_text(None);
                } else {
                    self.surface.set_status_text(self.original_label.as_deref());
                }

                let veto = self.dependency_veto();
                self.surface.set_enabled(!veto);

                if !enabled {
                    self.source.release_connectivity();
                }
            }
            EnablementState::Enabling => {
                self.surface
                    .set_status_text(Some(&self.config.messages.starting));
            }
            EnablementState::Disabling => {
                self.surface
                    .set_status_text(Some(&self.config.messages.stopping));
            }
            EnablementState::Unknown => {
                let messages = &self.config.messages;
                let message = match previous {
                    EnablementState::Enabling => &messages.failed_to_start,
                    EnablementState::Disabling => &messages.failed_to_stop,
                    _ => &messages.generic_error,
                };

                self.surface.set_checked(false);
                self.surface.set_status_text(Some(message));
                self.surface.set_enabled(true);
            }
        }
    }

    fn handle_connectivity_changed(&mut self, state: ConnectivityState) {
        debug!("connectivity changed to {state:?}");

        if self.source.query_state() != EnablementState::Enabled {
            debug!("dropping connectivity change: radio not enabled");
            return;
        }

        self.surface
            .set_status_text(self.config.messages.caption(state));
    }

    /// Whether the control this one depends on forces it disabled
    fn dependency_veto(&self) -> bool {
        let Some(key) = self.surface.dependency_key().filter(|key| !key.is_empty()) else {
            return false;
        };

        match self.resolver.resolve_veto(&key) {
            Some(veto) => veto,
            None => {
                debug!("dependency {key} not found");
                false
            }
        }
    }

    fn apply_first_enable_properties(&mut self) {
        for property in &self.config.first_enable_properties {
            info!("set {}={}", property.key, property.value);

            if let Err(e) = self.properties.set(&property.key, &property.value) {
                error!("failed to set {}: {e:#}", property.key);
            }
        }
    }
}
