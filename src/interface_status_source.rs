use crate::types::{EnablementState, StatusEvent};
use anyhow::Result;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use tokio::sync::mpsc::UnboundedSender;

/// Producer half of an enabler's event queue handed to the status source.
pub type EventSink = UnboundedSender<StatusEvent>;

/// Platform service owning the radio.
///
/// Commands are fire-and-forget: `request_enabled` only reports whether the
/// request was accepted, completion arrives later as `StatusEvent`s on the
/// subscribed sink.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait InterfaceStatusSource {
    /// Whether the radio feature is present on this device
    fn is_supported(&self) -> bool;

    fn query_state(&self) -> EnablementState;

    /// Request the radio to be turned on or off
    fn request_enabled(&mut self, enabled: bool) -> bool;

    /// Deliver enablement and connectivity changes to `sink` until `unsubscribe`
    fn subscribe(&mut self, sink: EventSink) -> Result<()>;

    fn unsubscribe(&mut self);

    fn set_indicator_visibility(&mut self, id: &str, visible: bool);

    /// Drop any connectivity caption state kept for a disabled radio
    fn release_connectivity(&mut self) {}

    /// Ask an enabled radio to scan for networks again
    fn rescan(&mut self) -> bool;
}
