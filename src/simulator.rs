//! Simulated radio driver.
//!
//! Emulates the asynchronous platform service: commands are accepted
//! immediately and the resulting state changes are emitted later from a tokio
//! task. Handles are cheap clones sharing one simulated device.

use crate::{
    config::SimulatorConfig,
    interface_status_source::{EventSink, InterfaceStatusSource},
    types::{ConnectivityState, EnablementState, StatusEvent},
};
use anyhow::{Result, bail};
use log::{debug, info};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::time::sleep;

const CONNECT_SEQUENCE: [ConnectivityState; 3] = [
    ConnectivityState::Scanning,
    ConnectivityState::Connecting,
    ConnectivityState::Connected,
];

#[derive(Debug, Default)]
struct Device {
    state: EnablementState,
    connectivity: Option<ConnectivityState>,
    sink: Option<EventSink>,
    fail_next: bool,
    indicator_id: String,
    indicators: HashMap<String, bool>,
    // Bumped on every state change and connect start; stale connect runs stop
    connect_run: u64,
}

impl Device {
    fn emit(&self, event: StatusEvent) {
        let Some(sink) = &self.sink else {
            debug!("no subscriber for {event:?}");
            return;
        };

        if sink.send(event).is_err() {
            debug!("subscriber gone, dropped {event:?}");
        }
    }

    fn change_state(&mut self, current: EnablementState) {
        self.connect_run += 1;
        let previous = std::mem::replace(&mut self.state, current);
        self.emit(StatusEvent::EnablementChanged { current, previous });
    }

    fn change_connectivity(&mut self, state: ConnectivityState) {
        self.connectivity = Some(state);
        if state == ConnectivityState::Connected {
            self.indicators.insert(self.indicator_id.clone(), true);
        }
        self.emit(StatusEvent::ConnectivityChanged(state));
    }
}

#[derive(Clone, Debug)]
pub struct SimulatedInterface {
    device: Arc<Mutex<Device>>,
    supported: bool,
    transition_delay: Duration,
}

impl SimulatedInterface {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            device: Arc::new(Mutex::new(Device {
                state: EnablementState::Disabled,
                indicator_id: config.indicator_id.clone(),
                ..Default::default()
            })),
            supported: true,
            transition_delay: config.transition_delay,
        }
    }

    /// Builder pattern: start in `state` instead of `Disabled`
    pub fn with_state(self, state: EnablementState) -> Self {
        self.device().state = state;
        self
    }

    /// Builder pattern: simulate a device without the radio
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Make the next enable or disable end in `Unknown`
    pub fn fail_next_transition(&self) {
        info!("next transition will fail");
        self.device().fail_next = true;
    }

    pub fn connectivity(&self) -> Option<ConnectivityState> {
        self.device().connectivity
    }

    pub fn indicator_visible(&self, id: &str) -> Option<bool> {
        self.device().indicators.get(id).copied()
    }

    pub fn has_subscriber(&self) -> bool {
        self.device().sink.is_some()
    }

    fn device(&self) -> MutexGuard<'_, Device> {
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_transition(device: &Arc<Mutex<Device>>, target: EnablementState) -> bool {
        let mut device = device.lock().unwrap_or_else(PoisonError::into_inner);

        if device.fail_next {
            device.fail_next = false;
            info!("simulated transition to {target} failed");
            device.change_state(EnablementState::Unknown);
            return false;
        }

        device.change_state(target);
        true
    }

    /// Run the connect sequence until it completes, the radio leaves
    /// `Enabled` or a newer sequence starts
    fn spawn_connect(device: Arc<Mutex<Device>>, delay: Duration) {
        let run = {
            let mut device = device.lock().unwrap_or_else(PoisonError::into_inner);
            device.connect_run += 1;
            device.connect_run
        };

        tokio::spawn(async move {
            for state in CONNECT_SEQUENCE {
                sleep(delay).await;

                let mut device = device.lock().unwrap_or_else(PoisonError::into_inner);

                if device.connect_run != run || device.state != EnablementState::Enabled {
                    debug!("connect sequence cancelled before {state:?}");
                    return;
                }

                device.change_connectivity(state);
            }
        });
    }
}

impl InterfaceStatusSource for SimulatedInterface {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn query_state(&self) -> EnablementState {
        self.device().state
    }

    fn request_enabled(&mut self, enabled: bool) -> bool {
        let mut device = self.device();

        let (transitional, target) = match (enabled, device.state) {
            (true, EnablementState::Disabled | EnablementState::Unknown) => {
                (EnablementState::Enabling, EnablementState::Enabled)
            }
            (false, EnablementState::Enabled | EnablementState::Unknown) => {
                (EnablementState::Disabling, EnablementState::Disabled)
            }
            (_, state) => {
                info!("rejecting request_enabled({enabled}) while {state}");
                return false;
            }
        };

        device.change_state(transitional);
        drop(device);

        let shared = self.device.clone();
        let delay = self.transition_delay;

        tokio::spawn(async move {
            sleep(delay).await;

            if Self::finish_transition(&shared, target) && target == EnablementState::Enabled {
                Self::spawn_connect(shared, delay);
            }
        });

        true
    }

    fn subscribe(&mut self, sink: EventSink) -> Result<()> {
        let mut device = self.device();

        if device.sink.is_some() {
            bail!("failed to subscribe: simulated interface already has a subscriber");
        }

        device.sink = Some(sink);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.device().sink = None;
    }

    fn set_indicator_visibility(&mut self, id: &str, visible: bool) {
        debug!("indicator {id} visible: {visible}");
        self.device().indicators.insert(id.to_string(), visible);
    }

    fn release_connectivity(&mut self) {
        self.device().connectivity = None;
    }

    fn rescan(&mut self) -> bool {
        if self.device().state != EnablementState::Enabled {
            return false;
        }

        Self::spawn_connect(self.device.clone(), self.transition_delay);
        true
    }
}
