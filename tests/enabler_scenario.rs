use anyhow::Result;
use radio_enabler::{
    ConnectivityState, EnablementState, EnablerConfig, Projection, RadioEnabler, StatusEvent,
    dependency::DependencyTable,
    interface_status_source::{EventSink, InterfaceStatusSource},
    properties::InMemoryProperties,
    surface::ProjectedSurface,
};
use std::{cell::RefCell, rc::Rc};

const LABEL: &str = "Connect to WiMAX networks";

// Interface whose state and event delivery are driven by the test
#[derive(Clone, Default)]
struct ScriptedInterface {
    inner: Rc<RefCell<Script>>,
}

#[derive(Default)]
struct Script {
    state: EnablementState,
    sink: Option<EventSink>,
    requests: Vec<bool>,
    indicator_hidden: usize,
    released: usize,
}

impl ScriptedInterface {
    fn with_state(state: EnablementState) -> Self {
        let interface = Self::default();
        interface.inner.borrow_mut().state = state;
        interface
    }

    fn transition(&self, current: EnablementState) {
        let mut script = self.inner.borrow_mut();
        let previous = std::mem::replace(&mut script.state, current);
        if let Some(sink) = &script.sink {
            let _ = sink.send(StatusEvent::EnablementChanged { current, previous });
        }
    }

    fn connectivity(&self, state: ConnectivityState) {
        if let Some(sink) = &self.inner.borrow().sink {
            let _ = sink.send(StatusEvent::ConnectivityChanged(state));
        }
    }

    fn requests(&self) -> Vec<bool> {
        self.inner.borrow().requests.clone()
    }
}

impl InterfaceStatusSource for ScriptedInterface {
    fn is_supported(&self) -> bool {
        true
    }

    fn query_state(&self) -> EnablementState {
        self.inner.borrow().state
    }

    fn request_enabled(&mut self, enabled: bool) -> bool {
        self.inner.borrow_mut().requests.push(enabled);
        true
    }

    fn subscribe(&mut self, sink: EventSink) -> Result<()> {
        self.inner.borrow_mut().sink = Some(sink);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.inner.borrow_mut().sink = None;
    }

    fn set_indicator_visibility(&mut self, _id: &str, visible: bool) {
        if !visible {
            self.inner.borrow_mut().indicator_hidden += 1;
        }
    }

    fn release_connectivity(&mut self) {
        self.inner.borrow_mut().released += 1;
    }

    fn rescan(&mut self) -> bool {
        true
    }
}

type ScenarioEnabler =
    RadioEnabler<ScriptedInterface, ProjectedSurface, DependencyTable, InMemoryProperties>;

fn create_enabler(interface: &ScriptedInterface, dependency: DependencyTable) -> ScenarioEnabler {
    RadioEnabler::new(
        interface.clone(),
        ProjectedSurface::new(LABEL).with_dependency("airplane_mode"),
        dependency,
        InMemoryProperties::default(),
        EnablerConfig::default(),
    )
}

fn projection(checked: bool, enabled: bool, status_text: Option<&str>) -> Projection {
    Projection {
        checked,
        enabled,
        status_text: status_text.map(str::to_string),
    }
}

#[test]
fn enable_connect_disable_cycle() {
    let interface = ScriptedInterface::with_state(EnablementState::Disabled);
    let mut enabler = create_enabler(
        &interface,
        DependencyTable::new().with_control("airplane_mode", false),
    );

    enabler.activate();
    assert!(enabler.surface().projection().enabled);
    assert!(!enabler.surface().projection().checked);

    assert!(enabler.on_user_request(true));
    assert!(!enabler.surface().projection().enabled);
    assert_eq!(interface.requests(), vec![true]);
    assert_eq!(enabler.properties().get("wimax.dualmode.1xrtt"), Some("0"));
    assert_eq!(enabler.properties().get("wimax.wifi.disable"), Some("1"));

    interface.transition(EnablementState::Enabling);
    enabler.dispatch_pending();
    assert_eq!(
        enabler.surface().projection(),
        &projection(false, false, Some("starting"))
    );

    interface.transition(EnablementState::Enabled);
    enabler.dispatch_pending();
    assert_eq!(enabler.surface().projection(), &projection(true, true, None));

    interface.connectivity(ConnectivityState::Connected);
    enabler.dispatch_pending();
    assert_eq!(
        enabler.surface().projection(),
        &projection(true, true, Some("connected"))
    );

    assert!(enabler.on_user_request(false));
    assert_eq!(interface.requests(), vec![true, false]);
    assert_eq!(interface.inner.borrow().indicator_hidden, 1);

    interface.transition(EnablementState::Disabling);
    interface.transition(EnablementState::Disabled);
    assert_eq!(enabler.dispatch_pending(), 2);
    assert_eq!(
        enabler.surface().projection(),
        &projection(false, true, Some(LABEL))
    );
    assert_eq!(interface.inner.borrow().released, 1);
}

#[test]
fn connectivity_after_disable_does_not_resurrect_caption() {
    let interface = ScriptedInterface::with_state(EnablementState::Enabled);
    let mut enabler = create_enabler(&interface, DependencyTable::new());
    enabler.activate();

    interface.transition(EnablementState::Disabling);
    interface.transition(EnablementState::Disabled);
    interface.connectivity(ConnectivityState::Disconnected);
    enabler.dispatch_pending();

    assert_eq!(
        enabler.surface().projection(),
        &projection(false, true, Some(LABEL))
    );
}

#[test]
fn dependency_veto_keeps_control_disabled() {
    let interface = ScriptedInterface::with_state(EnablementState::Disabled);
    let mut enabler = create_enabler(
        &interface,
        DependencyTable::new().with_control("airplane_mode", true),
    );
    enabler.activate();

    interface.transition(EnablementState::Enabling);
    interface.transition(EnablementState::Enabled);
    enabler.dispatch_pending();
    assert_eq!(enabler.surface().projection(), &projection(true, false, None));

    enabler.resolver_mut().set("airplane_mode", false);
    interface.transition(EnablementState::Disabling);
    interface.transition(EnablementState::Disabled);
    enabler.dispatch_pending();
    assert_eq!(
        enabler.surface().projection(),
        &projection(false, true, Some(LABEL))
    );
}

#[test]
fn failed_start_leaves_control_interactive() {
    let interface = ScriptedInterface::with_state(EnablementState::Disabled);
    let mut enabler = create_enabler(&interface, DependencyTable::new());
    enabler.activate();

    enabler.on_user_request(true);
    interface.transition(EnablementState::Enabling);
    interface.transition(EnablementState::Unknown);
    enabler.dispatch_pending();

    assert_eq!(
        enabler.surface().projection(),
        &projection(false, true, Some("failed to start"))
    );
}

#[test]
fn deactivated_enabler_ignores_late_events() {
    let interface = ScriptedInterface::with_state(EnablementState::Disabled);
    let mut enabler = create_enabler(&interface, DependencyTable::new());
    enabler.activate();

    interface.transition(EnablementState::Enabling);
    enabler.deactivate();
    enabler.surface_mut().clear_writes();

    interface.transition(EnablementState::Enabled);
    interface.connectivity(ConnectivityState::Connected);
    assert_eq!(enabler.dispatch_pending(), 0);
    enabler.handle_event(StatusEvent::EnablementChanged {
        current: EnablementState::Enabled,
        previous: EnablementState::Enabling,
    });

    assert!(enabler.surface().writes().is_empty());
    assert!(!enabler.surface().has_request_handler());
}

#[test]
fn reactivation_resubscribes() {
    let interface = ScriptedInterface::with_state(EnablementState::Disabled);
    let mut enabler = create_enabler(&interface, DependencyTable::new());

    enabler.activate();
    enabler.deactivate();
    enabler.activate();

    interface.transition(EnablementState::Enabling);
    assert_eq!(enabler.dispatch_pending(), 1);
    assert_eq!(
        enabler.surface().projection().status_text.as_deref(),
        Some("starting")
    );
}
