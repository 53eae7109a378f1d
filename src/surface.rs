//! User-facing toggle control.
//!
//! The enabler reads the control's static label and dependency key and writes
//! the projection back. `ProjectedSurface` is a headless implementation that
//! keeps the projection in memory and records every write in order.

use crate::types::Projection;

pub trait ControlSurface {
    /// Summary configured for the control, restored while the radio is off
    fn original_label(&self) -> String;

    /// Key of the control this one depends on
    fn dependency_key(&self) -> Option<String>;

    fn set_checked(&mut self, checked: bool);

    fn set_enabled(&mut self, enabled: bool);

    fn set_status_text(&mut self, text: Option<&str>);

    fn set_persistent(&mut self, persistent: bool);

    /// Attach or detach the enabler as handler of user change requests
    fn set_request_handler(&mut self, attached: bool);
}

/// A single write to a control surface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SurfaceWrite {
    Checked(bool),
    Enabled(bool),
    StatusText(Option<String>),
    Persistent(bool),
    RequestHandler(bool),
}

#[derive(Clone, Debug, Default)]
pub struct ProjectedSurface {
    label: String,
    dependency_key: Option<String>,
    projection: Projection,
    persistent: bool,
    request_handler: bool,
    writes: Vec<SurfaceWrite>,
}

impl ProjectedSurface {
    /// Create a persistent, enabled and unchecked surface showing `label`
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();

        Self {
            projection: Projection {
                checked: false,
                enabled: true,
                status_text: Some(label.clone()),
            },
            label,
            dependency_key: None,
            persistent: true,
            request_handler: false,
            writes: Vec::new(),
        }
    }

    /// Builder pattern: make the surface depend on another control
    pub fn with_dependency(mut self, key: impl Into<String>) -> Self {
        self.dependency_key = Some(key.into());
        self
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn has_request_handler(&self) -> bool {
        self.request_handler
    }

    /// All writes received so far, oldest first
    pub fn writes(&self) -> &[SurfaceWrite] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl ControlSurface for ProjectedSurface {
    fn original_label(&self) -> String {
        self.label.clone()
    }

    fn dependency_key(&self) -> Option<String> {
        self.dependency_key.clone()
    }

    fn set_checked(&mut self, checked: bool) {
        self.projection.checked = checked;
        self.writes.push(SurfaceWrite::Checked(checked));
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.projection.enabled = enabled;
        self.writes.push(SurfaceWrite::Enabled(enabled));
    }

    fn set_status_text(&mut self, text: Option<&str>) {
        let text = text.map(str::to_string);
        self.projection.status_text = text.clone();
        self.writes.push(SurfaceWrite::StatusText(text));
    }

    fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
        self.writes.push(SurfaceWrite::Persistent(persistent));
    }

    fn set_request_handler(&mut self, attached: bool) {
        self.request_handler = attached;
        self.writes.push(SurfaceWrite::RequestHandler(attached));
    }
}
