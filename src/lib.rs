pub mod config;
pub mod dependency;
pub mod enabler;
pub mod interface_status_source;
pub mod properties;
pub mod simulator;
pub mod surface;
pub mod types;

pub use crate::{
    config::{EnablerConfig, StatusMessages},
    enabler::RadioEnabler,
    types::{ConnectivityState, EnablementState, Projection, StatusEvent},
};
