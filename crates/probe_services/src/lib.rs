//! Probe Services Layer
//!
//! Host-side configuration for the bridge runtime.

pub mod settings;

pub use settings::{
    BootstrapSettings, BridgeSettings, RuntimeSettings, Settings, SettingsError,
};
