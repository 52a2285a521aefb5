// grit-rs: hardware-resource binding layer for a CNC motion controller
//! Maps logical motion-control signals onto physical port groups, bits,
//! interrupt banks, and PWM timer units for a selectable board variant,
//! and carries the synchronous peripheral bus driver. The motion planner,
//! G-code layer, and interrupt handlers are external consumers of the
//! bindings produced here.

pub mod board;
pub mod bus;
pub mod config;

pub use board::{
    BindingError, Binding, BoardVariant, CompositeBinding, FeatureFlags, LogicalSignal,
    PwmConfig, PwmFrequency, ResolvedBindingSet, ResourceDescriptor, SignalClass,
};
pub use bus::{BusLink, BusSettings, SyncBus};
pub use config::{load_config, Config, ConfigError};
