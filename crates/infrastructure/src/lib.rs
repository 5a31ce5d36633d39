//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer.
//! Contains the provider adapters (Kakao, Google Routes, stop coverage, OSRM), the
//! headless map surface, the channel-fed location source, configuration
//! loading, telemetry and the [`NavigationEngine`] that wires them together.

pub mod adapters;
pub mod config;
pub mod engine;
pub mod location;
pub mod map_surface;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, Environment};
pub use engine::{NavigationEngine, RouteOptions};
pub use location::ChannelLocationSource;
pub use map_surface::{Drawable, HeadlessMapSurface, ScenePrimitive, SceneSnapshot};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryGuard, init_telemetry};
