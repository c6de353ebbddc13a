//! Shared types for the dashgen widget compiler.
//!
//! This crate defines the page model, property bags, visibility conditions,
//! device profiles and structured diagnostics used across all stages.

mod condition;
mod diagnostic;
mod geometry;
mod model;
mod profile;
pub mod props;

pub use condition::{CompareOp, Condition};
pub use diagnostic::{
    Diagnostic, DiagnosticCategory, DiagnosticCode, Diagnostics, Severity, MAX_DIAGNOSTICS,
};
pub use geometry::Geometry;
pub use model::{DeviceLayout, Page, Widget};
pub use profile::{
    ColorMode, DeviceProfile, Measurement, OnboardSensor, OutputTarget, BUILTIN_PROFILES,
};
pub use props::{PropDefault, PropSpec, PropValue, Props, Resolved};
