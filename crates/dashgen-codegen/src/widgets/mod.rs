//! Built-in widget kinds.

pub mod battery;
pub mod common;
pub mod datetime;
pub mod icon;
pub mod image;
pub mod label;
pub mod progress_bar;
pub mod reading;
pub mod sensor_bar;
pub mod sensor_text;
pub mod shapes;
pub mod tabs;
pub mod weather;
