//! dashgen code generator: compiles one page of widgets into ESPHome source.
//!
//! # Architecture
//!
//! A page is compiled in four phases, each visiting widgets in page order:
//!
//! 1. **Collect**: every plugin requests the fonts, icon glyphs, images and
//!    entities it will use. Requests are interned so identical ones share
//!    one identifier.
//! 2. **Shared**: each kind present on the page declares its shared
//!    platform blocks (onboard sensor chip, wifi signal, time source) once.
//!    Overlapping blocks are detected by the ids they provide.
//! 3. **Emit**: each widget produces its output for the profile's target,
//!    wrapped by the engine in a trace marker and, when conditional, a
//!    visibility guard.
//! 4. **Bundle**: output, declarations and diagnostics are packaged into a
//!    [`Bundle`].
//!
//! ## Targets
//!
//! - **Procedural**: a flat instruction list rendered as the C++ body of a
//!   display `lambda:` ([`instr`], [`procedural`]).
//! - **Declarative**: a retained-mode widget tree rendered as an `lvgl:`
//!   page ([`tree`], [`declarative`]).
//!
//! Widget kinds live in [`widgets`] and are looked up through the
//! [`PluginRegistry`]; the pipeline itself knows nothing about any kind.

pub mod bundle;
pub mod color;
pub mod compiler;
pub mod context;
pub mod declarative;
pub mod error;
pub mod format;
pub mod icons;
pub mod instr;
pub mod options;
pub mod plugin;
pub mod procedural;
pub mod resources;
pub mod trace;
pub mod tree;
pub mod visibility;
pub mod widgets;
pub mod yaml;

pub use bundle::{Bundle, TargetOutput};
pub use compiler::{compile, compile_reserving};
pub use context::EmitContext;
pub use error::{CodegenError, CodegenResult};
pub use instr::{Instr, Program};
pub use options::CompileOptions;
pub use plugin::{PluginInfo, PluginRegistry, WidgetPlugin};
pub use resources::Declaration;
pub use trace::{TraceMap, TraceRecord};
pub use tree::{Attr, Node};
