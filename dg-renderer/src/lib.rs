//! # dg-renderer
//!
//! Tera-based template engine that renders the files of a freshly scaffolded
//! deployment or code location.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dg_renderer::{Renderer, TemplateKind};
//!
//! fn preview(name: &str) {
//!     if let Ok(renderer) = Renderer::new() {
//!         if let Ok(outputs) = renderer.render(name, Path::new(name), TemplateKind::CodeLocation) {
//!             for (path, content) in outputs {
//!                 println!("{}: {} bytes", path.display(), content.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{module_name_for, ScaffoldContext};
pub use engine::{Renderer, TemplateEngine, TemplateKind};
pub use error::RenderError;
