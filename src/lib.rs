//! # Folio
//!
//! An append-only PDF generator. Pages are written as raw content streams,
//! fonts and images are registered on first use, and everything is
//! serialized in one pass when the document closes.
//!
//! ## Architecture
//!
//! ```text
//! Document API / JSON script
//!       ↓
//!   [document]      — Page state machine, text and graphics producers
//!       ↓
//!   [font]          — Metrics, TrueType parsing and subsetting
//!   [image_loader]  — JPEG, PNG and GIF to PDF image records
//!       ↓
//!   [pdf]           — Object writer, page tree, resources, trailer
//! ```
//!
//! ```no_run
//! use folio::{Align, Border, Document, DocumentOptions, LineBreak};
//!
//! let mut doc = Document::new(DocumentOptions::default())?;
//! doc.add_page()?;
//! doc.set_font("Arial", "B", 16.0)?;
//! doc.cell(40.0, 10.0, "Hello World!", Border::None, LineBreak::Right, Align::Left, false, None)?;
//! let bytes = doc.finish()?;
//! # Ok::<(), folio::FolioError>(())
//! ```

pub mod document;
pub mod encoding;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod model;
pub mod output;
pub mod pdf;
mod render;

pub use document::{Align, Border, Color, Document, LineBreak, LinkId, LinkTarget, RectStyle, Sides};
pub use error::{FolioError, Result, StateError};
pub use font::{EmbedOptions, FontSource};
pub use image_loader::{ImageFormat, ImageSource};
pub use model::{DocumentOptions, DocumentSpec, Orientation, PageSize, Unit};
pub use output::Destination;
pub use pdf::{Layout, Metadata, Zoom};
pub use render::{render, render_json};
