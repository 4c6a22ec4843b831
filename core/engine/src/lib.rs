//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Shared primitives for the sheet engines.
//! CONTEXT: Field values and records, visual styles, number formatting,
//! geometry, text measurement and the category logging macros. Both layout
//! crates and the sheet session depend on this crate and nothing here depends
//! on them.

pub mod geometry;
pub mod logging;
pub mod number_format;
pub mod style;
pub mod text;
pub mod value;

// Re-export commonly used types at the crate root
pub use geometry::Bounds;
pub use number_format::{format_number, format_value, NumberFormat};
pub use style::{CellTheme, Color, FontWeight, TextAlign, TextStyle, VerticalAlign};
pub use text::{measure_styled_text, measure_text_width};
pub use value::{compare_values, record_value, FieldValue, Record, UNDEFINED_KEY};
