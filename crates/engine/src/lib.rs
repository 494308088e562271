//! `lotegen-engine`: header detection, column resolution and output assembly.
//!
//! Pure engine crate: receives a raw cell matrix, returns template-shaped
//! tables. No CLI or file IO dependencies.

pub mod assemble;
pub mod cell;
pub mod error;
pub mod event;
pub mod header;
pub mod matrix;
pub mod normalize;
pub mod resolver;
pub mod table;
pub mod template;

pub use assemble::{assemble, Assembled, Assembler, Diagnostic, OutputColumn, OutputTable};
pub use cell::CellValue;
pub use error::EngineError;
pub use event::{Event, FieldMapping, LogicalField};
pub use header::{locate_header_row, HeaderLocation, HeaderLocator, LocatedBy};
pub use matrix::RawMatrix;
pub use normalize::normalize;
pub use resolver::{resolve, ColumnResolver, MatchStage, Resolution};
pub use table::{materialize, SourceTable};
pub use template::{ColumnRole, TemplateColumns};
