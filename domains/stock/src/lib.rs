//! Stock domain: spreadsheet export of inventory line items, delivered by email

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{ExportRequest, LineItem};
pub use domain::spreadsheet::{CellValue, RenderError, RenderedDocument, HEADERS, MAX_CELL_CHARS};

// Re-export repository types
pub use repository::{ScratchDir, ScratchError, TemporaryArtifact};

// Re-export API types
pub use api::routes;
pub use api::StockState;
