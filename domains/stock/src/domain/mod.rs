//! Domain layer for stock exports

pub mod entities;
pub mod spreadsheet;
