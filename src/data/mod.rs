//! Data module - CSV loading, normalization and the menu table

mod loader;
mod processor;
pub mod schema;
mod table;

pub use loader::{DataLoader, LoadError};
pub use processor::{DataProcessor, MalformedPolicy, MalformedValueError, ProcessorError};
pub use table::{MenuTable, TableError};
