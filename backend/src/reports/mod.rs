//! Rendering of attendance reports and ID cards.

pub mod archive;
pub mod csv;
pub mod pdf;

pub use archive::ReportArchive;
