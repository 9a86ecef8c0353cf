//! The student directory and the CSV import that fills it.

pub mod directory;
pub mod import;
pub mod qr;
