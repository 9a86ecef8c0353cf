use serde::{Deserialize, Serialize};

/// A row of the student directory.
///
/// The directory is replaced wholesale by each CSV import; individual
/// students are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Durable identifier, taken from the `IEEE ID` column of the import.
    pub id: String,
    pub name: String,
    pub domain: String,
    pub join_date: String,
    pub category: String,
    /// Opaque text encoded in the student's QR code.
    pub qr_payload: String,
}
