//! Report renderers for the staff export endpoints.

pub mod excel;
pub mod pdf;

pub use excel::ExcelReport;
pub use pdf::PdfReport;

/// Column headers shared by every report format.
pub const HEADERS: [&str; 4] = ["Staff ID", "Full Name", "Gender", "Birthday"];
