use shared::types::StaffResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    Pdf(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
        }
    }

    /// Name used in rendering failure messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Excel => "Excel file",
        }
    }
}

/// Everything a report needs besides the rows themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMeta {
    pub title: String,
    pub footer: String,
    /// Already formatted as `dd/MM/yyyy HH:mm:ss`.
    pub generated_at: String,
    pub filters: Vec<String>,
}

/// A finished export, ready to be streamed back.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Turns a page of staff into a binary document.
///
/// Rendering is CPU bound; callers run it on the blocking pool.
#[cfg_attr(feature = "test-support", mockall::automock)]
pub trait ReportRenderer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn render(&self, rows: &[StaffResponse], meta: &ReportMeta) -> Result<Vec<u8>, ExportError>;
}
