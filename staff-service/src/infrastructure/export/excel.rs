//! Excel export of a staff page.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use shared::{time::format_report_date, types::StaffResponse};

use super::HEADERS;
use crate::domain::export::{ExportError, ExportFormat, ReportMeta, ReportRenderer};

const HEADER_BACKGROUND: u32 = 0x2980B9;
const STRIPE_BACKGROUND: u32 = 0xECF0F1;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExcelReport;

impl ReportRenderer for ExcelReport {
    fn format(&self) -> ExportFormat {
        ExportFormat::Excel
    }

    fn render(&self, rows: &[StaffResponse], _meta: &ReportMeta) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.set_name("Staff")?;

        // Header format
        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(HEADER_BACKGROUND))
            .set_font_color(Color::White)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);

        let stripe_format = Format::new().set_background_color(Color::RGB(STRIPE_BACKGROUND));

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        worksheet.set_column_width(0, 12)?; // Staff ID
        worksheet.set_column_width(1, 35)?; // Full Name
        worksheet.set_column_width(2, 10)?; // Gender
        worksheet.set_column_width(3, 12)?; // Birthday

        for (idx, staff) in rows.iter().enumerate() {
            let row = (idx + 1) as u32;
            let cells = [
                staff.staff_id.clone(),
                staff.full_name.clone(),
                staff.gender.label().to_string(),
                format_report_date(staff.birthday),
            ];

            for (col, value) in cells.iter().enumerate() {
                if idx % 2 == 0 {
                    worksheet.write_string_with_format(row, col as u16, value, &stripe_format)?;
                } else {
                    worksheet.write_string(row, col as u16, value)?;
                }
            }
        }

        // Freeze top row
        worksheet.set_freeze_panes(1, 0)?;

        Ok(workbook.save_to_buffer()?)
    }
}
