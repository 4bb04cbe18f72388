use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Return the current instant in the given timezone.
pub fn now_in(timezone: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&timezone)
}

/// Return the date in given timezone
///
/// Birthdays are stored as postgres `DATE`, so "today" has to be taken in the
/// timezone the business runs in rather than in UTC.
///
/// # Example
///```
/// use shared::time::today_in;
/// use chrono_tz::Asia::Ho_Chi_Minh;
/// let today = today_in(Ho_Chi_Minh);
/// ```
pub fn today_in(timezone: Tz) -> NaiveDate {
    now_in(timezone).date_naive()
}

/// `dd/MM/yyyy`, the date format used in exported reports.
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/MM/yyyy HH:mm:ss`, the timestamp format used in exported reports.
pub fn format_report_timestamp(at: &DateTime<Tz>) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}
