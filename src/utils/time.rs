use chrono::DateTime;
use chrono::Utc;

/// Format a timestamp in the CIM datetime form
/// `yyyymmddHHMMSS.mmmmmm+000` (UTC, microsecond precision).
pub fn cim_datetime(t: DateTime<Utc>) -> String {
    format!("{}+000", t.format("%Y%m%d%H%M%S%.6f"))
}

/// Current time in CIM datetime form.
pub fn cim_datetime_now() -> String {
    cim_datetime(Utc::now())
}
