use chrono::{DateTime, Utc};

use crate::database::models::VerificationEntry;

pub const CSV_HEADER: &str = "Date,QR Title,Client Name,IP Address,Status";

const DATE_FORMAT: &str = "%d %b %Y %H:%M";

/// `verifications-YYYY-MM-DD.csv` for the given day
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("verifications-{}.csv", now.format("%Y-%m-%d"))
}

/// One line per entry, in the order given, after the header line
pub fn verifications_csv(entries: &[VerificationEntry]) -> String {
    let mut csv = String::with_capacity(64 * (entries.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for entry in entries {
        let date = entry.scanned_at.format(DATE_FORMAT).to_string();
        let fields = [
            date.as_str(),
            entry.qr_title.as_deref().unwrap_or(""),
            entry.qr_client_name.as_deref().unwrap_or(""),
            entry.ip_address.as_str(),
            entry.status.as_str(),
        ];
        let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        csv.push_str(&line.join(","));
        csv.push('\n');
    }

    csv
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
