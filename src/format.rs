//! Short strings pushed into the overlay labels.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Binary-unit byte count: `B` without decimals below 1 KB, one decimal above.
pub fn format_speed(bytes: u64) -> String {
    if bytes < KB {
        format!("{}B", bytes)
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1}GB", bytes as f64 / GB as f64)
    }
}

/// `▼{recv}/s ▲{sent}/s`
pub fn network_text(recv: u64, sent: u64) -> String {
    format!("▼{}/s ▲{}/s", format_speed(recv), format_speed(sent))
}

/// `R {read}/s W {write}/s`
pub fn disk_text(read: u64, write: u64) -> String {
    format!("R {}/s W {}/s", format_speed(read), format_speed(write))
}

pub fn percent_text(pct: f64) -> String { format!("{}%", pct.round() as i64) }

pub fn celsius_text(c: f64) -> String { format!("{}°C", c.round() as i64) }

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() { return None; }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
