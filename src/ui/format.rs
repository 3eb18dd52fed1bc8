use chrono::{DateTime, Local};
use std::fmt::Display;

pub use crate::models::format_bytes;

pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_bytes_opt(bytes: Option<u64>) -> String {
    bytes.map(format_bytes).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_rate(bytes_per_sec: Option<f64>) -> String {
    match bytes_per_sec {
        Some(rate) => format!("{}/s", format_bytes(rate.round() as u64)),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_temperature(celsius: Option<f32>) -> String {
    celsius
        .map(|t| format!("{:.1}°C", t))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_optional<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_datetime(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Shorter form used in process tables.
pub fn format_created(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
