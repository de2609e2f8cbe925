/*!
 * Utility functions for farpath
 */

use crate::types::{is_directory, is_hidden, is_readonly};

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Render an attribute bitmask as a short `drh` flag string.
pub fn format_attributes(attributes: u32) -> String {
    let mut out = String::with_capacity(3);
    out.push(if is_directory(attributes) { 'd' } else { '-' });
    out.push(if is_readonly(attributes) { 'r' } else { '-' });
    out.push(if is_hidden(attributes) { 'h' } else { '-' });
    out
}
