//! Display formatting for received frames.
//!
//! Everything here is a pure string transform: no terminal state is kept
//! between calls, colors are decided by the caller.

use crossterm::style::{Color, Stylize, style as styled};

/// Prefix of every line describing an incoming event.
pub const RX_PREFIX: &str = "< ";

/// Display style of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Incoming frames and control markers (green).
    Received,
    /// Session failures (red).
    Error,
}

/// Renders a binary payload as lowercase hex pairs, each followed by one
/// space: `[0xAB, 0xCD]` becomes `"ab cd "`.
#[must_use]
pub fn format_hex(bytes: &[u8]) -> String {
    let encoded = hex::encode(bytes);
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, digit) in encoded.chars().enumerate() {
        out.push(digit);
        if i % 2 == 1 {
            out.push(' ');
        }
    }
    out
}

/// Prefixes a rendered payload as an incoming line.
#[must_use]
pub fn rx_line(text: &str) -> String {
    format!("{RX_PREFIX}{text}")
}

/// Applies `style` to `text`. Returns `text` unchanged when `colored` is off.
#[must_use]
pub fn paint(style: Style, text: &str, colored: bool) -> String {
    if !colored {
        return text.to_owned();
    }
    match style {
        Style::Received => styled(text).with(Color::Green).to_string(),
        Style::Error => styled(text).with(Color::Red).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_groups_pairs_with_trailing_space() {
        assert_eq!(format_hex(&[0xab, 0xcd]), "ab cd ");
        assert_eq!(format_hex(&[0x00]), "00 ");
    }

    #[test]
    fn hex_of_empty_payload_is_empty() {
        assert_eq!(format_hex(&[]), "");
    }

    #[test]
    fn hex_length_is_three_per_byte() {
        let payload: Vec<u8> = (0..=255).collect();
        let rendered = format_hex(&payload);
        assert_eq!(rendered.len(), payload.len() * 3);
        assert!(rendered.starts_with("00 01 02 "));
        assert!(rendered.ends_with("fe ff "));
        assert!(!rendered.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn rx_line_prefixes_payload() {
        assert_eq!(rx_line("hello"), "< hello");
        assert_eq!(rx_line(""), "< ");
    }

    #[test]
    fn paint_without_color_is_identity() {
        assert_eq!(paint(Style::Received, "< hi", false), "< hi");
        assert_eq!(paint(Style::Error, "boom", false), "boom");
    }

    #[test]
    fn paint_keeps_text() {
        assert!(paint(Style::Received, "< hi", true).contains("< hi"));
        assert!(paint(Style::Error, "boom", true).contains("boom"));
    }
}
