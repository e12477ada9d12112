//! Classic 16-bytes-per-line hex dump.

/// Bytes per dump line.
pub const BYTES_PER_LINE: usize = 16;

/// Width of the hex column: 16 bytes * 2 digits + 15 separators.
const HEX_COLUMN_WIDTH: usize = BYTES_PER_LINE * 3 - 1;

/// Formats at most `limit` bytes of `data` as a hex dump.
///
/// Each line is `OFFSET  HEX  ASCII`: an 8-digit uppercase offset, the
/// bytes in uppercase hex padded to a fixed width, and printable ASCII
/// with everything else shown as `.`.
pub fn format_hex_dump(data: &[u8], limit: usize) -> String {
    let shown = &data[..limit.min(data.len())];

    shown
        .chunks(BYTES_PER_LINE)
        .enumerate()
        .map(|(i, chunk)| {
            let hex = chunk
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ");
            let ascii: String = chunk
                .iter()
                .map(|&b| if (32..=126).contains(&b) { b as char } else { '.' })
                .collect();
            format!(
                "{:08X}  {:<width$}  {}",
                i * BYTES_PER_LINE,
                hex,
                ascii,
                width = HEX_COLUMN_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
