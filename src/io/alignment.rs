//! JSON persistence for alignments.

use std::io;

use crate::alignment::Alignment;

/// Reads an alignment JSON file. Malformed elements are skipped so one bad
/// entry never discards the rest of the file.
pub fn read_alignment_json(path: &str) -> io::Result<Alignment> {
    let contents = crate::io::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Alignment::from_json_value(&value))
}

/// Writes an alignment to a JSON file.
pub fn write_alignment_json(path: &str, alignment: &Alignment) -> io::Result<()> {
    let json = serde_json::to_string_pretty(alignment).map_err(io::Error::other)?;
    crate::io::write_string(path, &json)
}
