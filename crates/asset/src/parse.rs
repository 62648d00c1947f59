//! Token helpers shared by the OBJ and MTL line parsers.

use std::str::SplitWhitespace;

use crate::error::LineError;

pub(crate) fn parse_f32(value: Option<&str>, what: &'static str) -> Result<f32, LineError> {
    let token = value.ok_or(LineError::MissingField(what))?;
    token.parse::<f32>().map_err(|_| LineError::InvalidNumber {
        field: what,
        token: token.to_owned(),
    })
}

/// Reads `N` floats; trailing tokens are left in `parts`.
pub(crate) fn parse_floats<const N: usize>(
    parts: &mut SplitWhitespace<'_>,
    names: [&'static str; N],
) -> Result<[f32; N], LineError> {
    let mut out = [0.0; N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = parse_f32(parts.next(), name)?;
    }
    Ok(out)
}

/// Decodes one raw line (without its `\n`), dropping a trailing `\r`.
pub(crate) fn decode_line(bytes: &[u8]) -> Result<&str, LineError> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| LineError::InvalidEncoding(e.valid_up_to()))
}

/// Splits a trimmed, non-comment line into its directive and the remaining tokens.
pub(crate) fn directive(line: &str) -> Option<(&str, SplitWhitespace<'_>)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut parts = trimmed.split_whitespace();
    parts.next().map(|tag| (tag, parts))
}
