const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes as UTF-8, replacing invalid sequences. A leading byte order mark is dropped.
pub fn content(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
