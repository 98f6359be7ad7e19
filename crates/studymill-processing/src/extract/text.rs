/// Plain text is returned as-is; invalid UTF-8 sequences become U+FFFD.
pub(super) fn extract_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}
