//! Splitting and rebuilding the managed section.
//!
//! The user-owned prefix is handled as raw bytes so a file in any encoding
//! survives a rewrite unchanged above the marker.

/// Whether `line` is the marker.
///
/// Surrounding ASCII whitespace and line terminators are ignored; the marker
/// text itself must match exactly, including case.
pub fn is_marker(line: &[u8], marker: &str) -> bool {
    line.trim_ascii() == marker.as_bytes()
}

/// Split `content` into `\n`-terminated lines, each without its `\r\n`/`\n`.
///
/// A final line without a terminator is still yielded; a trailing `\n` does
/// not produce an extra empty line.
fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    (!content.is_empty())
        .then(|| body.split(|byte| *byte == b'\n'))
        .into_iter()
        .flatten()
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Lines of `content` up to, not including, the first marker line.
///
/// # Example
/// ```
/// use frame_blocks::take_prefix;
///
/// let prefix = take_prefix(b"a=1\r\n### M ###\nb=2\n", "### M ###");
/// assert_eq!(prefix, vec![b"a=1".as_slice()]);
/// ```
pub fn take_prefix<'a>(content: &'a [u8], marker: &str) -> Vec<&'a [u8]> {
    let prefix: Vec<_> = split_lines(content)
        .take_while(|line| !is_marker(line, marker))
        .collect();
    tracing::debug!("Kept {} user lines above the marker", prefix.len());
    prefix
}

/// Rebuild file content from `content`, replacing its managed section.
///
/// Prefix lines are copied byte for byte. Every output line, including the
/// last, is terminated by `\n`. An empty section writes no marker either, so
/// the file goes back to its user-owned content only.
pub fn render<S: AsRef<str>>(content: &[u8], marker: &str, section: &[S]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    for line in take_prefix(content, marker) {
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    if section.is_empty() {
        return out;
    }
    out.extend_from_slice(marker.as_bytes());
    out.push(b'\n');
    for line in section {
        out.extend_from_slice(line.as_ref().as_bytes());
        out.push(b'\n');
    }
    out
}

/// The lines after the first marker, or `None` if there is no marker.
pub fn managed_section<'a>(content: &'a str, marker: &str) -> Option<Vec<&'a str>> {
    let mut lines = content.lines();
    lines.by_ref().find(|line| is_marker(line.as_bytes(), marker))?;
    Some(lines.map(|line| line.trim_end_matches('\r')).collect())
}
