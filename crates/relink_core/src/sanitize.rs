pub const FALLBACK_FILENAME: &str = "untitled";

/// Characters rejected in file and folder names on common filesystems.
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn an arbitrary string into a filesystem-legal name:
/// - forbidden characters become `replacement`;
/// - code points below 32 are dropped;
/// - leading/trailing spaces and periods are stripped (trailing periods are
///   rejected on some filesystems);
/// - an empty result falls back to `untitled`.
///
/// Total and deterministic; never fails.
pub fn sanitize_filename(name: &str, replacement: char) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for ch in name.chars() {
        if FORBIDDEN.contains(&ch) {
            cleaned.push(replacement);
        } else if ch as u32 >= 32 {
            cleaned.push(ch);
        }
    }

    let trimmed = cleaned.trim_matches([' ', '.']);
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive a title candidate from a document's first line: drop one leading
/// `# ` heading marker, drop the trailing line break, and turn `/` into `-`
/// so the title cannot smuggle in a path separator. The result still goes
/// through [`sanitize_filename`], which is the authoritative safety net.
pub fn title_from_heading(first_line: &str) -> String {
    let line = first_line.trim_end_matches(['\r', '\n']);
    let line = line.strip_prefix("# ").unwrap_or(line);
    line.replace('/', "-")
}
