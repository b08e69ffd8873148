//! Reversible mapping between resource names and file names
//!
//! Only characters that are illegal or awkward in file names are escaped,
//! as `%XX` (uppercase hex of each UTF-8 byte). `%` itself is escaped so the
//! mapping stays unique, and a leading `.` is escaped so no resource file is
//! ever hidden or mistaken for a temp file.

const ESCAPED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '%'];

/// Map a resource name to a file stem (without extension).
pub fn resource_to_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (idx, ch) in name.chars().enumerate() {
        let escape = ESCAPED.contains(&ch) || ch.is_control() || (idx == 0 && ch == '.');
        if escape {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Inverse of [`resource_to_file_name`].
///
/// Returns `None` for stems that could not have been produced by the
/// forward mapping: truncated or invalid escapes, lowercase hex, escapes of
/// characters that are never escaped, or unescaped characters that always
/// are. Such a name would not read back from the same file.
pub fn file_name_to_resource(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    let name = String::from_utf8(out).ok()?;
    (resource_to_file_name(&name) == stem).then_some(name)
}
