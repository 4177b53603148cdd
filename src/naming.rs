// src/naming.rs

//! Heuristic decomposition of combined "NameVersion" filename stems

/// Split a filename stem into name and version halves.
///
/// Scans left to right for the first digit that starts a clean version tail:
/// the candidate tail is accepted only if it contains no space, underscore,
/// hyphen, or `v`. Rejected tails advance the scan by exactly one character,
/// so digit runs embedded in the name (`Office2008` in
/// `MicrosoftOffice2008v12.2.1`) are skipped. On acceptance the name half has
/// trailing separators (` .-_v`) trimmed. With no acceptable split point the
/// whole input is the name and the version is empty.
///
/// ```
/// use pkgident::naming::name_and_version;
///
/// assert_eq!(
///     name_and_version("TextWrangler2.3b1"),
///     ("TextWrangler".to_string(), "2.3b1".to_string())
/// );
/// ```
pub fn name_and_version(s: &str) -> (String, String) {
    for (index, ch) in s.char_indices() {
        if ch.is_ascii_digit() {
            let possible_version = &s[index..];
            if !possible_version
                .chars()
                .any(|c| matches!(c, ' ' | '_' | '-' | 'v'))
            {
                let name = s[..index].trim_end_matches([' ', '.', '-', '_', 'v']);
                return (name.to_string(), possible_version.to_string());
            }
        }
    }
    // no version number found
    (s.to_string(), String::new())
}
