/// A directory entry as seen by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    sequence_number: u64,
    is_regular_file: bool,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, is_regular_file: bool) -> Self {
        let name = name.into();
        let sequence_number = parse_sequence_number(&name);
        Self {
            name,
            sequence_number,
            is_regular_file,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn is_regular_file(&self) -> bool {
        self.is_regular_file
    }
}

/// Reads the `NNN-` prefix of a file name.
///
/// Returns 0 when the name does not start with ASCII digits followed by `-`.
/// Prefixes too large for a `u64` saturate so they still sort last.
pub fn parse_sequence_number(name: &str) -> u64 {
    let digits_len = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 || name.as_bytes().get(digits_len) != Some(&b'-') {
        return 0;
    }
    name[..digits_len]
        .bytes()
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}

/// Sorts entries by sequence number, keeping listing order for ties.
pub fn order_entries(entries: &mut [FileEntry]) {
    // `sort_by_key` is stable; ties rely on that.
    entries.sort_by_key(FileEntry::sequence_number);
}

#[cfg(test)]
mod tests {
    use super::parse_sequence_number;

    #[test]
    fn prefix_requires_dash_separator() {
        assert_eq!(parse_sequence_number("12-notes.docx"), 12);
        assert_eq!(parse_sequence_number("007-bond.doc"), 7);
        assert_eq!(parse_sequence_number("12notes.docx"), 0);
        assert_eq!(parse_sequence_number("12_notes.docx"), 0);
        assert_eq!(parse_sequence_number("-1-notes.docx"), 0);
        assert_eq!(parse_sequence_number("notes-12.docx"), 0);
        assert_eq!(parse_sequence_number(""), 0);
    }

    #[test]
    fn digits_only_name_has_no_prefix() {
        assert_eq!(parse_sequence_number("2024"), 0);
    }

    #[test]
    fn oversized_prefix_saturates() {
        assert_eq!(
            parse_sequence_number("99999999999999999999999-big.docx"),
            u64::MAX
        );
    }

    #[test]
    fn non_ascii_digits_are_not_a_prefix() {
        assert_eq!(parse_sequence_number("١٢-arabic.docx"), 0);
    }
}
