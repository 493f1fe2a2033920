use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to decode output with {encoding}")]
    DecodeFailure { encoding: String },
    #[error("no word count in automation output: {0:?}")]
    MissingCount(String),
}

/// Decode captured console output: BOM -> strict UTF-8 -> chardetng fallback.
///
/// Windows PowerShell writes in the console code page unless told otherwise,
/// so plain UTF-8 cannot be assumed.
pub fn decode_console_output(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

/// The count is the last non-empty line; anything printed before it is noise.
pub fn parse_word_count(output: &str) -> Result<u64, DecodeError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .and_then(|line| line.parse::<u64>().ok())
        .ok_or_else(|| DecodeError::MissingCount(output.trim().to_string()))
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<String, DecodeError> {
    // `decode` sniffs and strips the BOM itself.
    let (text, used, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: used.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::{decode_console_output, parse_word_count, DecodeError};

    #[test]
    fn plain_ascii_output_passes_through() {
        assert_eq!(decode_console_output(b"1234\r\n").unwrap(), "1234\r\n");
    }

    #[test]
    fn utf16_bom_output_is_decoded() {
        let bytes = [0xFF, 0xFE, b'4', 0, b'2', 0, b'\r', 0, b'\n', 0];
        assert_eq!(decode_console_output(&bytes).unwrap(), "42\r\n");
    }

    #[test]
    fn legacy_code_page_output_falls_back_to_detection() {
        let decoded = decode_console_output(b"Caf\xe9 warning\r\n17\r\n").unwrap();
        assert!(decoded.ends_with("17\r\n"));
        assert_eq!(parse_word_count(&decoded), Ok(17));
    }

    #[test]
    fn count_is_taken_from_last_line() {
        assert_eq!(parse_word_count("loading...\n\n  512  \n\n"), Ok(512));
    }

    #[test]
    fn non_numeric_output_is_rejected() {
        assert_eq!(
            parse_word_count("Exception calling Open\n"),
            Err(DecodeError::MissingCount("Exception calling Open".to_string()))
        );
        assert!(parse_word_count("").is_err());
        assert!(parse_word_count("-3").is_err());
    }
}
