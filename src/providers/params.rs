//! Request parameter encoding for the YouTube transcript endpoint.
//!
//! The endpoint expects a base64 blob of two nested tag/length/value records. There
//! is no schema to compile against, so the records are assembled byte by byte.
//! Every length prefix is a single byte: fields of 256 bytes or more are not
//! representable and are truncated to their low byte.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

const FIELD_1_BYTES: u8 = 0x0A;
const FIELD_2_BYTES: u8 = 0x12;
const FIELD_3_BYTES: u8 = 0x1A;
const FIELD_3_VARINT: u8 = 0x18;

/// Track kind requested inside the language record (auto-generated captions)
const TRACK_KIND: &[u8] = b"asr";

/// Small append-only builder for tag/length/value records
#[derive(Debug, Default)]
struct RecordBuilder {
    buf: Vec<u8>,
}

impl RecordBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Length-delimited field: tag, one length byte, payload
    fn bytes(mut self, tag: u8, payload: &[u8]) -> Self {
        self.buf.push(tag);
        self.buf.push(payload.len() as u8);
        self.buf.extend_from_slice(payload);
        self
    }

    /// Varint field whose value fits in a single byte
    fn small_varint(mut self, tag: u8, value: u8) -> Self {
        self.buf.push(tag);
        self.buf.push(value);
        self
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Inner record selecting the caption language:
/// `0A 03 "asr" 12 <len> <lang> 1A 00`
pub fn language_record(lang_code: &str) -> Vec<u8> {
    RecordBuilder::new()
        .bytes(FIELD_1_BYTES, TRACK_KIND)
        .bytes(FIELD_2_BYTES, lang_code.as_bytes())
        .bytes(FIELD_3_BYTES, &[])
        .finish()
}

/// Outer record carrying the video id and the already-encoded language record:
/// `0A <len> <video id> 12 <len> <encoded lang> 18 01`
pub fn params_record(video_id: &str, encoded_lang: &str) -> Vec<u8> {
    RecordBuilder::new()
        .bytes(FIELD_1_BYTES, video_id.as_bytes())
        .bytes(FIELD_2_BYTES, encoded_lang.as_bytes())
        .small_varint(FIELD_3_VARINT, 1)
        .finish()
}

/// Base64 the language record, then percent-encode it the way a URL path
/// component is quoted (`/` stays literal). `=` is escaped as `%3D` in a final pass.
pub fn encode_language(lang_code: &str) -> String {
    let b64 = BASE64_STANDARD.encode(language_record(lang_code));
    urlencoding::encode(&b64)
        .replace("%2F", "/")
        .replace('=', "%3D")
}

/// Build the final `params` string for a transcript request
pub fn encode_params(video_id: &str, lang_code: &str) -> String {
    let encoded_lang = encode_language(lang_code);
    BASE64_STANDARD.encode(params_record(video_id, &encoded_lang))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_record_bytes() {
        assert_eq!(
            language_record("en"),
            vec![0x0A, 0x03, 0x61, 0x73, 0x72, 0x12, 0x02, 0x65, 0x6E, 0x1A, 0x00]
        );
    }

    #[test]
    fn test_params_record_bytes() {
        assert_eq!(
            params_record("v1", "ABCD"),
            vec![0x0A, 0x02, 0x76, 0x31, 0x12, 0x04, 0x41, 0x42, 0x43, 0x44, 0x18, 0x01]
        );
    }

    #[test]
    fn test_encode_language_escapes_padding() {
        assert_eq!(encode_language("en"), "CgNhc3ISAmVuGgA%3D");
        assert_eq!(encode_language("zh-Hans"), "CgNhc3ISB3poLUhhbnMaAA%3D%3D");
        assert_eq!(encode_language("es-419"), "CgNhc3ISBmVzLTQxORoA");
    }

    #[test]
    fn test_encode_language_quotes_plus_but_keeps_slash() {
        assert_eq!(encode_language("a~"), "CgNhc3ISAmF%2BGgA%3D");
        assert_eq!(encode_language("a?"), "CgNhc3ISAmE/GgA%3D");
    }

    #[test]
    fn test_encode_params_known_values() {
        assert_eq!(encode_params("abc", "en"), "CgNhYmMSEkNnTmhjM0lTQW1WdUdnQSUzRBgB");
        assert_eq!(
            encode_params("dQw4w9WgXcQ", "vi"),
            "CgtkUXc0dzlXZ1hjURISQ2dOaGMzSVNBblpwR2dBJTNEGAE="
        );
    }

    #[test]
    fn test_encode_params_is_deterministic() {
        assert_eq!(encode_params("abc", "en"), encode_params("abc", "en"));
    }
}
