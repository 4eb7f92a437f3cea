use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::{RenderError, RenderFailureKind};

/// Decode a response body into UTF-8 using: BOM -> Content-Type charset -> chardetng guess.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<String, RenderError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<String, RenderError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(RenderError::new(
            RenderFailureKind::Decode,
            format!("invalid {} byte sequence", enc.name()),
        ));
    }
    Ok(text.into_owned())
}
