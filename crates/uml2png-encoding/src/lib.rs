//! `PlantUML` text encoding for server URLs.
//!
//! `PlantUML` servers accept diagram source embedded in the request path as a
//! compact token. The token is produced by a fixed pipeline:
//!
//! 1. Raw DEFLATE (no zlib header or trailer) of the UTF-8 source at maximum
//!    compression level
//! 2. Standard base64 encoding of the compressed bytes
//! 3. Transliteration of every base64 character into the `PlantUML` alphabet
//!    `0-9A-Za-z-_`
//!
//! The pipeline is fixed by the server protocol: a token built with a
//! different alphabet or a zlib-wrapped stream is rejected or renders garbage.
//!
//! # Example
//!
//! ```
//! let token = uml2png_encoding::encode("Bob -> Alice : hello");
//! assert_eq!(token, "SyfFKj2rKt3CoKnELR1Io4ZDoSa70000");
//! assert_eq!(
//!     uml2png_encoding::decode(&token).unwrap(),
//!     "Bob -> Alice : hello"
//! );
//! ```

mod alphabet;

use std::io::{Read, Write};

use base64::Engine;
use base64::alphabet::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::prelude::BASE64_STANDARD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::alphabet::{FROM_PLANTUML, TO_PLANTUML, translate};

/// Base64 engine for decoding tokens with or without trailing padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Error decoding a `PlantUML` token back to diagram source.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Token contains a character outside the `PlantUML` alphabet.
    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter {
        /// Offending character.
        ch: char,
        /// Byte offset in the token.
        position: usize,
    },
    /// Token is not valid base64 after translation.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Decoded bytes are not a valid raw DEFLATE stream.
    #[error("invalid deflate stream: {0}")]
    Inflate(#[source] std::io::Error),
    /// Inflated source is not valid UTF-8.
    #[error("decoded source is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode diagram source into a `PlantUML` URL token.
///
/// Total and deterministic: identical input always yields the identical
/// token, and every token consists solely of `0-9A-Za-z-_`. A trailing
/// partial base64 group is filled with `0` (the zero sextet) instead of `=`,
/// matching the encoder shipped with `PlantUML` itself.
#[must_use]
pub fn encode(source: &str) -> String {
    let compressed = deflate(source.as_bytes());
    BASE64_STANDARD
        .encode(compressed)
        .bytes()
        .map(|byte| char::from(TO_PLANTUML[usize::from(byte)]))
        .collect()
}

/// Decode a `PlantUML` URL token back into diagram source.
///
/// Accepts tokens with `0`-filled, `=`-padded, or missing trailing groups.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    let base64 = token
        .char_indices()
        .map(|(position, ch)| {
            u8::try_from(ch)
                .ok()
                .and_then(|byte| translate(&FROM_PLANTUML, byte))
                .ok_or(DecodeError::InvalidCharacter { ch, position })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let compressed = LENIENT_BASE64.decode(base64)?;

    // The decoder stops at the final block; zero bytes from the filled
    // trailing group are left unread.
    let mut source = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut source)
        .map_err(DecodeError::Inflate)?;

    Ok(String::from_utf8(source)?)
}

/// Raw DEFLATE at maximum compression level.
fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len()), Compression::best());
    // Writes go to an in-memory buffer and cannot fail.
    encoder
        .write_all(data)
        .expect("deflate into Vec<u8> failed");
    encoder.finish().expect("deflate into Vec<u8> failed")
}
