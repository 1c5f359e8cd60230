//! Translation tables between the standard base64 alphabet and the `PlantUML` alphabet.

/// Standard base64 alphabet (RFC 4648).
pub(crate) const STANDARD: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// URL-safe alphabet expected by `PlantUML` servers.
pub(crate) const PLANTUML: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Marker for bytes outside the source alphabet.
const INVALID: u8 = 0;

/// Standard base64 byte -> `PlantUML` byte.
///
/// The padding character maps to the zero sextet, which is what `PlantUML`
/// emits for a zero-filled trailing group.
pub(crate) const TO_PLANTUML: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 64 {
        table[STANDARD[i] as usize] = PLANTUML[i];
        i += 1;
    }
    table[b'=' as usize] = PLANTUML[0];
    table
};

/// `PlantUML` byte -> standard base64 byte.
///
/// `=` passes through so tokens produced with padding still decode.
pub(crate) const FROM_PLANTUML: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 64 {
        table[PLANTUML[i] as usize] = STANDARD[i];
        i += 1;
    }
    table[b'=' as usize] = b'=';
    table
};

/// Look up `byte` in `table`, returning `None` for bytes outside the alphabet.
pub(crate) fn translate(table: &[u8; 256], byte: u8) -> Option<u8> {
    match table[usize::from(byte)] {
        INVALID => None,
        mapped => Some(mapped),
    }
}
