//! UTF-16 plumbing shared by the Unicode resolvers and the text-injection
//! paths.
//!
//! Typed characters cross the event model as individual UTF-16 code units
//! (one key-typed event per unit), so supplementary-plane characters appear
//! as a lead surrogate followed by a trail surrogate.  Text injection goes
//! the other way and has to reassemble code points from UTF-16, replacing
//! unpaired surrogates with U+FFFD rather than failing mid-string.

/// Returns `true` for any UTF-16 surrogate code unit.
pub fn is_surrogate(unit: u16) -> bool {
    (0xD800..=0xDFFF).contains(&unit)
}

/// Returns `true` for a lead (high) surrogate.
pub fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

/// Returns `true` for a trail (low) surrogate.
pub fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Combines a surrogate pair into the code point it encodes.
pub fn surrogate_to_scalar(high: u16, low: u16) -> u32 {
    0x10000 + (((high as u32 - 0xD800) << 10) | (low as u32 - 0xDC00))
}

/// Encodes one code point as UTF-16, yielding one unit for BMP characters
/// and a surrogate pair for supplementary-plane characters.
pub fn scalar_to_utf16(scalar: u32) -> Vec<u16> {
    if scalar <= 0xFFFF {
        vec![scalar as u16]
    } else {
        let lead_offset = 0xD800 - (0x10000u32 >> 10);
        vec![
            (lead_offset + (scalar >> 10)) as u16,
            (0xDC00 + (scalar & 0x3FF)) as u16,
        ]
    }
}

/// Decodes a UTF-8 byte sequence into UTF-16 code units.
///
/// Used by the X11 resolver on the output of `Xutf8LookupString`.  Invalid
/// or truncated sequences yield no units.
pub fn utf8_to_utf16(bytes: &[u8]) -> Vec<u16> {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.encode_utf16().collect(),
        Err(_) => Vec::new(),
    }
}

/// Converts UTF-16 code units to code points, substituting U+FFFD for
/// unpaired surrogates.
pub fn utf16_to_scalars(units: &[u16]) -> Vec<u32> {
    let mut scalars = Vec::with_capacity(units.len());
    let mut iter = units.iter().copied().peekable();
    while let Some(unit) = iter.next() {
        if !is_surrogate(unit) {
            scalars.push(unit as u32);
        } else if is_high_surrogate(unit) {
            match iter.peek().copied() {
                Some(low) if is_low_surrogate(low) => {
                    iter.next();
                    scalars.push(surrogate_to_scalar(unit, low));
                }
                _ => scalars.push(0xFFFD),
            }
        } else {
            scalars.push(0xFFFD);
        }
    }
    scalars
}

/// Formats a code point as the `U%04X` keysym name understood by
/// `XStringToKeysym`.
pub fn unicode_keysym_name(scalar: u32) -> String {
    format!("U{scalar:04X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrogate_classification() {
        assert!(!is_surrogate(0x0041));
        assert!(!is_surrogate(0xD7FF));
        assert!(is_high_surrogate(0xD800));
        assert!(is_high_surrogate(0xDBFF));
        assert!(is_low_surrogate(0xDC00));
        assert!(is_low_surrogate(0xDFFF));
        assert!(!is_surrogate(0xE000));
    }

    #[test]
    fn test_grinning_face_splits_into_expected_pair() {
        // U+1F600 encodes as D83D DE00.
        let units = scalar_to_utf16(0x1F600);
        assert_eq!(units, vec![0xD83D, 0xDE00]);
        assert_eq!(surrogate_to_scalar(0xD83D, 0xDE00), 0x1F600);
    }

    #[test]
    fn test_bmp_scalars_are_single_units() {
        assert_eq!(scalar_to_utf16(0x0041), vec![0x0041]);
        assert_eq!(scalar_to_utf16(0xFFFF), vec![0xFFFF]);
    }

    #[test]
    fn test_utf8_to_utf16_covers_all_sequence_lengths() {
        assert_eq!(utf8_to_utf16(b"a"), vec![0x0061]);
        assert_eq!(utf8_to_utf16("é".as_bytes()), vec![0x00E9]);
        assert_eq!(utf8_to_utf16("€".as_bytes()), vec![0x20AC]);
        assert_eq!(utf8_to_utf16("😀".as_bytes()), vec![0xD83D, 0xDE00]);
    }

    #[test]
    fn test_utf8_to_utf16_rejects_invalid_bytes() {
        assert!(utf8_to_utf16(&[0xFF, 0xFE]).is_empty());
        assert!(utf8_to_utf16(&[0xE2, 0x82]).is_empty()); // truncated €
    }

    #[test]
    fn test_utf16_to_scalars_round_trips_mixed_text() {
        // "a€😀" as UTF-16 units.
        let units = [0x0061u16, 0x20AC, 0xD83D, 0xDE00];
        assert_eq!(utf16_to_scalars(&units), vec![0x61, 0x20AC, 0x1F600]);
    }

    #[test]
    fn test_unpaired_surrogates_become_replacement_character() {
        assert_eq!(utf16_to_scalars(&[0xD83D]), vec![0xFFFD]);
        assert_eq!(utf16_to_scalars(&[0xDE00]), vec![0xFFFD]);
        assert_eq!(
            utf16_to_scalars(&[0xD83D, 0x0041]),
            vec![0xFFFD, 0x41],
            "high surrogate followed by non-surrogate"
        );
    }

    #[test]
    fn test_keysym_name_formatting() {
        assert_eq!(unicode_keysym_name(0x41), "U0041");
        assert_eq!(unicode_keysym_name(0x1F600), "U1F600");
    }
}
