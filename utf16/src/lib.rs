//! Encoding and decoding of UTF-16 code unit sequences with
//! replacement-based repair.
//!
//! Neither direction can fail: every unpaired or misordered surrogate unit
//! on decode, and every out-of-range or surrogate scalar on encode, is
//! substituted with U+FFFD and processing continues. Callers that need to
//! distinguish a lossless round-trip from a repaired one must scan the
//! output for [`REPLACEMENT_CHAR`] themselves, keeping in mind that U+FFFD
//! is also a legitimately encodable scalar.

/// A Unicode scalar value, or [`REPLACEMENT_CHAR`] standing in for a
/// malformed unit.
pub type Rune = u32;

/// The Unicode replacement character U+FFFD, substituted for every
/// malformed code unit or illegal scalar.
pub const REPLACEMENT_CHAR: Rune = 0xFFFD;

const SURR1: Rune = 0xD800;
const SURR2: Rune = 0xDC00;
const SURR3: Rune = 0xE000;

// First code point that requires a surrogate pair.
const SURR_SELF: Rune = 0x1_0000;

const MAX_RUNE: Rune = 0x10_FFFF;

/// Reports whether `r` is a surrogate code point (U+D800 through U+DFFF).
///
/// Surrogate units appear in well-formed UTF-16 input, but a surrogate
/// code point is never a valid scalar value on its own.
pub fn is_surrogate(r: Rune) -> bool {
    (SURR1..SURR3).contains(&r)
}

/// Combines a high/low surrogate pair into the scalar value it encodes.
///
/// Returns [`REPLACEMENT_CHAR`] unless `r1` is a high surrogate and `r2`
/// is a low surrogate.
pub fn decode_rune(r1: Rune, r2: Rune) -> Rune {
    if (SURR1..SURR2).contains(&r1) && (SURR2..SURR3).contains(&r2) {
        ((r1 - SURR1) << 10) + (r2 - SURR2) + SURR_SELF
    } else {
        REPLACEMENT_CHAR
    }
}

/// Decodes a UTF-16 code unit sequence into scalar values.
///
/// Units outside the surrogate range pass through; a high surrogate
/// immediately followed by a low surrogate decodes as one scalar; any
/// other surrogate unit decodes to [`REPLACEMENT_CHAR`]. The output is
/// at most as long as the input and preserves input order.
pub fn decode(units: &[u16]) -> Vec<Rune> {
    let mut runes = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let r = Rune::from(units[i]);
        if !is_surrogate(r) {
            runes.push(r);
        } else if r < SURR2
            && i + 1 < units.len()
            && (SURR2..SURR3).contains(&Rune::from(units[i + 1]))
        {
            runes.push(decode_rune(r, Rune::from(units[i + 1])));
            i += 1;
        } else {
            runes.push(REPLACEMENT_CHAR);
        }
        i += 1;
    }
    runes
}

/// Splits a scalar value into its high/low surrogate pair.
///
/// Returns a pair of [`REPLACEMENT_CHAR`] units if `r` does not need a
/// surrogate pair, or lies above U+10FFFF.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_rune(r: Rune) -> (u16, u16) {
    if !(SURR_SELF..=MAX_RUNE).contains(&r) {
        return (REPLACEMENT_CHAR as u16, REPLACEMENT_CHAR as u16);
    }
    let r = r - SURR_SELF;
    // The 10-bit mask must bind before the addition.
    (
        (SURR1 + ((r >> 10) & 0x3FF)) as u16,
        (SURR2 + (r & 0x3FF)) as u16,
    )
}

/// Encodes scalar values into a UTF-16 code unit sequence.
///
/// Scalars below U+10000 and outside the surrogate range encode to one
/// unit; scalars from U+10000 through U+10FFFF encode to a surrogate
/// pair; anything else (a surrogate code point, or a value above
/// U+10FFFF) encodes to one [`REPLACEMENT_CHAR`] unit. The output is at
/// most twice as long as the input and preserves input order.
#[allow(clippy::cast_possible_truncation)]
pub fn encode(runes: &[Rune]) -> Vec<u16> {
    let pairs = runes.iter().filter(|&&r| r >= SURR_SELF).count();
    let mut units = Vec::with_capacity(runes.len() + pairs);
    for &r in runes {
        if r < SURR1 || (SURR3..SURR_SELF).contains(&r) {
            units.push(r as u16);
        } else if (SURR_SELF..=MAX_RUNE).contains(&r) {
            let (r1, r2) = encode_rune(r);
            units.push(r1);
            units.push(r2);
        } else {
            units.push(REPLACEMENT_CHAR as u16);
        }
    }
    units
}
