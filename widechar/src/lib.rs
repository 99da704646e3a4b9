//! Conversions between platform wide-character buffers and Rust strings,
//! backed by the [`utf16`] codec. Malformed wide data never fails a
//! conversion; it surfaces as U+FFFD in the resulting string.

use std::ptr::copy_nonoverlapping;

use log::{debug, trace};

/// One platform wide character: 16 bits by default, 32 bits with the
/// `utf32` feature. With `utf32` each wide character is narrowed to 16
/// bits before decoding; callers must guarantee the source data is
/// UTF-16 content stored in wider units.
#[cfg(not(feature = "utf32"))]
pub type WideChar = u16;
#[cfg(feature = "utf32")]
pub type WideChar = u32;

const MAX_PARSE_LEN: usize = 1024;

#[cfg(not(feature = "utf32"))]
fn to_code_units(v: &[WideChar]) -> Vec<u16> {
    v.to_vec()
}

#[cfg(feature = "utf32")]
#[allow(clippy::cast_possible_truncation)]
fn to_code_units(v: &[WideChar]) -> Vec<u16> {
    v.iter().map(|&c| c as u16).collect()
}

pub fn from_widechar_vec_lossy(v: Vec<WideChar>) -> String {
    from_widechar_ref_lossy(&v)
}

pub fn from_widechar_ref_lossy(v: &[WideChar]) -> String {
    utf16::decode(&to_code_units(v))
        .into_iter()
        .map(|r| char::from_u32(r).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect::<String>()
}

#[cfg(not(feature = "utf32"))]
pub fn to_widechar_vec(s: &str) -> Vec<WideChar> {
    let runes = s.chars().map(u32::from).collect::<Vec<_>>();
    utf16::encode(&runes)
}

#[cfg(feature = "utf32")]
pub fn to_widechar_vec(s: &str) -> Vec<WideChar> {
    let runes = s.chars().map(u32::from).collect::<Vec<_>>();
    utf16::encode(&runes)
        .into_iter()
        .map(WideChar::from)
        .collect::<Vec<_>>()
}

/// Converts a nul-terminated wide character string to a rust string.
///
/// This function will attempt to read in up to 1024 characters, so the
/// buffer behind `text` must be at least that long.
///
/// # Safety
/// Because this is a C-interface, this is necessarily unsafe
///
pub unsafe fn parse_null_terminated_w(text: *const WideChar) -> Option<String> {
    let string = unsafe { input_wtext_to_string(text, MAX_PARSE_LEN) };
    match string.split_once(char::from(0)) {
        Some((string, _)) => Some(string.to_string()),
        _ => {
            debug!("parse_null_terminated_w: no nul terminator within {MAX_PARSE_LEN} characters");
            None
        }
    }
}

///
/// input_wtext_to_string converts a wide character buffer to a rust String.
/// It assumes nul termination if the supplied length is negative.
///
/// # Safety
/// This reads raw C-pointers, which requires unsafe operations
///
#[allow(clippy::uninit_vec, clippy::cast_possible_wrap)]
pub unsafe fn input_wtext_to_string(text: *const WideChar, len: usize) -> String {
    trace!("input_wtext_to_string: len={len}");
    if (len as isize) < 0 {
        let mut dst = Vec::new();
        let mut itr = text;
        {
            while *itr != 0 {
                dst.push(*itr);
                itr = itr.offset(1);
            }
        }
        return from_widechar_vec_lossy(dst);
    }

    let mut dst = Vec::with_capacity(len);
    dst.set_len(len);
    copy_nonoverlapping(text, dst.as_mut_ptr(), len);
    from_widechar_vec_lossy(dst)
}

pub fn to_widechar_ptr(s: &str) -> (*mut WideChar, Vec<WideChar>) {
    let mut v = to_widechar_vec(s);
    v.push(0);
    (v.as_mut_ptr(), v)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip_ascii() {
        let expected = "test";
        assert_eq!(expected, from_widechar_vec_lossy(to_widechar_vec(expected)));
    }

    #[test]
    fn test_round_trip_astral() {
        let expected = "caf\u{E9} \u{1F600} \u{1D11E}";
        assert_eq!(expected, from_widechar_vec_lossy(to_widechar_vec(expected)));
    }

    #[test]
    fn test_surrogate_pair_decodes() {
        let v: Vec<WideChar> = vec![0xD83D, 0xDE00];
        assert_eq!("\u{1F600}", from_widechar_ref_lossy(&v));
    }

    #[test]
    fn test_lossy_replacement() {
        let v: Vec<WideChar> = vec![0x0074, 0xD800, 0x0074];
        assert_eq!("t\u{FFFD}t", from_widechar_ref_lossy(&v));
    }

    #[test]
    fn test_input_wtext_to_string() {
        let expected = "test";
        let test = to_widechar_vec(expected);
        let test = test.as_ptr();
        let test = unsafe { input_wtext_to_string(test, expected.len()) };
        assert_eq!(expected, test);
    }

    #[test]
    fn test_input_wtext_to_string_nul_terminated() {
        let mut v = to_widechar_vec("test");
        v.push(0);
        let test = unsafe { input_wtext_to_string(v.as_ptr(), usize::MAX) };
        assert_eq!("test", test);
    }

    #[test]
    fn test_parse_null_terminated_w() {
        let mut buf: Vec<WideChar> = vec![0; MAX_PARSE_LEN];
        let prefix = to_widechar_vec("test");
        buf[..prefix.len()].copy_from_slice(&prefix);
        let parsed = unsafe { parse_null_terminated_w(buf.as_ptr()) };
        assert_eq!("test", parsed.unwrap());
    }

    #[test]
    fn test_parse_null_terminated_w_unterminated() {
        let buf: Vec<WideChar> = vec![0x74; MAX_PARSE_LEN];
        let parsed = unsafe { parse_null_terminated_w(buf.as_ptr()) };
        assert_eq!(None, parsed);
    }

    #[test]
    fn test_to_widechar_ptr_is_nul_terminated() {
        let (ptr, v) = to_widechar_ptr("test");
        assert!(!ptr.is_null());
        assert_eq!(Some(&0), v.last());
        assert_eq!("test", from_widechar_ref_lossy(&v[..v.len() - 1]));
    }

    #[cfg(feature = "utf32")]
    #[test]
    fn test_utf32_units_narrow_before_decoding() {
        // a surrogate pair carried in 32-bit wide characters
        let v: Vec<WideChar> = vec![0xD83D, 0xDE00];
        assert_eq!("\u{1F600}", from_widechar_ref_lossy(&v));
    }
}
