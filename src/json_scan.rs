//! Byte-level JSON scanning used to peek at a payload before committing to a
//! full decode.
//!
//! The scanner validates structure only as far as it needs to find value
//! boundaries; the real decode still goes through `serde_json`.

use std::borrow::Cow;
use std::ops::Range;

/// The scanned bytes are not well-formed JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Malformed;

type Scan<T> = Result<T, Malformed>;

#[inline]
pub(crate) fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while let Some(b' ' | b'\n' | b'\r' | b'\t') = bytes.get(i) {
        i += 1;
    }
    i
}

#[inline]
fn string_end(bytes: &[u8], start: usize) -> Scan<usize> {
    if bytes.get(start) != Some(&b'"') {
        return Err(Malformed);
    }
    let mut i = start + 1;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'"' => return Ok(i + 1),
            b'\\' => i += 2,
            0x00..=0x1F => return Err(Malformed),
            _ => i += 1,
        }
    }
    Err(Malformed)
}

#[inline]
fn value_end(bytes: &[u8], start: usize) -> Scan<usize> {
    let i = skip_ws(bytes, start);
    match bytes.get(i) {
        Some(b'"') => string_end(bytes, i),
        Some(b'{') => container_end(bytes, i, b'}', true),
        Some(b'[') => container_end(bytes, i, b']', false),
        Some(b't') => literal_end(bytes, i, b"true"),
        Some(b'f') => literal_end(bytes, i, b"false"),
        Some(b'n') => literal_end(bytes, i, b"null"),
        Some(b'-' | b'0'..=b'9') => number_end(bytes, i),
        _ => Err(Malformed),
    }
}

/// Shared walker for objects (`keyed`) and arrays.
fn container_end(bytes: &[u8], start: usize, close: u8, keyed: bool) -> Scan<usize> {
    let mut i = skip_ws(bytes, start + 1);
    if bytes.get(i) == Some(&close) {
        return Ok(i + 1);
    }
    loop {
        if keyed {
            i = string_end(bytes, skip_ws(bytes, i))?;
            i = skip_ws(bytes, i);
            if bytes.get(i) != Some(&b':') {
                return Err(Malformed);
            }
            i += 1;
        }
        i = skip_ws(bytes, value_end(bytes, i)?);
        match bytes.get(i) {
            Some(b',') => i += 1,
            Some(&b) if b == close => return Ok(i + 1),
            _ => return Err(Malformed),
        }
    }
}

#[inline]
fn literal_end(bytes: &[u8], start: usize, lit: &[u8]) -> Scan<usize> {
    let end = start + lit.len();
    match bytes.get(start..end) {
        Some(found) if found == lit => Ok(end),
        _ => Err(Malformed),
    }
}

#[inline]
fn digits_end(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}

fn number_end(bytes: &[u8], start: usize) -> Scan<usize> {
    let mut i = start;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    i = match bytes.get(i) {
        Some(b'0') => i + 1,
        Some(b'1'..=b'9') => digits_end(bytes, i + 1),
        _ => return Err(Malformed),
    };
    if bytes.get(i) == Some(&b'.') {
        let end = digits_end(bytes, i + 1);
        if end == i + 1 {
            return Err(Malformed);
        }
        i = end;
    }
    if let Some(b'e' | b'E') = bytes.get(i) {
        i += 1;
        if let Some(b'+' | b'-') = bytes.get(i) {
            i += 1;
        }
        let end = digits_end(bytes, i);
        if end == i {
            return Err(Malformed);
        }
        i = end;
    }
    Ok(i)
}

/// Locate the raw value of a top-level object member without decoding the
/// rest of the object. With duplicate keys the last one wins.
pub(crate) fn find_top_level_field_value_range(
    bytes: &[u8],
    field_name: &[u8],
) -> Scan<Option<Range<usize>>> {
    let mut i = skip_ws(bytes, 0);
    if bytes.get(i) != Some(&b'{') {
        return Err(Malformed);
    }
    i += 1;

    let mut last_match = None;
    loop {
        i = skip_ws(bytes, i);
        match bytes.get(i) {
            Some(b'}') => return Ok(last_match),
            Some(b'"') => {}
            _ => return Err(Malformed),
        }

        let key_end = string_end(bytes, i)?;
        let key = &bytes[i + 1..key_end - 1];

        i = skip_ws(bytes, key_end);
        if bytes.get(i) != Some(&b':') {
            return Err(Malformed);
        }
        let value_start = skip_ws(bytes, i + 1);
        let value_end = value_end(bytes, value_start)?;
        if key == field_name {
            last_match = Some(value_start..value_end);
        }
        i = skip_ws(bytes, value_end);

        match bytes.get(i) {
            Some(b',') => i += 1,
            Some(b'}') => return Ok(last_match),
            _ => return Err(Malformed),
        }
    }
}

/// Read a top-level member as text. String values are unquoted; any other
/// value is returned as its raw JSON text.
pub(crate) fn top_level_text_field<'a>(
    bytes: &'a [u8],
    field_name: &[u8],
) -> Scan<Option<Cow<'a, str>>> {
    let Some(range) = find_top_level_field_value_range(bytes, field_name)? else {
        return Ok(None);
    };
    let raw = &bytes[range];
    if raw.first() == Some(&b'"') {
        if let Some(borrowed) = unescaped_str(raw) {
            return Ok(Some(Cow::Borrowed(borrowed)));
        }
        return serde_json::from_slice::<String>(raw)
            .map(|s| Some(Cow::Owned(s)))
            .map_err(|_| Malformed);
    }
    std::str::from_utf8(raw)
        .map(|s| Some(Cow::Borrowed(s)))
        .map_err(|_| Malformed)
}

/// Borrow the contents of a string literal that contains no escapes.
fn unescaped_str(literal: &[u8]) -> Option<&str> {
    let inner = literal.strip_prefix(b"\"")?.strip_suffix(b"\"")?;
    if memchr::memchr2(b'\\', b'"', inner).is_some() {
        return None;
    }
    std::str::from_utf8(inner).ok()
}

/// Decode a complete JSON string literal, handling only the common escapes.
///
/// `literal` must start and end with a quote and carry nothing else. Returns
/// `None` for `\/`, `\uXXXX`, raw control bytes or anything else it does not
/// handle; callers then fall back to `serde_json`, which agrees with this
/// function on every input both accept.
pub(crate) fn unquote_fast(literal: &[u8]) -> Option<String> {
    let inner = literal.strip_prefix(b"\"")?.strip_suffix(b"\"")?;
    if memchr::memchr(b'\\', inner).is_none() {
        if inner.iter().any(|&b| b == b'"' || b < 0x20) {
            return None;
        }
        return std::str::from_utf8(inner).ok().map(str::to_owned);
    }

    let mut out = Vec::with_capacity(inner.len());
    let mut iter = inner.iter().copied();
    while let Some(b) = iter.next() {
        match b {
            b'\\' => {
                let unescaped = match iter.next()? {
                    b'"' => b'"',
                    b'\\' => b'\\',
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'b' => 0x08,
                    b'f' => 0x0C,
                    _ => return None,
                };
                out.push(unescaped);
            }
            b'"' | 0x00..=0x1F => return None,
            _ => out.push(b),
        }
    }
    String::from_utf8(out).ok()
}
