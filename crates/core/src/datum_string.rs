//! Length-prefixed, immutable, cheaply clonable byte strings.
//!
//! A [`DatumString`] sits on a shared [`Bytes`] buffer laid out as an unsigned
//! LEB128 varint holding the byte length, followed by the bytes themselves.
//! The same layout is used when strings are written out, so a buffer holding
//! serialized strings back-to-back can be turned into `DatumString`s without
//! copying.
//!
//! Contents are never mutated once built. Clones share the buffer through an
//! atomic reference count and are safe to hand across threads.

#![forbid(unsafe_code)]

use std::borrow::{Borrow, Cow};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::{BufMut, Bytes, BytesMut};

/// Longest varint needed for a `u64` length.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as an unsigned LEB128 varint.
pub fn write_varint<B: BufMut>(out: &mut B, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.put_u8(byte);
            return;
        }
        out.put_u8(byte | 0x80);
    }
}

/// Decode an unsigned LEB128 varint from the front of `bytes`, returning
/// `(value, bytes_read)`. Truncated input stops at the end of the slice.
pub fn read_varint(bytes: &[u8]) -> (u64, usize) {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut read = 0usize;
    for byte in bytes.iter().take(MAX_VARINT_LEN) {
        read += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    (value, read)
}

pub fn varint_len(mut value: u64) -> usize {
    let mut n = 1;
    while value >= 0x80 {
        value >>= 7;
        n += 1;
    }
    n
}

fn prefixed(parts: &[&[u8]]) -> Bytes {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut buf = BytesMut::with_capacity(varint_len(total as u64) + total);
    write_varint(&mut buf, total as u64);
    for part in parts {
        buf.put_slice(part);
    }
    buf.freeze()
}

/// Immutable length-prefixed string. See the module docs for the layout.
#[derive(Clone)]
pub struct DatumString {
    // Prefix plus bytes, sliced out of a possibly larger shared buffer.
    buf: Bytes,
    prefix: usize,
}

impl DatumString {
    /// Empty string.
    pub fn new() -> Self { Self::from_bytes(&[]) }

    /// Copy `bytes` into a freshly allocated prefixed buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self { Self::from_shared(prefixed(&[bytes])) }

    /// Wrap a buffer that starts with the varint length prefix. Bytes past
    /// the string are left out of the view but stay shared.
    ///
    /// No copy is made and the prefix is trusted. A length running past the end
    /// of the buffer is clamped to the bytes actually present.
    pub fn from_shared(data: Bytes) -> Self { Self::read_prefixed(&data).0 }

    /// Decode one string at the front of `data`, returning it together with
    /// the number of bytes it occupies (prefix included).
    pub fn read_prefixed(data: &Bytes) -> (Self, usize) {
        let (len, prefix) = read_varint(data);
        debug_assert!(prefix as u64 + len <= data.len() as u64, "datum string prefix runs past its buffer");
        let end = (len as usize).saturating_add(prefix).min(data.len());
        (Self { buf: data.slice(..end), prefix }, end)
    }

    pub fn data(&self) -> &[u8] { &self.buf[self.prefix..] }

    pub fn as_bytes(&self) -> &[u8] { self.data() }

    pub fn size(&self) -> usize { self.buf.len() - self.prefix }

    pub fn len(&self) -> usize { self.size() }

    pub fn is_empty(&self) -> bool { self.size() == 0 }

    /// Prefix and bytes exactly as they are laid out in the buffer.
    pub fn serialized(&self) -> &[u8] { &self.buf }

    /// Shared handle on the prefixed bytes, for writing strings back out.
    pub fn to_bytes(&self) -> Bytes { self.buf.clone() }

    /// Lexicographic byte comparison.
    pub fn compare(&self, other: &DatumString) -> Ordering { self.data().cmp(other.data()) }

    /// Owned, growable copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> { self.data().to_vec() }

    pub fn as_str(&self) -> Option<&str> { std::str::from_utf8(self.data()).ok() }

    pub fn to_string_lossy(&self) -> Cow<'_, str> { String::from_utf8_lossy(self.data()) }

    /// Whether both values view the very same bytes in memory (clones do,
    /// equal copies don't).
    pub fn shares_buffer_with(&self, other: &DatumString) -> bool {
        self.buf.as_ptr() == other.buf.as_ptr() && self.buf.len() == other.buf.len()
    }
}

/// New string holding `a`'s bytes followed by `b`'s, in its own buffer.
pub fn concat(a: &DatumString, b: &DatumString) -> DatumString {
    DatumString::from_shared(prefixed(&[a.data(), b.data()]))
}

impl Default for DatumString {
    fn default() -> Self { Self::new() }
}

impl From<&str> for DatumString {
    fn from(s: &str) -> Self { Self::from_bytes(s.as_bytes()) }
}

impl From<String> for DatumString {
    fn from(s: String) -> Self { Self::from_bytes(s.as_bytes()) }
}

impl From<&String> for DatumString {
    fn from(s: &String) -> Self { Self::from_bytes(s.as_bytes()) }
}

impl From<&[u8]> for DatumString {
    fn from(b: &[u8]) -> Self { Self::from_bytes(b) }
}

impl From<Vec<u8>> for DatumString {
    fn from(b: Vec<u8>) -> Self { Self::from_bytes(&b) }
}

impl From<Bytes> for DatumString {
    fn from(data: Bytes) -> Self { Self::from_shared(data) }
}

impl PartialEq for DatumString {
    fn eq(&self, other: &Self) -> bool { self.data() == other.data() }
}

impl Eq for DatumString {}

impl PartialOrd for DatumString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for DatumString {
    fn cmp(&self, other: &Self) -> Ordering { self.compare(other) }
}

// Must agree with `[u8]` hashing so `Borrow<[u8]>` lookups work.
impl Hash for DatumString {
    fn hash<H: Hasher>(&self, state: &mut H) { self.data().hash(state) }
}

impl Borrow<[u8]> for DatumString {
    fn borrow(&self) -> &[u8] { self.data() }
}

impl AsRef<[u8]> for DatumString {
    fn as_ref(&self) -> &[u8] { self.data() }
}

impl PartialEq<str> for DatumString {
    fn eq(&self, other: &str) -> bool { self.data() == other.as_bytes() }
}

impl PartialEq<&str> for DatumString {
    fn eq(&self, other: &&str) -> bool { self.data() == other.as_bytes() }
}

impl PartialEq<String> for DatumString {
    fn eq(&self, other: &String) -> bool { self.data() == other.as_bytes() }
}

impl PartialEq<DatumString> for str {
    fn eq(&self, other: &DatumString) -> bool { self.as_bytes() == other.data() }
}

impl PartialEq<DatumString> for &str {
    fn eq(&self, other: &DatumString) -> bool { self.as_bytes() == other.data() }
}

impl PartialOrd<str> for DatumString {
    fn partial_cmp(&self, other: &str) -> Option<Ordering> { Some(self.data().cmp(other.as_bytes())) }
}

impl fmt::Display for DatumString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_string_lossy()) }
}

impl fmt::Debug for DatumString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:?}", self.to_string_lossy()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_roundtrip_boundaries() {
        for v in [0u64, 1, 127, 128, 300, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            write_varint(&mut buf, v);
            assert_eq!(buf.len(), varint_len(v));
            assert_eq!(read_varint(&buf), (v, buf.len()));
        }
    }

    #[test]
    fn layout_is_prefix_then_bytes() {
        let s = DatumString::from("abc");
        assert_eq!(s.serialized(), &[3, b'a', b'b', b'c']);
        assert_eq!(s.size(), 3);
        assert!(!s.is_empty());
        assert!(DatumString::new().is_empty());
        assert_eq!(DatumString::new().serialized(), &[0]);
    }

    #[test]
    fn long_strings_use_multibyte_prefix() {
        let bytes = vec![b'x'; 300];
        let s = DatumString::from_bytes(&bytes);
        assert_eq!(&s.serialized()[..2], &[0xac, 0x02]);
        assert_eq!(s.data(), &bytes[..]);
    }

    #[test]
    fn clone_shares_and_outlives_original() {
        let original = DatumString::from("shared bytes");
        let copy = original.clone();
        assert!(copy.shares_buffer_with(&original));
        drop(original);
        assert_eq!(copy, "shared bytes");
    }

    #[test]
    fn embedded_nul_is_kept() {
        let s = DatumString::from_bytes(b"a\0b");
        assert_eq!(s.size(), 3);
        assert_eq!(s.data(), b"a\0b");
        assert_eq!(s.as_str(), Some("a\0b"));
    }

    #[test]
    fn compare_is_bytewise() {
        let a = DatumString::from("abc");
        let b = DatumString::from("abd");
        let prefix = DatumString::from("ab");
        assert_eq!(a.compare(&b), Ordering::Less);
        assert!(prefix < a);
        assert!(b > a);
        assert_eq!(a.compare(&DatumString::from("abc")), Ordering::Equal);
        assert!(a == "abc" && "abc" == a);
        assert!(a != "abd");
    }

    #[test]
    fn concat_is_independent_of_inputs() {
        let a = DatumString::from("foo");
        let b = DatumString::from_bytes(&[0xff, 0x00]);
        let c = concat(&a, &b);
        drop(a);
        drop(b);
        assert_eq!(c.size(), 5);
        assert_eq!(c.data(), &[b'f', b'o', b'o', 0xff, 0x00]);
        assert!(concat(&DatumString::new(), &DatumString::new()).is_empty());
    }

    #[test]
    fn reads_packed_strings_without_copying() {
        let mut packed = BytesMut::new();
        for s in ["db", "", "table"] {
            write_varint(&mut packed, s.len() as u64);
            packed.put_slice(s.as_bytes());
        }
        let packed = packed.freeze();
        let base = packed.as_ptr() as usize;
        let mut cursor = packed.clone();
        let mut out = Vec::new();
        for _ in 0..3 {
            let (s, used) = DatumString::read_prefixed(&cursor);
            cursor = cursor.slice(used..);
            out.push(s);
        }
        assert_eq!(out[0], "db");
        assert!(out[1].is_empty());
        assert_eq!(out[2], "table");
        // "table" starts after "db" (1 + 2) and "" (1).
        assert_eq!(out[2].serialized().as_ptr() as usize, base + 4);
        assert!(cursor.is_empty());
    }

    #[test]
    fn trailing_bytes_are_not_part_of_the_string() {
        let s = DatumString::from_shared(Bytes::from_static(&[2, b'o', b'k', 9, 9]));
        assert_eq!(s, "ok");
        assert_eq!(s.serialized(), &[2, b'o', b'k']);
        assert_eq!(s.to_bytes(), Bytes::from_static(&[2, b'o', b'k']));
    }

    #[test]
    fn empty_inputs_read_as_empty_strings() {
        let (s, used) = DatumString::read_prefixed(&Bytes::from_static(&[0]));
        assert!(s.is_empty());
        assert_eq!(used, 1);
        let (s, used) = DatumString::read_prefixed(&Bytes::new());
        assert!(s.is_empty());
        assert_eq!(used, 0);
    }

    #[test]
    fn clones_from_many_threads() {
        let s = DatumString::from("concurrent");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = s.clone();
                std::thread::spawn(move || {
                    let copies: Vec<_> = (0..100).map(|_| s.clone()).collect();
                    copies.iter().all(|c| c == "concurrent")
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(s, "concurrent");
    }
}
