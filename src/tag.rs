//! Tag byte constants: 3-bit type | 5-bit cookie.
//!
//! Every encoded value begins with one lead byte. The low three bits select
//! the value type; the high five bits carry a type-specific cookie (a literal,
//! an inline length, or a payload-width selector).

// Value types (low 3 bits).
pub const NIL: u8 = 0;
pub const BOOLEAN: u8 = 1;
// Number cookie is a payload-width selector: 0 (literal zero), 1 (u8),
// 2 (u16), 4 (i32, covers all negatives), 8 (f64).
pub const NUMBER: u8 = 2;
pub const POINTER: u8 = 3;
// Short string cookie is the literal byte length, 0..=31.
pub const SHORT_STR: u8 = 4;
// Long string cookie selects the width of the explicit length field: 2 or 4.
pub const LONG_STR: u8 = 5;
// Table cookie is the inline array-part size, or ESCAPE followed by an
// explicit Number-encoded size.
pub const TABLE: u8 = 6;

// Number width cookies.
pub const WIDTH_ZERO: u8 = 0;
pub const WIDTH_U8: u8 = 1;
pub const WIDTH_U16: u8 = 2;
pub const WIDTH_I32: u8 = 4;
pub const WIDTH_F64: u8 = 8;

/// Cookie capacity; cookies occupy 5 bits.
pub const MAX_COOKIE: u8 = 32;

/// Maximum cookie value; a table array size of this value means the true
/// size follows as an explicit Number.
pub const ESCAPE: u8 = MAX_COOKIE - 1;

/// Combines a type and cookie into a tag byte.
#[inline]
pub const fn combine(ty: u8, cookie: u8) -> u8 {
    ty | (cookie << 3)
}

/// Splits a tag byte into (type, cookie).
#[inline]
pub const fn split(tag: u8) -> (u8, u8) {
    (tag & 0x07, tag >> 3)
}
