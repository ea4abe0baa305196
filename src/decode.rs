//! Unpacking: bytes → `Value`.

use crate::cursor::ReadCursor;
use crate::error::CodecError;
use crate::tag;
use crate::value::{Table, Value};

/// Unpacks a buffer into its ordered sequence of top-level values.
///
/// The stream has no header; values are decoded until the input is exhausted.
/// Empty input yields an empty sequence. Any malformed or truncated value
/// fails the whole call; no partial sequence is returned.
pub fn unpack(buf: &[u8]) -> Result<Vec<Value>, CodecError> {
    let mut cur = ReadCursor::new(buf);
    let mut values = Vec::new();
    while !cur.is_empty() {
        values.push(decode_value(&mut cur)?);
    }
    tracing::trace!(bytes = buf.len(), values = values.len(), "unpacked value stream");
    Ok(values)
}

/// Decodes a single value from the cursor.
pub fn decode_value(cur: &mut ReadCursor<'_>) -> Result<Value, CodecError> {
    let lead = cur.read(1)?[0];
    let (ty, cookie) = tag::split(lead);
    match ty {
        tag::NIL => Ok(Value::Nil),
        tag::BOOLEAN => Ok(Value::Bool(cookie != 0)),
        tag::NUMBER => decode_number(cur, cookie),
        tag::POINTER => {
            let bytes: [u8; size_of::<usize>()] = read_array(cur)?;
            Ok(Value::Pointer(usize::from_ne_bytes(bytes)))
        }
        tag::SHORT_STR => Ok(Value::Str(cur.read(cookie as usize)?.to_vec())),
        tag::LONG_STR => decode_long_str(cur, cookie),
        tag::TABLE => decode_table(cur, cookie),
        _ => Err(CodecError::InvalidTag(lead)),
    }
}

/// Reads a fixed-width payload as an array.
fn read_array<const N: usize>(cur: &mut ReadCursor<'_>) -> Result<[u8; N], CodecError> {
    let mut out = [0u8; N];
    out.copy_from_slice(cur.read(N)?);
    Ok(out)
}

fn decode_number(cur: &mut ReadCursor<'_>, cookie: u8) -> Result<Value, CodecError> {
    match cookie {
        tag::WIDTH_ZERO => Ok(Value::Int(0)),
        tag::WIDTH_U8 => Ok(Value::Int(i32::from(cur.read(1)?[0]))),
        tag::WIDTH_U16 => Ok(Value::Int(i32::from(u16::from_ne_bytes(read_array(cur)?)))),
        tag::WIDTH_I32 => Ok(Value::Int(i32::from_ne_bytes(read_array(cur)?))),
        tag::WIDTH_F64 => Ok(Value::Float(f64::from_ne_bytes(read_array(cur)?))),
        other => Err(CodecError::InvalidLength(other)),
    }
}

fn decode_long_str(cur: &mut ReadCursor<'_>, cookie: u8) -> Result<Value, CodecError> {
    let len = match cookie {
        2 => u16::from_ne_bytes(read_array(cur)?) as usize,
        4 => u32::from_ne_bytes(read_array(cur)?) as usize,
        other => return Err(CodecError::InvalidLength(other)),
    };
    Ok(Value::Str(cur.read(len)?.to_vec()))
}

fn decode_table(cur: &mut ReadCursor<'_>, cookie: u8) -> Result<Value, CodecError> {
    let array_size = if cookie == tag::ESCAPE {
        decode_table_size(cur)?
    } else {
        cookie as usize
    };

    // Every element occupies at least one byte, so the remaining input bounds
    // how much a hostile size field may preallocate.
    let mut table = Table {
        array: Vec::with_capacity(array_size.min(cur.remaining())),
        map: Vec::new(),
    };
    for _ in 0..array_size {
        let item = decode_value(cur)?;
        table.array.push(item);
    }

    // Map part runs until the nil key sentinel.
    loop {
        let key = decode_value(cur)?;
        if key.is_nil() {
            break;
        }
        let value = decode_value(cur)?;
        table.insert(key, value);
    }
    Ok(Value::Table(table))
}

/// Decodes the explicit array size that follows an escaped table cookie.
fn decode_table_size(cur: &mut ReadCursor<'_>) -> Result<usize, CodecError> {
    let lead = cur.read(1)?[0];
    let (ty, cookie) = tag::split(lead);
    if ty != tag::NUMBER {
        return Err(CodecError::InvalidTag(lead));
    }
    match decode_number(cur, cookie)? {
        Value::Int(n) if n >= 0 => Ok(n as usize),
        _ => Err(CodecError::InvalidLength(cookie)),
    }
}
