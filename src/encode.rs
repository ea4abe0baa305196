//! Packing: `Value` → bytes.

use bytes::Bytes;

use crate::buffer::WriteBuffer;
use crate::error::CodecError;
use crate::tag;
use crate::value::{Table, Value, as_exact_i32};

/// Maximum table nesting depth from the top-level `pack` call.
pub const MAX_DEPTH: usize = 32;

/// Packs a sequence of values into one contiguous buffer.
///
/// Values are emitted left to right with no separators; each encoded value is
/// self-delimiting. On any failure no partial buffer escapes.
pub fn pack(values: &[Value]) -> Result<Bytes, CodecError> {
    let mut wb = WriteBuffer::new();
    for value in values {
        encode_value(&mut wb, value, 0)?;
    }
    let buf = wb.finish();
    tracing::trace!(values = values.len(), bytes = buf.len(), "packed value stream");
    Ok(buf)
}

/// Encodes one value into the buffer at the given nesting depth.
pub fn encode_value(
    wb: &mut WriteBuffer,
    value: &Value,
    depth: usize,
) -> Result<(), CodecError> {
    match value {
        Value::Nil => {
            wb.push(&[tag::combine(tag::NIL, 0)]);
            Ok(())
        }
        Value::Bool(b) => {
            wb.push(&[tag::combine(tag::BOOLEAN, u8::from(*b))]);
            Ok(())
        }
        Value::Int(i) => {
            encode_int(wb, *i);
            Ok(())
        }
        Value::Float(f) => {
            encode_float(wb, *f);
            Ok(())
        }
        Value::Pointer(p) => {
            encode_pointer(wb, *p);
            Ok(())
        }
        Value::Str(s) => encode_str(wb, s),
        Value::Table(t) => encode_table(wb, t, depth),
    }
}

/// Emits an integer using the smallest payload width that holds it.
fn encode_int(wb: &mut WriteBuffer, v: i32) {
    if v == 0 {
        wb.push(&[tag::combine(tag::NUMBER, tag::WIDTH_ZERO)]);
    } else if v < 0 {
        wb.push(&[tag::combine(tag::NUMBER, tag::WIDTH_I32)]);
        wb.push(&v.to_ne_bytes());
    } else if v < 0x100 {
        wb.push(&[tag::combine(tag::NUMBER, tag::WIDTH_U8), v as u8]);
    } else if v < 0x10000 {
        wb.push(&[tag::combine(tag::NUMBER, tag::WIDTH_U16)]);
        wb.push(&(v as u16).to_ne_bytes());
    } else {
        wb.push(&[tag::combine(tag::NUMBER, tag::WIDTH_I32)]);
        wb.push(&v.to_ne_bytes());
    }
}

fn encode_float(wb: &mut WriteBuffer, v: f64) {
    // Integral-fit floats take the compact integer encoding.
    match as_exact_i32(v) {
        Some(i) => encode_int(wb, i),
        None => {
            wb.push(&[tag::combine(tag::NUMBER, tag::WIDTH_F64)]);
            wb.push(&v.to_ne_bytes());
        }
    }
}

fn encode_pointer(wb: &mut WriteBuffer, p: usize) {
    wb.push(&[tag::combine(tag::POINTER, 0)]);
    wb.push(&p.to_ne_bytes());
}

fn encode_str(wb: &mut WriteBuffer, s: &[u8]) -> Result<(), CodecError> {
    let len = s.len();
    if len < tag::MAX_COOKIE as usize {
        wb.push(&[tag::combine(tag::SHORT_STR, len as u8)]);
    } else if len < 0x10000 {
        wb.push(&[tag::combine(tag::LONG_STR, 2)]);
        wb.push(&(len as u16).to_ne_bytes());
    } else if len <= u32::MAX as usize {
        wb.push(&[tag::combine(tag::LONG_STR, 4)]);
        wb.push(&(len as u32).to_ne_bytes());
    } else {
        return Err(CodecError::Unsupported(format!(
            "string of {len} bytes exceeds the 32-bit length limit"
        )));
    }
    wb.push(s);
    Ok(())
}

fn encode_table(wb: &mut WriteBuffer, t: &Table, depth: usize) -> Result<(), CodecError> {
    if depth >= MAX_DEPTH {
        return Err(CodecError::DepthExceeded);
    }

    // Array part: contiguous positive-integer keys can sit in the map part
    // when the table was assembled out of order, so the scan continues past
    // the stored array until the first gap.
    let mut tail: Vec<&Value> = Vec::new();
    loop {
        let next = t.array.len() + tail.len() + 1;
        let found = t
            .map
            .iter()
            .find(|(k, _)| matches!(k, Value::Int(i) if *i >= 1 && *i as usize == next));
        match found {
            Some((_, v)) => tail.push(v),
            None => break,
        }
    }
    let array_size = t.array.len() + tail.len();

    // Inline size, or the escape cookie plus an explicit size.
    if array_size >= tag::ESCAPE as usize {
        let size = i32::try_from(array_size).map_err(|_| {
            CodecError::Unsupported(format!(
                "table array part of {array_size} elements exceeds the 32-bit size limit"
            ))
        })?;
        wb.push(&[tag::combine(tag::TABLE, tag::ESCAPE)]);
        encode_int(wb, size);
    } else {
        wb.push(&[tag::combine(tag::TABLE, array_size as u8)]);
    }
    for item in t.array.iter().chain(tail) {
        encode_value(wb, item, depth + 1)?;
    }

    // Map part, terminated by a nil key.
    for (key, value) in &t.map {
        match key {
            // Already emitted positionally in the array part.
            Value::Int(i) if *i >= 1 && (*i as usize) <= array_size => continue,
            Value::Nil => {
                return Err(CodecError::Unsupported("nil table key".into()));
            }
            Value::Float(f) if f.is_nan() => {
                return Err(CodecError::Unsupported("NaN table key".into()));
            }
            _ => {}
        }
        encode_value(wb, key, depth + 1)?;
        encode_value(wb, value, depth + 1)?;
    }
    wb.push(&[tag::combine(tag::NIL, 0)]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_nil_tag() {
        let buf = pack(&[Value::Nil]).unwrap();
        assert_eq!(&buf[..], &[0x00]);
    }

    #[test]
    fn encode_booleans() {
        let buf = pack(&[Value::Bool(true), Value::Bool(false)]).unwrap();
        assert_eq!(&buf[..], &[0x09, 0x01]);
    }

    #[test]
    fn encode_int_widths() {
        // 0: tag only.
        let buf = pack(&[Value::Int(0)]).unwrap();
        assert_eq!(&buf[..], &[0x02]);

        // 255: tag + 1 byte.
        let buf = pack(&[Value::Int(255)]).unwrap();
        assert_eq!(&buf[..], &[0x0A, 0xFF]);

        // 256: tag + 2 bytes.
        let buf = pack(&[Value::Int(256)]).unwrap();
        let mut expected = vec![0x12];
        expected.extend_from_slice(&256u16.to_ne_bytes());
        assert_eq!(&buf[..], &expected[..]);

        // -1: tag + 4 bytes.
        let buf = pack(&[Value::Int(-1)]).unwrap();
        let mut expected = vec![0x22];
        expected.extend_from_slice(&(-1i32).to_ne_bytes());
        assert_eq!(&buf[..], &expected[..]);

        // 65536: tag + 4 bytes.
        let buf = pack(&[Value::Int(65536)]).unwrap();
        let mut expected = vec![0x22];
        expected.extend_from_slice(&65536i32.to_ne_bytes());
        assert_eq!(&buf[..], &expected[..]);
    }

    #[test]
    fn encode_float64() {
        let buf = pack(&[Value::Float(1.5)]).unwrap();
        let mut expected = vec![0x42];
        expected.extend_from_slice(&1.5f64.to_ne_bytes());
        assert_eq!(&buf[..], &expected[..]);
    }

    #[test]
    fn encode_integral_float_as_int() {
        assert_eq!(&pack(&[Value::Float(2.0)]).unwrap()[..], &[0x0A, 0x02]);
        assert_eq!(&pack(&[Value::Float(0.0)]).unwrap()[..], &[0x02]);
    }

    #[test]
    fn encode_pointer_payload() {
        let buf = pack(&[Value::Pointer(0xDEAD)]).unwrap();
        assert_eq!(buf[0], 0x03);
        assert_eq!(&buf[1..], &0xDEADusize.to_ne_bytes());
    }

    #[test]
    fn encode_short_string_boundary() {
        let buf = pack(&[Value::from("")]).unwrap();
        assert_eq!(&buf[..], &[0x04]);

        let buf = pack(&[Value::from("hi")]).unwrap();
        assert_eq!(&buf[..], &[0x14, b'h', b'i']);

        // 31 bytes: still short, length inline in the cookie.
        let s = "a".repeat(31);
        let buf = pack(&[Value::from(s.as_str())]).unwrap();
        assert_eq!(buf[0], tag::combine(tag::SHORT_STR, 31));
        assert_eq!(buf.len(), 32);
    }

    #[test]
    fn encode_long_string_boundary() {
        // 32 bytes: long string with a 2-byte length field.
        let s = "a".repeat(32);
        let buf = pack(&[Value::from(s.as_str())]).unwrap();
        assert_eq!(buf[0], tag::combine(tag::LONG_STR, 2));
        assert_eq!(&buf[1..3], &32u16.to_ne_bytes());
        assert_eq!(buf.len(), 35);

        // 65536 bytes: 4-byte length field.
        let s = vec![b'x'; 65536];
        let buf = pack(&[Value::Str(s)]).unwrap();
        assert_eq!(buf[0], tag::combine(tag::LONG_STR, 4));
        assert_eq!(&buf[1..5], &65536u32.to_ne_bytes());
    }

    #[test]
    fn encode_table_inline_array_size() {
        let t = Table::from_array(vec![Value::Int(0); 30]);
        let buf = pack(&[Value::Table(t)]).unwrap();
        assert_eq!(buf[0], tag::combine(tag::TABLE, 30));
        // 30 zero elements + nil terminator.
        assert_eq!(buf.len(), 32);
    }

    #[test]
    fn encode_table_escaped_array_size() {
        let t = Table::from_array(vec![Value::Int(0); 31]);
        let buf = pack(&[Value::Table(t)]).unwrap();
        assert_eq!(buf[0], tag::combine(tag::TABLE, tag::ESCAPE));
        // Explicit size 31 as a 1-byte integer.
        assert_eq!(&buf[1..3], &[0x0A, 31]);
    }

    #[test]
    fn encode_skips_map_keys_covered_by_array() {
        let mut covered = Table::from_array(vec![Value::from("a")]);
        covered.map.push((Value::Int(1), Value::from("shadowed")));
        let plain = Table::from_array(vec![Value::from("a")]);
        assert_eq!(
            &pack(&[Value::Table(covered)]).unwrap()[..],
            &pack(&[Value::Table(plain)]).unwrap()[..],
        );
    }

    #[test]
    fn out_of_order_inserts_encode_full_array_part() {
        let mut t = Table::new();
        t.insert(Value::Int(1), "a".into());
        t.insert(Value::Int(3), "c".into());
        t.insert(Value::Int(2), "b".into());
        let buf = pack(&[Value::Table(t)]).unwrap();
        assert_eq!(tag::split(buf[0]), (tag::TABLE, 3));
    }

    #[test]
    fn map_held_contiguous_keys_join_array_part() {
        // Built directly, bypassing insert's canonicalization.
        let mut gappy = Table::from_array(vec![Value::from("a"), Value::from("b")]);
        gappy.map.push((Value::Int(3), Value::from("c")));
        let flat =
            Table::from_array(vec![Value::from("a"), Value::from("b"), Value::from("c")]);
        assert_eq!(
            &pack(&[Value::Table(gappy)]).unwrap()[..],
            &pack(&[Value::Table(flat)]).unwrap()[..],
        );
    }

    #[test]
    fn nan_map_key_is_unsupported() {
        let mut t = Table::new();
        t.map.push((Value::Float(f64::NAN), Value::Int(1)));
        match pack(&[Value::Table(t)]) {
            Err(CodecError::Unsupported(_)) => {}
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn nil_map_key_is_unsupported() {
        let mut t = Table::new();
        t.map.push((Value::Nil, Value::Int(1)));
        match pack(&[Value::Table(t)]) {
            Err(CodecError::Unsupported(_)) => {}
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    fn nested_table(levels: usize) -> Value {
        let mut v = Value::Table(Table::new());
        for _ in 1..levels {
            v = Value::Table(Table::from_array(vec![v]));
        }
        v
    }

    #[test]
    fn depth_guard_allows_32_levels() {
        assert!(pack(&[nested_table(32)]).is_ok());
    }

    #[test]
    fn depth_guard_rejects_33_levels() {
        match pack(&[nested_table(33)]) {
            Err(CodecError::DepthExceeded) => {}
            other => panic!("expected DepthExceeded, got {other:?}"),
        }
    }

    #[test]
    fn multi_value_stream_concatenates() {
        let buf = pack(&[Value::Bool(true), Value::from("hi")]).unwrap();
        assert_eq!(&buf[..], &[0x09, 0x14, b'h', b'i']);
    }
}
