// Field-level serialization for JDWP packet bodies
//
// Every field type encodes/decodes against the connection's announced
// identifier widths (`IdSizes`); fixed-width primitives ignore them.
// `JdwpReader` tracks its position so malformed input reports the byte
// offset it failed at.

use bytes::{BufMut, BytesMut};

use crate::protocol::{JdwpError, JdwpResult};
use crate::types::{ArrayRegion, IdKind, IdSizes, Location, Tag, TaggedObjectId, Value};
use crate::wire;

/// Builds a packet body.
#[derive(Debug, Default)]
pub struct JdwpWriter {
    buf: BytesMut,
}

impl JdwpWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.put_u8(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.put_i16(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.put_f32(v);
    }

    pub fn write_f64(&mut self, v: f64) {
        self.buf.put_f64(v);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a variable-width identifier at the width the connection
    /// announced for `kind`.
    pub fn write_id(&mut self, kind: IdKind, id: u64, sizes: &IdSizes) -> JdwpResult<()> {
        let width = sizes.width_of(kind);
        if width > 8 {
            return Err(JdwpError::protocol(
                self.buf.len(),
                format!("id width {width} out of range"),
            ));
        }
        wire::put_id_be(&mut self.buf, id, width);
        Ok(())
    }

    /// Length-prefixed string; the bytes pass through opaquely.
    pub fn write_string(&mut self, s: &str) {
        self.buf.put_u32(s.len() as u32);
        self.buf.put_slice(s.as_bytes());
    }

    pub fn write_location(&mut self, loc: &Location, sizes: &IdSizes) -> JdwpResult<()> {
        self.write_u8(loc.type_tag);
        self.write_id(IdKind::Object, loc.class_id, sizes)?;
        self.write_id(IdKind::Method, loc.method_id, sizes)?;
        self.write_u64(loc.index);
        Ok(())
    }

    pub fn write_tagged_object_id(
        &mut self,
        tagged: &TaggedObjectId,
        sizes: &IdSizes,
    ) -> JdwpResult<()> {
        self.write_u8(tagged.tag as u8);
        self.write_id(IdKind::Object, tagged.object_id, sizes)
    }

    /// Tag byte followed by the payload.
    pub fn write_value(&mut self, value: &Value, sizes: &IdSizes) -> JdwpResult<()> {
        self.write_u8(value.tag() as u8);
        self.write_value_untagged(value, sizes)
    }

    /// Payload only; the receiver knows the tag from context.
    pub fn write_value_untagged(&mut self, value: &Value, sizes: &IdSizes) -> JdwpResult<()> {
        match value {
            Value::Byte(v) => self.buf.put_i8(*v),
            Value::Boolean(v) => self.write_bool(*v),
            Value::Char(v) => self.write_u16(*v),
            Value::Short(v) => self.write_i16(*v),
            Value::Int(v) => self.write_i32(*v),
            Value::Long(v) => self.write_i64(*v),
            Value::Float(v) => self.write_f32(*v),
            Value::Double(v) => self.write_f64(*v),
            Value::Object { id, .. } => self.write_id(IdKind::Object, *id, sizes)?,
            Value::Void => {}
        }
        Ok(())
    }

    pub fn write_array_region(&mut self, region: &ArrayRegion, sizes: &IdSizes) -> JdwpResult<()> {
        self.write_u8(region.tag as u8);
        self.write_u32(region.values.len() as u32);
        for value in &region.values {
            if region.tag.is_object_family() {
                self.write_value(value, sizes)?;
            } else {
                self.write_value_untagged(value, sizes)?;
            }
        }
        Ok(())
    }
}

/// Position-tracked view over a packet body.
#[derive(Debug)]
pub struct JdwpReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> JdwpReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> JdwpResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(JdwpError::protocol(
                self.pos,
                format!("need {n} bytes, {} remain", self.remaining()),
            ));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> JdwpResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> JdwpResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i8(&mut self) -> JdwpResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> JdwpResult<u16> {
        Ok(wire::read_u16_be(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> JdwpResult<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> JdwpResult<u32> {
        Ok(wire::read_u32_be(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> JdwpResult<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> JdwpResult<u64> {
        Ok(wire::read_u64_be(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> JdwpResult<i64> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_f32(&mut self) -> JdwpResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> JdwpResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_id(&mut self, kind: IdKind, sizes: &IdSizes) -> JdwpResult<u64> {
        let width = sizes.width_of(kind);
        if width > 8 {
            return Err(JdwpError::protocol(
                self.pos,
                format!("id width {width} out of range"),
            ));
        }
        Ok(wire::read_id_be(self.take(width)?))
    }

    /// Length-prefixed string. JDWP carries modified UTF-8; anything that
    /// is not valid UTF-8 is a protocol error at this boundary.
    pub fn read_string(&mut self) -> JdwpResult<String> {
        let len = self.read_u32()? as usize;
        let start = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| JdwpError::protocol(start, format!("invalid UTF-8 in string: {e}")))
    }

    pub fn read_location(&mut self, sizes: &IdSizes) -> JdwpResult<Location> {
        Ok(Location {
            type_tag: self.read_u8()?,
            class_id: self.read_id(IdKind::Object, sizes)?,
            method_id: self.read_id(IdKind::Method, sizes)?,
            index: self.read_u64()?,
        })
    }

    fn read_tag(&mut self) -> JdwpResult<Tag> {
        let at = self.pos;
        let byte = self.read_u8()?;
        Tag::from_u8(byte).ok_or_else(|| JdwpError::protocol(at, format!("unknown tag {byte:#04x}")))
    }

    pub fn read_tagged_object_id(&mut self, sizes: &IdSizes) -> JdwpResult<TaggedObjectId> {
        Ok(TaggedObjectId {
            tag: self.read_tag()?,
            object_id: self.read_id(IdKind::Object, sizes)?,
        })
    }

    /// Tag byte followed by the payload.
    pub fn read_value(&mut self, sizes: &IdSizes) -> JdwpResult<Value> {
        let tag = self.read_tag()?;
        self.read_value_untagged(tag, sizes)
    }

    /// Payload only, with the tag supplied by context.
    pub fn read_value_untagged(&mut self, tag: Tag, sizes: &IdSizes) -> JdwpResult<Value> {
        Ok(match tag {
            Tag::Byte => Value::Byte(self.read_i8()?),
            Tag::Boolean => Value::Boolean(self.read_bool()?),
            Tag::Char => Value::Char(self.read_u16()?),
            Tag::Short => Value::Short(self.read_i16()?),
            Tag::Int => Value::Int(self.read_i32()?),
            Tag::Long => Value::Long(self.read_i64()?),
            Tag::Float => Value::Float(self.read_f32()?),
            Tag::Double => Value::Double(self.read_f64()?),
            Tag::Void => Value::Void,
            _ => Value::Object {
                tag,
                id: self.read_id(IdKind::Object, sizes)?,
            },
        })
    }

    pub fn read_array_region(&mut self, sizes: &IdSizes) -> JdwpResult<ArrayRegion> {
        let tag = self.read_tag()?;
        let count = self.read_u32()? as usize;
        let mut values = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let value = if tag.is_object_family() {
                self.read_value(sizes)?
            } else {
                self.read_value_untagged(tag, sizes)?
            };
            values.push(value);
        }
        Ok(ArrayRegion { tag, values })
    }
}

/// One element of a command-body schema.
///
/// Bodies are declared as ordered field lists that `write_fields` walks;
/// repetitions nest freely and carry their 4-byte count implicitly.
#[derive(Debug, Clone)]
pub enum Field {
    Byte(u8),
    Boolean(bool),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Id(IdKind, u64),
    Str(String),
    Loc(Location),
    TaggedObject(TaggedObjectId),
    /// Tag byte plus payload.
    Tagged(Value),
    /// Payload only; the tag is implicit in a paired declaration.
    Untagged(Value),
    Region(ArrayRegion),
    /// 4-byte count followed by the raw bytes.
    Bytes(Vec<u8>),
    /// 4-byte count followed by each instance's fields in order.
    Repeat(Vec<Vec<Field>>),
}

/// Walk a schema in declaration order and serialize it.
pub fn write_fields(w: &mut JdwpWriter, fields: &[Field], sizes: &IdSizes) -> JdwpResult<()> {
    for field in fields {
        match field {
            Field::Byte(v) => w.write_u8(*v),
            Field::Boolean(v) => w.write_bool(*v),
            Field::Char(v) => w.write_u16(*v),
            Field::Short(v) => w.write_i16(*v),
            Field::Int(v) => w.write_i32(*v),
            Field::Long(v) => w.write_i64(*v),
            Field::Float(v) => w.write_f32(*v),
            Field::Double(v) => w.write_f64(*v),
            Field::Id(kind, id) => w.write_id(*kind, *id, sizes)?,
            Field::Str(s) => w.write_string(s),
            Field::Loc(loc) => w.write_location(loc, sizes)?,
            Field::TaggedObject(t) => w.write_tagged_object_id(t, sizes)?,
            Field::Tagged(v) => w.write_value(v, sizes)?,
            Field::Untagged(v) => w.write_value_untagged(v, sizes)?,
            Field::Region(r) => w.write_array_region(r, sizes)?,
            Field::Bytes(bytes) => {
                w.write_u32(bytes.len() as u32);
                w.write_bytes(bytes);
            }
            Field::Repeat(instances) => {
                w.write_u32(instances.len() as u32);
                for instance in instances {
                    write_fields(w, instance, sizes)?;
                }
            }
        }
    }
    Ok(())
}
