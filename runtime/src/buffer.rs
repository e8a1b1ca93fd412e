use crate::error::ProtocolError;

/// A packet buffer meant for reading.
///
/// Every `read_*` method is named after a logical schema type, so generated
/// code can call `buffer.read_<type>()` without a lookup table.
///
/// ```
/// let mut bb = quarry_runtime::PacketReader::new(&[0xdd, 0xc7, 0x01, 0x63, 0xdd]);
/// assert_eq!(bb.read_varint(), Ok(25565));
/// assert_eq!(bb.read_u16(), Ok(25565));
/// assert_eq!(bb.cursor(), 5);
/// ```
///
pub struct PacketReader<'a> {
    data:   &'a [u8],
    cursor: usize,
}

impl<'a> PacketReader<'a> {
    /// Create a new PacketReader that wraps the provided byte slice.
    pub fn new(data: &'a [u8]) -> PacketReader<'a> {
        PacketReader { data, cursor: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bytes consumed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        if len > self.remaining() {
            return Err(ProtocolError::UnexpectedEof {
                needed:    len,
                remaining: self.remaining(),
            });
        }
        let value = &self.data[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(value)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ProtocolError::InvalidBool(other)),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ProtocolError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, ProtocolError> {
        Ok(f32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, ProtocolError> {
        Ok(f64::from_be_bytes(self.take_array()?))
    }

    /// Read a variable-length signed 32-bit integer (7 bits per byte, low
    /// groups first, two's complement).
    pub fn read_varint(&mut self) -> Result<i32, ProtocolError> {
        let mut result: i32 = 0;
        let mut shift: u32 = 0;

        loop {
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as i32) << shift;

            if (byte & 0x80) == 0 {
                return Ok(result);
            }

            shift += 7;
            if shift >= 32 {
                return Err(ProtocolError::VarIntTooLong);
            }
        }
    }

    /// Read a variable-length signed 64-bit integer.
    pub fn read_varlong(&mut self) -> Result<i64, ProtocolError> {
        let mut result: i64 = 0;
        let mut shift: u32 = 0;

        loop {
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as i64) << shift;

            if (byte & 0x80) == 0 {
                return Ok(result);
            }

            shift += 7;
            if shift >= 64 {
                return Err(ProtocolError::VarIntTooLong);
            }
        }
    }

    /// Read a varint length prefix followed by that many UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.read_varint()?;
        if len < 0 {
            return Err(ProtocolError::InvalidLength(len));
        }
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Read exactly `len` raw bytes.
    pub fn read_byte_array(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.take(len)?.to_vec())
    }
}

/// A packet buffer meant for writing.
///
/// ```
/// let mut bb = quarry_runtime::PacketWriter::new();
/// bb.write_varint(25565);
/// bb.write_string("hi");
/// assert_eq!(bb.data(), [0xdd, 0xc7, 0x01, 2, b'h', b'i']);
/// ```
///
#[derive(Debug, Default)]
pub struct PacketWriter {
    data: Vec<u8>,
}

impl PacketWriter {
    /// Creates an empty PacketWriter ready for writing.
    pub fn new() -> PacketWriter {
        PacketWriter { data: vec![] }
    }

    /// Consumes this buffer and returns the underlying backing store.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.push(if value { 1 } else { 0 });
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.data.push(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_varint(&mut self, value: i32) {
        let mut value = value as u32;
        loop {
            if (value & !0x7F) == 0 {
                self.data.push(value as u8);
                return;
            }
            self.data.push((value & 0x7F) as u8 | 0x80);
            value >>= 7;
        }
    }

    pub fn write_varlong(&mut self, value: i64) {
        let mut value = value as u64;
        loop {
            if (value & !0x7F) == 0 {
                self.data.push(value as u8);
                return;
            }
            self.data.push((value & 0x7F) as u8 | 0x80);
            value >>= 7;
        }
    }

    /// Write a varint length prefix followed by the UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) {
        self.write_varint(value.len() as i32);
        self.data.extend_from_slice(value.as_bytes());
    }

    /// Write raw bytes with no length prefix; the schema carries the length
    /// in a separate field.
    pub fn write_byte_array(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }
}

#[cfg(test)]
fn write_once(cb: fn(&mut PacketWriter)) -> Vec<u8> {
    let mut bb = PacketWriter::new();
    cb(&mut bb);
    bb.data()
}

#[test]
fn read_bool() {
    let read = |bytes| PacketReader::new(bytes).read_bool();
    assert_eq!(read(&[]), Err(ProtocolError::UnexpectedEof { needed: 1, remaining: 0 }));
    assert_eq!(read(&[0]), Ok(false));
    assert_eq!(read(&[1]), Ok(true));
    assert_eq!(read(&[2]), Err(ProtocolError::InvalidBool(2)));
}

#[test]
fn read_fixed_width() {
    let mut bb = PacketReader::new(&[0x12, 0x34, 0xff, 0xff, 0xff, 0xfe, 0x80]);
    assert_eq!(bb.read_u16(), Ok(0x1234));
    assert_eq!(bb.read_i32(), Ok(-2));
    assert_eq!(bb.read_i8(), Ok(-128));
    assert_eq!(bb.read_u8(), Err(ProtocolError::UnexpectedEof { needed: 1, remaining: 0 }));
}

#[test]
fn read_varint() {
    let read = |bytes| PacketReader::new(bytes).read_varint();
    assert_eq!(read(&[0x00]), Ok(0));
    assert_eq!(read(&[0x01]), Ok(1));
    assert_eq!(read(&[0x7f]), Ok(127));
    assert_eq!(read(&[0x80, 0x01]), Ok(128));
    assert_eq!(read(&[0xff, 0x01]), Ok(255));
    assert_eq!(read(&[0xdd, 0xc7, 0x01]), Ok(25565));
    assert_eq!(read(&[0xff, 0xff, 0xff, 0xff, 0x07]), Ok(2147483647));
    assert_eq!(read(&[0xff, 0xff, 0xff, 0xff, 0x0f]), Ok(-1));
    assert_eq!(read(&[0x80, 0x80, 0x80, 0x80, 0x08]), Ok(-2147483648));
    assert_eq!(read(&[0xff, 0xff, 0xff, 0xff, 0xff]), Err(ProtocolError::VarIntTooLong));
    assert_eq!(read(&[0x80]), Err(ProtocolError::UnexpectedEof { needed: 1, remaining: 0 }));
}

#[test]
fn read_varlong() {
    let read = |bytes| PacketReader::new(bytes).read_varlong();
    assert_eq!(read(&[0x00]), Ok(0));
    assert_eq!(read(&[0xff, 0x01]), Ok(255));
    assert_eq!(
        read(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f]),
        Ok(9223372036854775807)
    );
    assert_eq!(
        read(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]),
        Ok(-1)
    );
}

#[test]
fn read_string() {
    let read = |bytes| PacketReader::new(bytes).read_string();
    assert_eq!(read(&[0]), Ok("".to_owned()));
    assert_eq!(read(&[2, b'o', b'k']), Ok("ok".to_owned()));
    assert_eq!(read(&[2, 0xff, 0xfe]), Err(ProtocolError::InvalidUtf8));
    assert_eq!(read(&[3, b'o']), Err(ProtocolError::UnexpectedEof { needed: 3, remaining: 1 }));
    assert_eq!(read(&[0xff, 0xff, 0xff, 0xff, 0x0f]), Err(ProtocolError::InvalidLength(-1)));
}

#[test]
fn read_sequence() {
    let data = [0x05, 1, 2, 3, 4, 5, 0x01];
    let mut bb = PacketReader::new(&data);
    let len = bb.read_varint().unwrap();
    assert_eq!(bb.read_byte_array(len as usize), Ok(vec![1, 2, 3, 4, 5]));
    assert_eq!(bb.read_bool(), Ok(true));
    assert_eq!(bb.cursor(), data.len());
    assert_eq!(bb.remaining(), 0);
}

#[test]
fn write_varint() {
    assert_eq!(write_once(|bb| bb.write_varint(0)), [0x00]);
    assert_eq!(write_once(|bb| bb.write_varint(128)), [0x80, 0x01]);
    assert_eq!(write_once(|bb| bb.write_varint(25565)), [0xdd, 0xc7, 0x01]);
    assert_eq!(write_once(|bb| bb.write_varint(-1)), [0xff, 0xff, 0xff, 0xff, 0x0f]);
    assert_eq!(
        write_once(|bb| bb.write_varint(-2147483648)),
        [0x80, 0x80, 0x80, 0x80, 0x08]
    );
}

#[test]
fn write_varlong() {
    assert_eq!(write_once(|bb| bb.write_varlong(255)), [0xff, 0x01]);
    assert_eq!(
        write_once(|bb| bb.write_varlong(-1)),
        [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
    );
}

#[test]
fn write_sequence() {
    let mut bb = PacketWriter::new();
    bb.write_varint(2);
    bb.write_byte_array(&[9, 8]);
    bb.write_string("é");
    bb.write_i64(-2);
    bb.write_f32(1.5);
    assert_eq!(
        bb.data(),
        [
            2, 9, 8, 2, 0xc3, 0xa9,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
            0x3f, 0xc0, 0x00, 0x00,
        ]
    );
}
