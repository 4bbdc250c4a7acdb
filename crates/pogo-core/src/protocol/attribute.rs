//! Typed attribute (TLV) encoding for attribute-read replies.
//!
//! Each attribute is appended to the reply payload as:
//! ```text
//! [attribute_id:1][0x00][type_tag:1][data...]
//! ```
//! Integers and enums are little-endian with no length prefix. Strings carry a
//! one-byte length followed by the raw bytes (no terminator). Arrays carry an
//! element type tag, a little-endian u16 element count and the elements.
//!
//! Every `put_*` call checks the full attribute size against the remaining
//! payload capacity before writing anything, so a failed call leaves the frame
//! exactly as it was.

use crate::protocol::frame::{Frame, FrameError};

/// Size of the `[id][0x00][type]` header.
pub const ATTRIBUTE_HEADER_LEN: usize = 3;

/// Attribute identifiers the host asks for during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeId {
    FirmwareVersion = 0x02,
    DeviceClass = 0x04,
    DeviceId = 0x05,
    ImageStartAddress = 0x06,
    DeviceName = 0x07,
    KeyLayout = 0x10,
    Language = 0x11,
    SerialNumber = 0x12,
}

impl TryFrom<u8> for AttributeId {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x02 => Ok(AttributeId::FirmwareVersion),
            0x04 => Ok(AttributeId::DeviceClass),
            0x05 => Ok(AttributeId::DeviceId),
            0x06 => Ok(AttributeId::ImageStartAddress),
            0x07 => Ok(AttributeId::DeviceName),
            0x10 => Ok(AttributeId::KeyLayout),
            0x11 => Ok(AttributeId::Language),
            0x12 => Ok(AttributeId::SerialNumber),
            _ => Err(()),
        }
    }
}

/// Type tags carried in the third header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeType {
    Int8 = 0x08,
    Int16 = 0x09,
    Int32 = 0x0B,
    Bool = 0x10,
    Uint8 = 0x18,
    Uint16 = 0x19,
    Uint32 = 0x1B,
    Enum8 = 0x30,
    String = 0x42,
    Array = 0x48,
}

/// Appends typed attributes to a reply frame.
pub struct AttributeWriter<'a> {
    frame: &'a mut Frame,
}

impl<'a> AttributeWriter<'a> {
    /// Wraps `frame`; attributes are appended after its current payload.
    pub fn new(frame: &'a mut Frame) -> Self {
        Self { frame }
    }

    pub fn put_u8(&mut self, id: AttributeId, value: u8) -> Result<(), FrameError> {
        self.put_scalar(id, AttributeType::Uint8, &[value])
    }

    pub fn put_u16(&mut self, id: AttributeId, value: u16) -> Result<(), FrameError> {
        self.put_scalar(id, AttributeType::Uint16, &value.to_le_bytes())
    }

    pub fn put_u32(&mut self, id: AttributeId, value: u32) -> Result<(), FrameError> {
        self.put_scalar(id, AttributeType::Uint32, &value.to_le_bytes())
    }

    pub fn put_i32(&mut self, id: AttributeId, value: i32) -> Result<(), FrameError> {
        self.put_scalar(id, AttributeType::Int32, &value.to_le_bytes())
    }

    pub fn put_enum8(&mut self, id: AttributeId, value: u8) -> Result<(), FrameError> {
        self.put_scalar(id, AttributeType::Enum8, &[value])
    }

    /// Appends a length-prefixed string attribute.
    ///
    /// # Errors
    ///
    /// [`FrameError::StringTooLong`] if `value` is longer than 255 bytes,
    /// [`FrameError::PayloadOverflow`] if it does not fit the frame.
    pub fn put_string(&mut self, id: AttributeId, value: &str) -> Result<(), FrameError> {
        let bytes = value.as_bytes();
        let len = u8::try_from(bytes.len())
            .map_err(|_| FrameError::StringTooLong { len: bytes.len() })?;
        self.frame
            .ensure_capacity(ATTRIBUTE_HEADER_LEN + 1 + bytes.len())?;
        self.header(id, AttributeType::String)?;
        self.frame.extend(&[len])?;
        self.frame.extend(bytes)
    }

    /// Appends an array of signed 32-bit integers.
    ///
    /// # Errors
    ///
    /// [`FrameError::PayloadOverflow`] if the array does not fit the frame.
    pub fn put_i32_array(&mut self, id: AttributeId, values: &[i32]) -> Result<(), FrameError> {
        let data_len = values.len() * 4;
        self.frame
            .ensure_capacity(ATTRIBUTE_HEADER_LEN + 3 + data_len)?;
        // Capacity bounds the element count well below u16::MAX.
        let count = values.len() as u16;
        self.header(id, AttributeType::Array)?;
        self.frame.extend(&[AttributeType::Int32 as u8])?;
        self.frame.extend(&count.to_le_bytes())?;
        for value in values {
            self.frame.extend(&value.to_le_bytes())?;
        }
        Ok(())
    }

    fn put_scalar(
        &mut self,
        id: AttributeId,
        ty: AttributeType,
        data: &[u8],
    ) -> Result<(), FrameError> {
        self.frame.ensure_capacity(ATTRIBUTE_HEADER_LEN + data.len())?;
        self.header(id, ty)?;
        self.frame.extend(data)
    }

    fn header(&mut self, id: AttributeId, ty: AttributeType) -> Result<(), FrameError> {
        self.frame.extend(&[id as u8, 0x00, ty as u8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::MAX_PAYLOAD_LEN;

    fn frame() -> Frame {
        Frame::empty(0x20)
    }

    #[test]
    fn test_u16_attribute_is_little_endian() {
        // Arrange
        let mut f = frame();

        // Act
        AttributeWriter::new(&mut f)
            .put_u16(AttributeId::FirmwareVersion, 0x0102)
            .unwrap();

        // Assert
        assert_eq!(f.payload(), &[0x02, 0x00, 0x19, 0x02, 0x01]);
    }

    #[test]
    fn test_i32_attribute_encodes_negative_values() {
        let mut f = frame();
        AttributeWriter::new(&mut f)
            .put_i32(AttributeId::DeviceClass, 0x8000_0002u32 as i32)
            .unwrap();
        assert_eq!(f.payload(), &[0x04, 0x00, 0x0B, 0x02, 0x00, 0x00, 0x80]);
    }

    #[test]
    fn test_u32_and_enum8_and_u8_tags() {
        let mut f = frame();
        let mut w = AttributeWriter::new(&mut f);
        w.put_u32(AttributeId::ImageStartAddress, 0x0004_0000).unwrap();
        w.put_enum8(AttributeId::Language, 0x01).unwrap();
        w.put_u8(AttributeId::KeyLayout, 0x01).unwrap();

        assert_eq!(
            f.payload(),
            &[
                0x06, 0x00, 0x1B, 0x00, 0x00, 0x04, 0x00, // image start
                0x11, 0x00, 0x30, 0x01, // language
                0x10, 0x00, 0x18, 0x01, // key layout
            ]
        );
    }

    #[test]
    fn test_string_attribute_has_length_prefix_and_no_terminator() {
        // Arrange
        let mut f = frame();

        // Act
        AttributeWriter::new(&mut f)
            .put_string(AttributeId::DeviceName, "rMkeyboard01")
            .unwrap();

        // Assert
        let mut expected = vec![0x07, 0x00, 0x42, 0x0C];
        expected.extend_from_slice(b"rMkeyboard01");
        assert_eq!(f.payload(), expected.as_slice());
    }

    #[test]
    fn test_array_attribute_layout() {
        let mut f = frame();
        AttributeWriter::new(&mut f)
            .put_i32_array(AttributeId::DeviceId, &[0x0301_1040, -1])
            .unwrap();
        assert_eq!(
            f.payload(),
            &[
                0x05, 0x00, 0x48, // header
                0x0B, 0x02, 0x00, // int32 elements, count 2
                0x40, 0x10, 0x01, 0x03, // 0x03011040
                0xFF, 0xFF, 0xFF, 0xFF, // -1
            ]
        );
    }

    #[test]
    fn test_attribute_that_does_not_fit_is_not_written() {
        // Arrange – leave room for 6 bytes; a u32 attribute needs 7
        let mut f = Frame::new(0x20, &[0u8; MAX_PAYLOAD_LEN - 6]).unwrap();

        // Act
        let result = AttributeWriter::new(&mut f).put_u32(AttributeId::ImageStartAddress, 1);

        // Assert
        assert_eq!(
            result,
            Err(FrameError::PayloadOverflow {
                needed: MAX_PAYLOAD_LEN + 1,
                capacity: MAX_PAYLOAD_LEN
            })
        );
        assert_eq!(f.len(), MAX_PAYLOAD_LEN - 6);
    }

    #[test]
    fn test_attribute_that_exactly_fills_frame_is_accepted() {
        let mut f = Frame::new(0x20, &[0u8; MAX_PAYLOAD_LEN - 7]).unwrap();
        AttributeWriter::new(&mut f)
            .put_u32(AttributeId::ImageStartAddress, 1)
            .unwrap();
        assert_eq!(f.remaining(), 0);
    }

    #[test]
    fn test_overlong_string_is_rejected() {
        let mut f = frame();
        let long = "x".repeat(256);
        let result = AttributeWriter::new(&mut f).put_string(AttributeId::SerialNumber, &long);
        assert_eq!(result, Err(FrameError::StringTooLong { len: 256 }));
        assert!(f.is_empty());
    }

    #[test]
    fn test_oversized_array_is_rejected_without_partial_write() {
        let mut f = frame();
        let values = [0i32; 31]; // 3 + 3 + 124 = 130 bytes
        let result = AttributeWriter::new(&mut f).put_i32_array(AttributeId::DeviceId, &values);
        assert!(matches!(result, Err(FrameError::PayloadOverflow { .. })));
        assert!(f.is_empty());
    }

    #[test]
    fn test_attribute_id_try_from() {
        assert_eq!(AttributeId::try_from(0x07), Ok(AttributeId::DeviceName));
        assert_eq!(AttributeId::try_from(0x12), Ok(AttributeId::SerialNumber));
        assert!(AttributeId::try_from(0x01).is_err());
        assert!(AttributeId::try_from(0x13).is_err());
    }
}
