//! Command dispatch: answers the host's discovery handshake and builds the
//! frames the keyboard sends on its own.
//!
//! The dispatcher is stateless. It reads a received frame, rebuilds the
//! session's single transmit frame in place, and tells the caller what to do
//! with it through [`Dispatch`]. Side effects on the session (entering keyboard
//! mode, restarting the keep-alive timer) are left to the caller so they can
//! happen strictly after the reply has been written.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::input::event::KeyDirection;
use crate::keymap::scancode::ScanCode;
use crate::protocol::attribute::{AttributeId, AttributeWriter};
use crate::protocol::command::{command_name, CommandId};
use crate::protocol::frame::{Frame, FrameError};

/// Values reported to the host during discovery.
///
/// The defaults identify the keyboard the host driver expects; configuration
/// may override individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceIdentity {
    pub device_name: String,
    pub serial_number: String,
    pub firmware_version: u16,
    pub language: u8,
    pub device_class: i32,
    pub image_start_address: u32,
    pub key_layout: u8,
    pub device_id: [i32; 4],
    /// Pre-shared key returned by `CMD_GET_AUTH_KEY`.
    pub auth_key: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            device_name: "rMkeyboard01".to_string(),
            serial_number: "RM712-311-11212".to_string(),
            firmware_version: 0x0102,
            language: 0x01,
            device_class: 0x8000_0002u32 as i32,
            image_start_address: 0x0004_0000,
            key_layout: 0x01,
            device_id: [
                0x0301_1040,
                0xafae_a528u32 as i32,
                0x1416_0517,
                0xf500_0510u32 as i32,
            ],
            auth_key: "@O8eO77%o^4*1GE@oeodd#WMa%8Kr6v@".to_string(),
        }
    }
}

/// What the caller must do after [`CommandDispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Transmit the reply frame.
    Reply,
    /// Transmit the reply frame; once written, switch to keyboard mode and
    /// restart the keep-alive timer.
    EnterKeyboard,
    /// An attribute read named an unknown attribute; nothing is transmitted.
    Abandoned { attribute: u8 },
    /// The command is not handled; nothing is transmitted.
    Ignored,
}

/// Stateless handler for inbound commands.
#[derive(Debug, Clone, Default)]
pub struct CommandDispatcher {
    identity: DeviceIdentity,
}

impl CommandDispatcher {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self { identity }
    }

    /// Handles one received frame, rebuilding `reply` when an answer is due.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] if a reply does not fit in a frame. With the
    /// fixed attribute set this only happens when the host requests the same
    /// large attributes many times over, or a configured identity string is
    /// unreasonably long; the caller must treat it as fatal.
    pub fn dispatch(&self, request: &Frame, reply: &mut Frame) -> Result<Dispatch, FrameError> {
        match CommandId::try_from(request.command()) {
            Ok(CommandId::AttributeRead) => self.attribute_read(request, reply),
            Ok(CommandId::GetAuthKey) => {
                reply.clear(CommandId::GetAuthKey.as_u8());
                reply.extend(self.identity.auth_key.as_bytes())?;
                // The host expects the C-string terminator.
                reply.extend(&[0x00])?;
                Ok(Dispatch::Reply)
            }
            Ok(CommandId::EnterApp) => {
                reply.clear(CommandId::EnterApp.as_u8());
                Ok(Dispatch::EnterKeyboard)
            }
            _ => {
                warn!(
                    command = request.command(),
                    "do not know how to handle command {}",
                    command_name(request.command())
                );
                Ok(Dispatch::Ignored)
            }
        }
    }

    fn attribute_read(&self, request: &Frame, reply: &mut Frame) -> Result<Dispatch, FrameError> {
        let id = &self.identity;
        reply.clear(CommandId::AttributeRead.as_u8());
        let mut writer = AttributeWriter::new(reply);

        for &raw in request.payload() {
            let Ok(attribute) = AttributeId::try_from(raw) else {
                warn!("do not know how to read attribute 0x{raw:02x}; dropping reply");
                return Ok(Dispatch::Abandoned { attribute: raw });
            };
            debug!(?attribute, "attribute read");
            match attribute {
                AttributeId::DeviceName => writer.put_string(attribute, &id.device_name)?,
                AttributeId::FirmwareVersion => writer.put_u16(attribute, id.firmware_version)?,
                AttributeId::Language => writer.put_enum8(attribute, id.language)?,
                AttributeId::DeviceClass => writer.put_i32(attribute, id.device_class)?,
                AttributeId::ImageStartAddress => {
                    writer.put_u32(attribute, id.image_start_address)?
                }
                AttributeId::KeyLayout => writer.put_u8(attribute, id.key_layout)?,
                AttributeId::DeviceId => writer.put_i32_array(attribute, &id.device_id)?,
                AttributeId::SerialNumber => writer.put_string(attribute, &id.serial_number)?,
            }
        }
        Ok(Dispatch::Reply)
    }
}

/// Rebuilds `frame` as a `CMD_REPORT_ALIVE` liveness frame.
pub fn build_keep_alive(frame: &mut Frame) {
    frame.clear(CommandId::ReportAlive.as_u8());
}

/// Rebuilds `frame` as a `CMD_REPORT_KEY` frame.
///
/// Payload byte 0 is the scan code with the direction in its low bit; byte 1
/// is reserved.
pub fn build_key_report(frame: &mut Frame, direction: KeyDirection, scan_code: ScanCode) {
    frame.clear(CommandId::ReportKey.as_u8());
    let written = frame.extend(&[scan_code.as_u8() | direction as u8, 0x00]);
    debug_assert!(written.is_ok(), "a cleared frame always holds a key report");
}
