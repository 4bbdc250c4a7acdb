//! Command identifiers of the pogo protocol.
//!
//! The values follow the host-side driver's command table. Only
//! [`CommandId::AttributeRead`], [`CommandId::GetAuthKey`] and
//! [`CommandId::EnterApp`] are answered; the keyboard sends
//! [`CommandId::ReportAlive`] and [`CommandId::ReportKey`] on its own. The
//! firmware-update family is recognised so it can be named in logs, and is
//! otherwise ignored.

use std::fmt;

/// All command codes known to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandId {
    None = 0x00,
    FwWriteValidateImage = 0x02,
    EnterApp = 0x04,
    EnterSuspend = 0x05,
    FwWriteValidateCrc = 0x06,
    FwWritePacket = 0x07,
    FwWriteInit = 0x08,
    GetAuthKey = 0x09,
    Reboot = 0x0F,
    AttributeRead = 0x20,
    AttributeWrite = 0x21,
    // Keyboard → host only.
    ReportAlive = 0x40,
    ReportKey = 0x51,
}

impl CommandId {
    /// The raw command byte.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case name used in diagnostics, e.g. `CMD_ATTRIBUTE_READ`.
    pub fn name(self) -> &'static str {
        match self {
            CommandId::None => "CMD_NONE",
            CommandId::FwWriteValidateImage => "CMD_FW_WRITE_VALIDATE_IMAGE",
            CommandId::EnterApp => "CMD_ENTER_APP",
            CommandId::EnterSuspend => "CMD_ENTER_SUSPEND",
            CommandId::FwWriteValidateCrc => "CMD_FW_WRITE_VALIDATE_CRC",
            CommandId::FwWritePacket => "CMD_FW_WRITE_PACKET",
            CommandId::FwWriteInit => "CMD_FW_WRITE_INIT",
            CommandId::GetAuthKey => "CMD_GET_AUTH_KEY",
            CommandId::Reboot => "CMD_REBOOT",
            CommandId::AttributeRead => "CMD_ATTRIBUTE_READ",
            CommandId::AttributeWrite => "CMD_ATTRIBUTE_WRITE",
            CommandId::ReportAlive => "CMD_REPORT_ALIVE",
            CommandId::ReportKey => "CMD_REPORT_KEY",
        }
    }
}

impl TryFrom<u8> for CommandId {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(CommandId::None),
            0x02 => Ok(CommandId::FwWriteValidateImage),
            0x04 => Ok(CommandId::EnterApp),
            0x05 => Ok(CommandId::EnterSuspend),
            0x06 => Ok(CommandId::FwWriteValidateCrc),
            0x07 => Ok(CommandId::FwWritePacket),
            0x08 => Ok(CommandId::FwWriteInit),
            0x09 => Ok(CommandId::GetAuthKey),
            0x0F => Ok(CommandId::Reboot),
            0x20 => Ok(CommandId::AttributeRead),
            0x21 => Ok(CommandId::AttributeWrite),
            0x40 => Ok(CommandId::ReportAlive),
            0x51 => Ok(CommandId::ReportKey),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of a raw command byte, `UNKNOWN` for unassigned values.
pub fn command_name(raw: u8) -> &'static str {
    CommandId::try_from(raw).map_or("UNKNOWN", CommandId::name)
}
