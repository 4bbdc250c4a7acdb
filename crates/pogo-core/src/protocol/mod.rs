//! The pogo serial protocol: framing, typed attributes and command handling.

pub mod attribute;
pub mod command;
pub mod dispatch;
pub mod frame;

pub use attribute::{AttributeId, AttributeType, AttributeWriter};
pub use command::{command_name, CommandId};
pub use dispatch::{build_keep_alive, build_key_report, CommandDispatcher, DeviceIdentity, Dispatch};
pub use frame::{
    Frame, FrameDecoder, FrameError, FrameStatus, RxState, DEVICE_SYNC, HOST_SYNC, MAX_FRAME_LEN,
    MAX_PAYLOAD_LEN,
};
