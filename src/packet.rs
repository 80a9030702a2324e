//! # Packet Model
//!
//! The object-safe packet trait and the [`UnknownPacket`] fallback sentinel.
//!
//! Concrete packet types live outside this crate; the codec only needs a
//! trait object it can construct through a registered factory and hand to
//! the matching serializer. Dispatch is by *exact* runtime type — a
//! definition registered for one type never matches any other type, which
//! keeps the wire id ↔ type mapping unambiguous during encode.

use crate::buffer::PacketBuffer;
use crate::serializer::{CodecHelper, PacketSerializer};
use crate::Result;
use bytes::Bytes;
use std::any::Any;
use std::fmt;

/// Trait implemented by every concrete packet type known to a codec.
///
/// The `Any` accessors exist for exact-type dispatch: the codec keys its
/// encode-side lookup on `as_any().type_id()`, and the type-erased serializer
/// bridge downcasts through them before delegating to the typed serializer.
pub trait BedrockPacket: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Fallback packet for ids with no registered definition, or for bodies the
/// registered serializer failed to parse.
///
/// Carries the numeric id it was decoded from and an owned copy of the raw
/// body bytes, so the frame can be replayed verbatim (proxied onward, logged,
/// or inspected) without the codec understanding its contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownPacket {
    packet_id: u32,
    payload: Bytes,
}

impl UnknownPacket {
    pub fn new(packet_id: u32) -> Self {
        Self {
            packet_id,
            payload: Bytes::new(),
        }
    }

    /// The wire id this packet was decoded from (or will be replayed as)
    pub fn packet_id(&self) -> u32 {
        self.packet_id
    }

    /// Retag the packet with a different wire id
    pub fn set_packet_id(&mut self, packet_id: u32) {
        self.packet_id = packet_id;
    }

    /// The captured raw body bytes
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Capture every unread byte of `buf` as this packet's payload.
    ///
    /// The payload is an owned copy; the source buffer may be reused or
    /// recycled immediately afterwards.
    pub fn capture(&mut self, buf: &mut PacketBuffer) {
        self.payload = buf.read_remaining();
    }

    /// Write the captured payload back verbatim
    pub fn replay(&self, buf: &mut PacketBuffer) {
        buf.write_slice(&self.payload);
    }
}

impl BedrockPacket for UnknownPacket {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Serializer for [`UnknownPacket`]: capture on deserialize, replay on
/// serialize, no interpretation of the bytes in between.
///
/// Never registered in a codec's dispatch tables — it is selected only on
/// the no-definition / failed-decode paths, or explicitly by a caller
/// re-encoding a captured frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownPacketSerializer;

impl PacketSerializer<UnknownPacket> for UnknownPacketSerializer {
    fn serialize(
        &self,
        buf: &mut PacketBuffer,
        _helper: &mut dyn CodecHelper,
        packet: &UnknownPacket,
    ) -> Result<()> {
        packet.replay(buf);
        Ok(())
    }

    fn deserialize(
        &self,
        buf: &mut PacketBuffer,
        _helper: &mut dyn CodecHelper,
        packet: &mut UnknownPacket,
    ) -> Result<()> {
        packet.capture(buf);
        Ok(())
    }
}
