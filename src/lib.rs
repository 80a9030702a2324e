//! # bedrock-codec
//!
//! Versioned packet codec core for game-networking protocol stacks.
//!
//! This crate maps numeric wire packet ids and concrete packet types to
//! serializer logic, and provides the resilient decode/encode pipeline run
//! once per inbound/outbound packet on every connection. Transport framing,
//! reliable delivery, compression and encryption all live elsewhere: the
//! codec is handed a single already-framed packet body and a cursor over it.
//!
//! ## Components
//! - **PacketBuffer**: owned bytes with a rewindable integer read cursor
//! - **PacketDefinition**: immutable `(id, factory, serializer)` binding
//! - **BedrockCodec**: immutable decode/encode facade, one per protocol
//!   version, shareable across connections without synchronization
//! - **CodecBuilder**: staging structure that validates and freezes bindings;
//!   new protocol versions are derived from an existing codec's
//!   `to_builder()` plus diffs
//! - **UnknownPacket**: raw-bytes fallback for unregistered ids and
//!   malformed bodies
//!
//! ## Example
//! ```rust
//! use bedrock_codec::{
//!     BedrockCodec, BedrockPacket, CodecHelper, PacketBuffer, PacketSerializer, Result,
//! };
//! use std::any::Any;
//!
//! #[derive(Debug, Default)]
//! struct PingPacket {
//!     value: u32,
//! }
//!
//! impl BedrockPacket for PingPacket {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! struct PingSerializer;
//!
//! impl PacketSerializer<PingPacket> for PingSerializer {
//!     fn serialize(
//!         &self,
//!         buf: &mut PacketBuffer,
//!         _helper: &mut dyn CodecHelper,
//!         packet: &PingPacket,
//!     ) -> Result<()> {
//!         buf.write_u32(packet.value);
//!         Ok(())
//!     }
//!     fn deserialize(
//!         &self,
//!         buf: &mut PacketBuffer,
//!         _helper: &mut dyn CodecHelper,
//!         packet: &mut PingPacket,
//!     ) -> Result<()> {
//!         packet.value = buf.read_u32()?;
//!         Ok(())
//!     }
//! }
//!
//! struct Helper;
//!
//! impl CodecHelper for Helper {
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let codec = BedrockCodec::builder()
//!         .protocol_version(100)
//!         .minecraft_version("1.20.40")?
//!         .helper(|| Box::new(Helper))
//!         .register_packet(PingPacket::default, PingSerializer, 1)?
//!         .build()?;
//!
//!     let mut helper = codec.create_helper();
//!     let mut buf = PacketBuffer::new();
//!     codec.try_encode(helper.as_mut(), &mut buf, &PingPacket { value: 42 })?;
//!
//!     let packet = codec.try_decode(helper.as_mut(), &mut buf, 1);
//!     assert_eq!(
//!         packet.as_any().downcast_ref::<PingPacket>().map(|p| p.value),
//!         Some(42)
//!     );
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod codec;
pub mod error;
pub mod packet;
pub mod serializer;

pub use buffer::PacketBuffer;
pub use codec::builder::CodecBuilder;
pub use codec::definition::PacketDefinition;
pub use codec::BedrockCodec;
pub use error::{CodecError, Result};
pub use packet::{BedrockPacket, UnknownPacket, UnknownPacketSerializer};
pub use serializer::{CodecHelper, HelperFactory, PacketSerializer};
