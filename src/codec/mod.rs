//! # Codec Core
//!
//! The immutable per-protocol-version codec and its builder.
//!
//! A connection holds one [`BedrockCodec`] per negotiated protocol version
//! and calls [`try_decode`](BedrockCodec::try_decode) once per inbound frame
//! and [`try_encode`](BedrockCodec::try_encode) once per outbound packet.
//! Codecs for successive protocol versions are derived with
//! [`to_builder`](BedrockCodec::to_builder) plus a handful of diffs, never by
//! re-registering every packet from scratch.
//!
//! ## Decode Resilience
//! `try_decode` never fails. A malformed body, a serializer error, or a
//! serializer that leaves unread bytes behind all collapse into an
//! [`UnknownPacket`] carrying the raw frame, with the read cursor rewound
//! first so no partial reads leak into the captured payload.
//!
//! ## Concurrency
//! A built codec is immutable and safe for unsynchronized concurrent use by
//! any number of connections. Per-call mutable state belongs in the helper
//! produced by [`create_helper`](BedrockCodec::create_helper), which is never
//! shared between concurrent calls.

pub mod builder;
pub mod definition;

use crate::buffer::PacketBuffer;
use crate::error::{CodecError, Result};
use crate::packet::{BedrockPacket, UnknownPacket};
use crate::serializer::{CodecHelper, HelperFactory};
use builder::CodecBuilder;
use definition::PacketDefinition;
use std::any::TypeId;
use std::collections::HashMap;
use tracing::{debug, error};

/// Immutable packet codec for one protocol version.
#[derive(Clone)]
pub struct BedrockCodec {
    protocol_version: u32,
    minecraft_version: String,
    raknet_protocol_version: u32,
    packets_by_id: Vec<Option<PacketDefinition>>,
    packets_by_type: HashMap<TypeId, PacketDefinition>,
    helper_factory: HelperFactory,
}

impl BedrockCodec {
    pub(crate) fn new(
        protocol_version: u32,
        minecraft_version: String,
        raknet_protocol_version: u32,
        packets_by_id: Vec<Option<PacketDefinition>>,
        packets_by_type: HashMap<TypeId, PacketDefinition>,
        helper_factory: HelperFactory,
    ) -> Self {
        Self {
            protocol_version,
            minecraft_version,
            raknet_protocol_version,
            packets_by_id,
            packets_by_type,
            helper_factory,
        }
    }

    /// Start an empty builder
    pub fn builder() -> CodecBuilder {
        CodecBuilder::new()
    }

    /// Snapshot this codec's bindings and metadata into a fresh builder.
    ///
    /// The builder copies the bindings; mutating it can never affect this
    /// codec.
    pub fn to_builder(&self) -> CodecBuilder {
        CodecBuilder::from_codec(self)
    }

    /// Decode one framed packet body. Never fails.
    ///
    /// An unregistered `id`, a serializer error, or a serializer that leaves
    /// unread bytes behind (an under-consumption implies a misparse) all
    /// yield an [`UnknownPacket`] tagged with `id` and carrying an owned copy
    /// of the full frame body. On the failure paths the cursor is rewound to
    /// where it was before deserialization began, so the capture always spans
    /// the whole frame and no partial reads leak.
    pub fn try_decode(
        &self,
        helper: &mut dyn CodecHelper,
        buf: &mut PacketBuffer,
        id: u32,
    ) -> Box<dyn BedrockPacket> {
        let read_index = buf.reader_index();

        let Some(definition) = self.packet_definition_for_id(id) else {
            let mut unknown = UnknownPacket::new(id);
            unknown.capture(buf);
            return Box::new(unknown);
        };

        let mut packet = definition.create_packet();
        let mut has_failure = false;

        if let Err(e) = definition
            .serializer()
            .deserialize(buf, helper, packet.as_mut())
        {
            error!(
                packet = definition.packet_name(),
                id,
                error = %e,
                "error whilst deserializing packet"
            );
            has_failure = true;
        }

        if buf.is_readable() {
            debug!(
                packet = definition.packet_name(),
                remaining = buf.remaining(),
                "packet still has bytes to read"
            );
            has_failure = true;
        }

        if has_failure {
            buf.set_reader_index(read_index);
            let mut unknown = UnknownPacket::new(id);
            unknown.capture(buf);
            return Box::new(unknown);
        }

        packet
    }

    /// Encode one outbound packet into `buf`.
    ///
    /// An [`UnknownPacket`] replays its captured payload verbatim. Any other
    /// packet is dispatched on its exact runtime type; a missing definition
    /// or a serializer failure is a caller contract violation and surfaces
    /// as [`CodecError::Serialize`] naming the offending packet.
    pub fn try_encode(
        &self,
        helper: &mut dyn CodecHelper,
        buf: &mut PacketBuffer,
        packet: &dyn BedrockPacket,
    ) -> Result<()> {
        self.encode_inner(helper, buf, packet)
            .map_err(|e| CodecError::Serialize {
                packet: format!("{packet:?}"),
                source: Box::new(e),
            })
    }

    fn encode_inner(
        &self,
        helper: &mut dyn CodecHelper,
        buf: &mut PacketBuffer,
        packet: &dyn BedrockPacket,
    ) -> Result<()> {
        if let Some(unknown) = packet.as_any().downcast_ref::<UnknownPacket>() {
            unknown.replay(buf);
            return Ok(());
        }

        let definition = self
            .packets_by_type
            .get(&packet.as_any().type_id())
            .ok_or_else(|| CodecError::PacketNotRegistered(format!("{packet:?}")))?;

        definition.serializer().serialize(buf, helper, packet)
    }

    /// Definition bound to a numeric id, if any. Out-of-range ids are not an
    /// error, just unknown.
    pub fn packet_definition_for_id(&self, id: u32) -> Option<&PacketDefinition> {
        self.packets_by_id.get(id as usize)?.as_ref()
    }

    /// Definition bound to the exact packet type `T`, if any. No subtype
    /// matching of any kind.
    pub fn packet_definition<T: BedrockPacket>(&self) -> Option<&PacketDefinition> {
        self.packets_by_type.get(&TypeId::of::<T>())
    }

    /// Number of distinct registered packet types
    pub fn packet_count(&self) -> usize {
        self.packets_by_type.len()
    }

    /// Construct a fresh helper context for a connection
    pub fn create_helper(&self) -> Box<dyn CodecHelper> {
        (self.helper_factory)()
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    pub fn minecraft_version(&self) -> &str {
        &self.minecraft_version
    }

    pub fn raknet_protocol_version(&self) -> u32 {
        self.raknet_protocol_version
    }

    pub(crate) fn packets_by_type(&self) -> &HashMap<TypeId, PacketDefinition> {
        &self.packets_by_type
    }

    pub(crate) fn packets_by_id(&self) -> &[Option<PacketDefinition>] {
        &self.packets_by_id
    }

    pub(crate) fn helper_factory(&self) -> &HelperFactory {
        &self.helper_factory
    }
}

impl std::fmt::Debug for BedrockCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockCodec")
            .field("protocol_version", &self.protocol_version)
            .field("minecraft_version", &self.minecraft_version)
            .field("raknet_protocol_version", &self.raknet_protocol_version)
            .field("packets", &self.packets_by_type.len())
            .finish()
    }
}
