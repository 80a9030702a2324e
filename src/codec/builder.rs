//! Mutable staging for codec construction.
//!
//! The builder accumulates type-keyed packet bindings plus version metadata
//! and freezes them into an immutable [`BedrockCodec`]. It is single-owner
//! by construction: every method consumes `self`, and `build()` moves the
//! staged state into the codec, so a frozen codec can never alias builder
//! storage.

use super::definition::PacketDefinition;
use super::BedrockCodec;
use crate::error::{CodecError, Result};
use crate::packet::BedrockPacket;
use crate::serializer::{CodecHelper, HelperFactory, PacketSerializer};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Default RakNet sub-protocol version
const DEFAULT_RAKNET_PROTOCOL_VERSION: u32 = 10;

struct StagedPacket {
    /// Monotonic registration order; the latest registration wins a numeric
    /// id collision when the dense table is populated.
    order: u64,
    definition: PacketDefinition,
}

/// Staging builder for [`BedrockCodec`].
///
/// Obtained from [`BedrockCodec::builder`] or
/// [`BedrockCodec::to_builder`]; consumed exactly once by
/// [`build`](CodecBuilder::build).
pub struct CodecBuilder {
    packets: HashMap<TypeId, StagedPacket>,
    next_order: u64,
    protocol_version: Option<u32>,
    raknet_protocol_version: u32,
    minecraft_version: Option<String>,
    helper_factory: Option<HelperFactory>,
}

impl std::fmt::Debug for CodecBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecBuilder")
            .field("staged_packets", &self.packets.len())
            .field("protocol_version", &self.protocol_version)
            .field("raknet_protocol_version", &self.raknet_protocol_version)
            .field("minecraft_version", &self.minecraft_version)
            .finish()
    }
}

impl Default for CodecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self {
            packets: HashMap::new(),
            next_order: 0,
            protocol_version: None,
            raknet_protocol_version: DEFAULT_RAKNET_PROTOCOL_VERSION,
            minecraft_version: None,
            helper_factory: None,
        }
    }

    pub(crate) fn from_codec(codec: &BedrockCodec) -> Self {
        let mut builder = Self::new();
        for definition in codec.packets_by_type().values() {
            let order = builder.next_order;
            builder.next_order += 1;
            builder.packets.insert(
                definition.packet_type(),
                StagedPacket {
                    order,
                    definition: definition.clone(),
                },
            );
        }
        builder.protocol_version = Some(codec.protocol_version());
        builder.raknet_protocol_version = codec.raknet_protocol_version();
        builder.minecraft_version = Some(codec.minecraft_version().to_owned());
        builder.helper_factory = Some(Arc::clone(codec.helper_factory()));
        builder
    }

    /// Bind packet type `T` to the numeric wire id `id`.
    ///
    /// Rejects a type that is already staged: rebinding a type to two ids is
    /// a porting mistake, not an override.
    pub fn register_packet<T, S, F>(mut self, factory: F, serializer: S, id: u32) -> Result<Self>
    where
        T: BedrockPacket,
        S: PacketSerializer<T> + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        if self.packets.contains_key(&type_id) {
            return Err(CodecError::DuplicatePacket(type_name::<T>()));
        }

        let order = self.next_order;
        self.next_order += 1;
        self.packets.insert(
            type_id,
            StagedPacket {
                order,
                definition: PacketDefinition::new(id, factory, serializer),
            },
        );
        Ok(self)
    }

    /// Replace the serializer bound to `T`, keeping its id and factory.
    ///
    /// This is the main mechanism for version-to-version diffs where only
    /// the parsing logic changed.
    pub fn update_serializer<T, S>(mut self, serializer: S) -> Result<Self>
    where
        T: BedrockPacket,
        S: PacketSerializer<T> + 'static,
    {
        let type_id = TypeId::of::<T>();
        let staged = self
            .packets
            .get_mut(&type_id)
            .ok_or_else(|| CodecError::PacketNotRegistered(type_name::<T>().to_owned()))?;
        staged.definition = staged.definition.with_serializer::<T, S>(serializer);
        Ok(self)
    }

    /// Keep only the listed packet types, dropping every other binding
    pub fn retain_packets(mut self, types: &[TypeId]) -> Self {
        self.packets.retain(|type_id, _| types.contains(type_id));
        self
    }

    /// Remove the binding for `T`, if staged
    pub fn deregister_packet<T: BedrockPacket>(mut self) -> Self {
        self.packets.remove(&TypeId::of::<T>());
        self
    }

    pub fn protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = Some(version);
        self
    }

    pub fn raknet_protocol_version(mut self, version: u32) -> Self {
        self.raknet_protocol_version = version;
        self
    }

    /// Set the game content version. Must be non-empty with at least three
    /// dot-separated components, e.g. `"1.20.40"`.
    pub fn minecraft_version(mut self, version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        if version.is_empty() || version.split('.').count() < 3 {
            return Err(CodecError::InvalidMinecraftVersion(version));
        }
        self.minecraft_version = Some(version);
        Ok(self)
    }

    /// Set the factory producing per-connection helper contexts
    pub fn helper<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn CodecHelper> + Send + Sync + 'static,
    {
        self.helper_factory = Some(Arc::new(factory));
        self
    }

    /// Validate the staged state and freeze it into an immutable codec.
    ///
    /// The dense id table is populated in registration order, so if two
    /// distinct types were bound to the same numeric id the latest
    /// registration wins the id slot (logged, not an error); both stay
    /// reachable by type.
    pub fn build(self) -> Result<BedrockCodec> {
        let protocol_version = self
            .protocol_version
            .ok_or(CodecError::MissingProtocolVersion)?;
        let minecraft_version = self
            .minecraft_version
            .ok_or(CodecError::MissingMinecraftVersion)?;
        let helper_factory = self.helper_factory.ok_or(CodecError::MissingHelperFactory)?;
        if self.packets.is_empty() {
            return Err(CodecError::EmptyCodec);
        }

        let mut staged: Vec<StagedPacket> = self.packets.into_values().collect();
        staged.sort_by_key(|s| s.order);

        let largest_id = staged
            .iter()
            .map(|s| s.definition.id())
            .max()
            .unwrap_or_default();

        let mut packets_by_id: Vec<Option<PacketDefinition>> =
            vec![None; largest_id as usize + 1];
        let mut packets_by_type = HashMap::with_capacity(staged.len());

        for StagedPacket { definition, .. } in staged {
            let slot = &mut packets_by_id[definition.id() as usize];
            if let Some(previous) = slot.as_ref() {
                warn!(
                    id = definition.id(),
                    kept = definition.packet_name(),
                    displaced = previous.packet_name(),
                    "two packet types registered at the same id"
                );
            }
            packets_by_type.insert(definition.packet_type(), definition.clone());
            *slot = Some(definition);
        }

        Ok(BedrockCodec::new(
            protocol_version,
            minecraft_version,
            self.raknet_protocol_version,
            packets_by_id,
            packets_by_type,
            helper_factory,
        ))
    }
}
