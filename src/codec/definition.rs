//! Immutable (id, factory, serializer) bindings and the type-erasure bridge
//! that lets heterogeneous typed serializers share one dispatch table.

use crate::buffer::PacketBuffer;
use crate::error::{CodecError, Result};
use crate::packet::BedrockPacket;
use crate::serializer::{CodecHelper, PacketSerializer};
use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Object-safe view over a typed [`PacketSerializer`].
pub(crate) trait ErasedPacketSerializer: Send + Sync {
    fn serialize(
        &self,
        buf: &mut PacketBuffer,
        helper: &mut dyn CodecHelper,
        packet: &dyn BedrockPacket,
    ) -> Result<()>;

    fn deserialize(
        &self,
        buf: &mut PacketBuffer,
        helper: &mut dyn CodecHelper,
        packet: &mut dyn BedrockPacket,
    ) -> Result<()>;
}

/// Bridges a `PacketSerializer<T>` into the erased trait by downcasting the
/// packet argument. A failed downcast means the definition was invoked with
/// a packet of the wrong concrete type, which surfaces as a `TypeMismatch`
/// error rather than a panic.
struct TypedSerializer<T, S> {
    serializer: S,
    _packet: PhantomData<fn(T)>,
}

impl<T, S> ErasedPacketSerializer for TypedSerializer<T, S>
where
    T: BedrockPacket,
    S: PacketSerializer<T>,
{
    fn serialize(
        &self,
        buf: &mut PacketBuffer,
        helper: &mut dyn CodecHelper,
        packet: &dyn BedrockPacket,
    ) -> Result<()> {
        let packet = packet
            .as_any()
            .downcast_ref::<T>()
            .ok_or(CodecError::TypeMismatch {
                expected: type_name::<T>(),
            })?;
        self.serializer.serialize(buf, helper, packet)
    }

    fn deserialize(
        &self,
        buf: &mut PacketBuffer,
        helper: &mut dyn CodecHelper,
        packet: &mut dyn BedrockPacket,
    ) -> Result<()> {
        let packet = packet
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(CodecError::TypeMismatch {
                expected: type_name::<T>(),
            })?;
        self.serializer.deserialize(buf, helper, packet)
    }
}

type PacketFactory = Arc<dyn Fn() -> Box<dyn BedrockPacket> + Send + Sync>;

/// Immutable binding of a numeric wire id to a packet type's factory and
/// serializer. Identity is the packet *type*, not any particular instance.
///
/// Cloning shares the underlying factory and serializer.
#[derive(Clone)]
pub struct PacketDefinition {
    id: u32,
    type_id: TypeId,
    type_name: &'static str,
    factory: PacketFactory,
    serializer: Arc<dyn ErasedPacketSerializer>,
}

impl PacketDefinition {
    pub(crate) fn new<T, S, F>(id: u32, factory: F, serializer: S) -> Self
    where
        T: BedrockPacket,
        S: PacketSerializer<T> + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            id,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            factory: Arc::new(move || Box::new(factory()) as Box<dyn BedrockPacket>),
            serializer: Arc::new(TypedSerializer {
                serializer,
                _packet: PhantomData::<fn(T)>,
            }),
        }
    }

    /// Same binding with the serializer swapped out; id and factory are kept.
    pub(crate) fn with_serializer<T, S>(&self, serializer: S) -> Self
    where
        T: BedrockPacket,
        S: PacketSerializer<T> + 'static,
    {
        Self {
            id: self.id,
            type_id: self.type_id,
            type_name: self.type_name,
            factory: Arc::clone(&self.factory),
            serializer: Arc::new(TypedSerializer {
                serializer,
                _packet: PhantomData::<fn(T)>,
            }),
        }
    }

    /// The numeric wire id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// `TypeId` of the bound concrete packet type
    pub fn packet_type(&self) -> TypeId {
        self.type_id
    }

    /// Diagnostic name of the bound packet type
    pub fn packet_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn create_packet(&self) -> Box<dyn BedrockPacket> {
        (self.factory)()
    }

    pub(crate) fn serializer(&self) -> &dyn ErasedPacketSerializer {
        self.serializer.as_ref()
    }
}

impl fmt::Debug for PacketDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketDefinition")
            .field("id", &self.id)
            .field("packet", &self.type_name)
            .finish()
    }
}
