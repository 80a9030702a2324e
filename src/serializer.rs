//! # Serializer Contracts
//!
//! The two collaborator seams the codec calls but never implements itself:
//! per-packet-type serializers and the per-connection helper context.

use crate::buffer::PacketBuffer;
use crate::Result;
use std::any::Any;
use std::sync::Arc;

/// Field-level codec for one concrete packet type.
///
/// Implementations own the packet's wire layout; the codec only selects and
/// invokes them. `deserialize` may fail on malformed input and must not read
/// past the logical end of the frame on well-formed input — the codec treats
/// both an error and leftover unread bytes as a misparse.
pub trait PacketSerializer<T>: Send + Sync {
    fn serialize(
        &self,
        buf: &mut PacketBuffer,
        helper: &mut dyn CodecHelper,
        packet: &T,
    ) -> Result<()>;

    fn deserialize(
        &self,
        buf: &mut PacketBuffer,
        helper: &mut dyn CodecHelper,
        packet: &mut T,
    ) -> Result<()>;
}

/// Opaque per-connection context handed to every serializer call.
///
/// This is the only place version-specific mutable lookup state (for example
/// runtime-negotiated enum tables) should live. The codec constructs helpers
/// through the registered factory and passes them along untouched; serializers
/// downcast to their concrete helper type via the `Any` accessors.
pub trait CodecHelper: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Factory producing a fresh helper per connection (or per call)
pub type HelperFactory = Arc<dyn Fn() -> Box<dyn CodecHelper> + Send + Sync>;
