#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Builder staging, validation, and version-to-version diffing.

use bedrock_codec::{
    BedrockCodec, BedrockPacket, CodecBuilder, CodecError, CodecHelper, PacketBuffer,
    PacketSerializer, Result,
};
use std::any::{Any, TypeId};

// ============================================================================
// FIXTURES
// ============================================================================

struct TestHelper;

impl CodecHelper for TestHelper {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

macro_rules! test_packet {
    ($name:ident) => {
        #[derive(Debug, Default)]
        struct $name {
            value: u8,
        }

        impl BedrockPacket for $name {
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

test_packet!(AlphaPacket);
test_packet!(BetaPacket);
test_packet!(GammaPacket);

/// One-byte body serializer, generic over the packet type
struct ByteSerializer;

macro_rules! impl_byte_serializer {
    ($packet:ident) => {
        impl PacketSerializer<$packet> for ByteSerializer {
            fn serialize(
                &self,
                buf: &mut PacketBuffer,
                _helper: &mut dyn CodecHelper,
                packet: &$packet,
            ) -> Result<()> {
                buf.write_u8(packet.value);
                Ok(())
            }

            fn deserialize(
                &self,
                buf: &mut PacketBuffer,
                _helper: &mut dyn CodecHelper,
                packet: &mut $packet,
            ) -> Result<()> {
                packet.value = buf.read_u8()?;
                Ok(())
            }
        }
    };
}

impl_byte_serializer!(AlphaPacket);
impl_byte_serializer!(BetaPacket);
impl_byte_serializer!(GammaPacket);

/// Alternate AlphaPacket layout: the value is offset by one on the wire
struct ShiftedSerializer;

impl PacketSerializer<AlphaPacket> for ShiftedSerializer {
    fn serialize(
        &self,
        buf: &mut PacketBuffer,
        _helper: &mut dyn CodecHelper,
        packet: &AlphaPacket,
    ) -> Result<()> {
        buf.write_u8(packet.value.wrapping_add(1));
        Ok(())
    }

    fn deserialize(
        &self,
        buf: &mut PacketBuffer,
        _helper: &mut dyn CodecHelper,
        packet: &mut AlphaPacket,
    ) -> Result<()> {
        packet.value = buf.read_u8()?.wrapping_sub(1);
        Ok(())
    }
}

fn base_builder() -> CodecBuilder {
    BedrockCodec::builder()
        .protocol_version(100)
        .minecraft_version("1.20.40")
        .expect("valid version")
        .helper(|| Box::new(TestHelper))
}

fn abc_builder() -> CodecBuilder {
    base_builder()
        .register_packet(AlphaPacket::default, ByteSerializer, 1)
        .expect("register alpha")
        .register_packet(BetaPacket::default, ByteSerializer, 2)
        .expect("register beta")
        .register_packet(GammaPacket::default, ByteSerializer, 7)
        .expect("register gamma")
}

// ============================================================================
// REGISTRATION VALIDATION
// ============================================================================

#[test]
fn test_duplicate_type_registration_rejected() {
    let err = abc_builder()
        .register_packet(AlphaPacket::default, ByteSerializer, 5)
        .expect_err("re-registering AlphaPacket must fail");
    assert!(matches!(err, CodecError::DuplicatePacket(name) if name.contains("AlphaPacket")));
}

#[test]
fn test_update_serializer_on_unstaged_type_rejected() {
    let err = base_builder()
        .register_packet(BetaPacket::default, ByteSerializer, 2)
        .expect("register beta")
        .update_serializer::<AlphaPacket, _>(ShiftedSerializer)
        .expect_err("AlphaPacket is not staged");
    assert!(matches!(err, CodecError::PacketNotRegistered(name) if name.contains("AlphaPacket")));
}

#[test]
fn test_update_serializer_keeps_id_and_changes_wire_layout() {
    let codec = abc_builder()
        .update_serializer::<AlphaPacket, _>(ShiftedSerializer)
        .expect("AlphaPacket is staged")
        .build()
        .expect("codec should build");

    let definition = codec
        .packet_definition::<AlphaPacket>()
        .expect("still registered");
    assert_eq!(definition.id(), 1, "id must survive a serializer swap");

    let mut helper = codec.create_helper();
    let mut buf = PacketBuffer::new();
    codec
        .try_encode(helper.as_mut(), &mut buf, &AlphaPacket { value: 9 })
        .expect("encode should succeed");
    assert_eq!(buf.as_slice(), &[10], "new serializer must be in effect");
}

// ============================================================================
// BUILD VALIDATION
// ============================================================================

#[test]
fn test_build_without_packets_rejected() {
    let err = base_builder().build().expect_err("empty codec must fail");
    assert!(matches!(err, CodecError::EmptyCodec));
}

#[test]
fn test_build_without_protocol_version_rejected() {
    let err = BedrockCodec::builder()
        .minecraft_version("1.20.40")
        .expect("valid version")
        .helper(|| Box::new(TestHelper))
        .register_packet(AlphaPacket::default, ByteSerializer, 1)
        .expect("register")
        .build()
        .expect_err("missing protocol version must fail");
    assert!(matches!(err, CodecError::MissingProtocolVersion));
}

#[test]
fn test_build_without_minecraft_version_rejected() {
    let err = BedrockCodec::builder()
        .protocol_version(100)
        .helper(|| Box::new(TestHelper))
        .register_packet(AlphaPacket::default, ByteSerializer, 1)
        .expect("register")
        .build()
        .expect_err("missing game version must fail");
    assert!(matches!(err, CodecError::MissingMinecraftVersion));
}

#[test]
fn test_build_without_helper_rejected() {
    let err = BedrockCodec::builder()
        .protocol_version(100)
        .minecraft_version("1.20.40")
        .expect("valid version")
        .register_packet(AlphaPacket::default, ByteSerializer, 1)
        .expect("register")
        .build()
        .expect_err("missing helper factory must fail");
    assert!(matches!(err, CodecError::MissingHelperFactory));
}

#[test]
fn test_minecraft_version_must_have_three_components() {
    for bad in ["", "1", "1.20", "120"] {
        let err = BedrockCodec::builder()
            .minecraft_version(bad)
            .expect_err("too few components must fail");
        assert!(matches!(err, CodecError::InvalidMinecraftVersion(_)));
    }

    for good in ["1.20.40", "1.21.0.23", "0.0.1"] {
        BedrockCodec::builder()
            .minecraft_version(good)
            .expect("three or more components are valid");
    }
}

// ============================================================================
// RETAIN / DEREGISTER DIFFS
// ============================================================================

#[test]
fn test_retain_drops_everything_not_listed() {
    let codec = abc_builder()
        .retain_packets(&[TypeId::of::<AlphaPacket>()])
        .build()
        .expect("codec should build");

    assert_eq!(codec.packet_count(), 1);
    assert!(codec.packet_definition::<AlphaPacket>().is_some());
    assert!(codec.packet_definition::<BetaPacket>().is_none());
    assert!(codec.packet_definition::<GammaPacket>().is_none());

    // Only Alpha's slot is populated in the dense table
    assert!(codec.packet_definition_for_id(1).is_some());
    assert!(codec.packet_definition_for_id(2).is_none());
    assert!(codec.packet_definition_for_id(7).is_none());
}

#[test]
fn test_deregister_removes_one_binding() {
    let codec = abc_builder()
        .deregister_packet::<BetaPacket>()
        .build()
        .expect("codec should build");

    assert_eq!(codec.packet_count(), 2);
    assert!(codec.packet_definition::<BetaPacket>().is_none());
    assert!(codec.packet_definition_for_id(2).is_none());
    assert!(codec.packet_definition::<AlphaPacket>().is_some());
    assert!(codec.packet_definition::<GammaPacket>().is_some());
}

#[test]
fn test_deregister_unstaged_type_is_a_no_op() {
    let codec = abc_builder()
        .deregister_packet::<AlphaPacket>()
        .deregister_packet::<AlphaPacket>()
        .build()
        .expect("codec should build");
    assert_eq!(codec.packet_count(), 2);
}

// ============================================================================
// DUPLICATE NUMERIC IDS
// ============================================================================

#[test]
fn test_latest_registration_wins_a_shared_numeric_id() {
    let codec = base_builder()
        .register_packet(AlphaPacket::default, ByteSerializer, 3)
        .expect("register alpha")
        .register_packet(BetaPacket::default, ByteSerializer, 3)
        .expect("same id, different type, accepted")
        .build()
        .expect("duplicate numeric id is not a build error");

    // The id slot resolves to the latest registration; both types stay
    // reachable through the type-keyed table
    let definition = codec.packet_definition_for_id(3).expect("slot populated");
    assert_eq!(definition.packet_type(), TypeId::of::<BetaPacket>());
    assert_eq!(codec.packet_count(), 2);
    assert_eq!(
        codec
            .packet_definition::<AlphaPacket>()
            .expect("alpha still by type")
            .id(),
        3
    );
}

// ============================================================================
// VERSION DERIVATION (to_builder)
// ============================================================================

#[test]
fn test_to_builder_carries_bindings_and_metadata() {
    let v1 = abc_builder().build().expect("v1 should build");

    let v2 = v1
        .to_builder()
        .protocol_version(101)
        .minecraft_version("1.20.50")
        .expect("valid version")
        .deregister_packet::<GammaPacket>()
        .build()
        .expect("v2 should build");

    assert_eq!(v2.protocol_version(), 101);
    assert_eq!(v2.minecraft_version(), "1.20.50");
    assert_eq!(v2.raknet_protocol_version(), 10, "default carried over");
    assert_eq!(v2.packet_count(), 2);
    assert_eq!(
        v2.packet_definition::<AlphaPacket>().map(|d| d.id()),
        Some(1)
    );
}

#[test]
fn test_to_builder_mutations_never_affect_the_source_codec() {
    let v1 = abc_builder().build().expect("v1 should build");

    let _v2 = v1
        .to_builder()
        .update_serializer::<AlphaPacket, _>(ShiftedSerializer)
        .expect("staged")
        .deregister_packet::<BetaPacket>()
        .build()
        .expect("v2 should build");

    // v1 still has all three packets and the original Alpha layout
    assert_eq!(v1.packet_count(), 3);
    let mut helper = v1.create_helper();
    let mut buf = PacketBuffer::new();
    v1.try_encode(helper.as_mut(), &mut buf, &AlphaPacket { value: 9 })
        .expect("encode on v1");
    assert_eq!(buf.as_slice(), &[9], "v1 layout unchanged");
}

#[test]
fn test_raknet_protocol_version_override() {
    let codec = base_builder()
        .raknet_protocol_version(11)
        .register_packet(AlphaPacket::default, ByteSerializer, 1)
        .expect("register")
        .build()
        .expect("codec should build");
    assert_eq!(codec.raknet_protocol_version(), 11);
}
