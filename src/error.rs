//! # Error Types
//!
//! Error handling for the packet codec layer.
//!
//! This module defines all error variants that can occur while reading packet
//! buffers, staging a codec through [`CodecBuilder`](crate::CodecBuilder),
//! or encoding outbound packets.
//!
//! ## Error Categories
//! - **Buffer Errors**: truncated reads, oversized VarInts, invalid UTF-8
//! - **Builder Errors**: duplicate registrations, missing version metadata
//! - **Encode Errors**: unserializable outbound packets, wrapped with the
//!   offending packet's identity
//!
//! Decode-side failures are deliberately absent from the public surface:
//! [`BedrockCodec::try_decode`](crate::BedrockCodec::try_decode) absorbs them
//! into an [`UnknownPacket`](crate::UnknownPacket) fallback instead of
//! surfacing an error, so a single malformed inbound packet can never take
//! down a connection.

use thiserror::Error;

/// CodecError is the primary error type for all codec operations
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unexpected end of buffer: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("VarInt is longer than {max_bytes} bytes")]
    VarIntTooLong { max_bytes: usize },

    #[error("string of {len} bytes exceeds maximum of {max} bytes")]
    StringTooLarge { len: usize, max: usize },

    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("packet type {0} is already registered")]
    DuplicatePacket(&'static str),

    #[error("packet type {0} is not registered")]
    PacketNotRegistered(String),

    #[error("packet is not a {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("no protocol version defined")]
    MissingProtocolVersion,

    #[error("no Minecraft version defined")]
    MissingMinecraftVersion,

    #[error("invalid Minecraft version: {0:?}")]
    InvalidMinecraftVersion(String),

    #[error("no helper factory defined")]
    MissingHelperFactory,

    #[error("must have at least one packet registered")]
    EmptyCodec,

    #[error("error whilst serializing {packet}")]
    Serialize {
        packet: String,
        #[source]
        source: Box<CodecError>,
    },

    #[error("serializer error: {0}")]
    Custom(String),
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;
