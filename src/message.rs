//! Membership Wire Protocol
//!
//! Defines the message format exchanged between group members. All messages
//! use bincode with a big-endian, fixed-int configuration so that every
//! record occupies a fixed number of bytes and the record count is carried
//! explicitly in the header rather than inferred from the payload length.
//!
use bincode::{Decode, Encode};

use crate::error::{Result, StarlingError};
use crate::member::{MemberId, MemberRecord};

/// Message type tag. Three kinds, everything else is rejected at decode.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, PartialEq)]
pub enum MessageKind {
    /// Sent by a joining node to the introducer; carries only the sender's
    /// own record.
    JoinRequest,
    /// Introducer's answer: its full current membership snapshot.
    JoinReply,
    /// Periodic gossip piggybacking the sender's membership view.
    Heartbeat,
}

/// A decoded membership message.
///
/// `records[0]` is always the sender's own record; use [`Message::sender`]
/// to recover the origin of a message.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub records: Vec<MemberRecord>,
}

fn wire_config() -> bincode::config::Configuration<bincode::config::BigEndian, bincode::config::Fixint>
{
    bincode::config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

impl Message {
    /// Serialize for the wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self, wire_config())
            .map_err(|e| StarlingError::MalformedMessage(e.to_string()))
    }

    /// Deserialize from the wire.
    ///
    /// Rejects buffers that are truncated (declared record count exceeds the
    /// trailing bytes), overlong (bytes remain after the declared records),
    /// or tagged with an unrecognized message type.
    pub fn decode(data: &[u8]) -> Result<Message> {
        match bincode::decode_from_slice::<Message, _>(data, wire_config()) {
            Ok((message, consumed)) if consumed == data.len() => Ok(message),
            Ok((_, consumed)) => Err(StarlingError::MalformedMessage(format!(
                "{} trailing bytes after {} consumed",
                data.len() - consumed,
                consumed
            ))),
            Err(bincode::error::DecodeError::UnexpectedVariant { found, .. }) => {
                Err(StarlingError::UnknownMessageType(found))
            }
            Err(e) => Err(StarlingError::MalformedMessage(e.to_string())),
        }
    }

    /// The member that sent this message, i.e. the first record.
    pub fn sender(&self) -> Option<MemberId> {
        self.records.first().map(|r| r.member)
    }
}

/// Builds an outbound [`Message`] by appending records to a growable buffer.
///
/// The constructor takes the sender's own record, which keeps the
/// "records[0] is the sender" invariant in one place.
#[derive(Debug)]
pub struct MessageBuilder {
    kind: MessageKind,
    records: Vec<MemberRecord>,
}

impl MessageBuilder {
    pub fn new(kind: MessageKind, own_record: MemberRecord) -> Self {
        Self {
            kind,
            records: vec![own_record],
        }
    }

    pub fn push(&mut self, record: MemberRecord) -> &mut Self {
        self.records.push(record);
        self
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = MemberRecord>) -> &mut Self {
        self.records.extend(records);
        self
    }

    pub fn build(self) -> Message {
        Message {
            kind: self.kind,
            records: self.records,
        }
    }
}
