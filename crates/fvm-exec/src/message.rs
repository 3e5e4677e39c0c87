//! The frame-bridging message the interpreter emits for a nested `CALL` or `CREATE`.
//!
//! Only the fields that differ between frames travel on the wire. Origin, energy price, block
//! data and the originating transaction hash are inherited from the calling frame when the
//! message is turned into an [`ExecutionContext`](crate::ExecutionContext).

use alloy_primitives::{Address, Bytes, U256};

use crate::{
    constants::wire::{ADDRESS_SIZE, VALUE_SIZE},
    CallFlags, CallKind, MessageError,
};

/// A request from the interpreter to open a nested frame.
///
/// # Wire layout
///
/// All integers are big-endian:
///
/// | field       | bytes           |
/// |-------------|-----------------|
/// | destination | 20              |
/// | caller      | 20              |
/// | energy      | 8               |
/// | value       | 16              |
/// | data length | 4               |
/// | data        | data length     |
/// | depth       | 4               |
/// | kind        | 4               |
/// | flags       | 4               |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallMessage {
    /// The callee. Ignored for [`CallKind::Create`], whose address is derived.
    pub destination: Address,
    /// The frame issuing the call.
    pub caller: Address,
    /// The energy handed to the nested frame.
    pub energy_limit: u64,
    /// The value transferred.
    pub value: U256,
    /// Call data, or init code for a creation.
    pub data: Bytes,
    /// The depth of the nested frame.
    pub depth: u32,
    /// The kind of the nested frame.
    pub kind: CallKind,
    /// Interpreter flags of the nested frame.
    pub flags: CallFlags,
}

impl CallMessage {
    /// Encodes the message in its wire layout.
    ///
    /// Fails if the value does not fit its 16-byte field.
    pub fn encode(&self) -> Result<Bytes, MessageError> {
        let value =
            u128::try_from(self.value).map_err(|_| MessageError::ValueOverflow(self.value))?;
        let mut buf =
            Vec::with_capacity(2 * ADDRESS_SIZE + 8 + VALUE_SIZE + 4 + self.data.len() + 12);
        buf.extend_from_slice(self.destination.as_slice());
        buf.extend_from_slice(self.caller.as_slice());
        buf.extend_from_slice(&self.energy_limit.to_be_bytes());
        buf.extend_from_slice(&value.to_be_bytes());
        buf.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.data);
        buf.extend_from_slice(&self.depth.to_be_bytes());
        buf.extend_from_slice(&self.kind.code().to_be_bytes());
        buf.extend_from_slice(&self.flags.bits().to_be_bytes());
        Ok(buf.into())
    }

    /// Decodes a message from its wire layout. The input must hold exactly one message.
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        let mut reader = Reader::new(bytes);
        let destination = Address::from_slice(reader.take("destination", ADDRESS_SIZE)?);
        let caller = Address::from_slice(reader.take("caller", ADDRESS_SIZE)?);
        let energy_limit = reader.read_u64("energy limit")?;
        let value = U256::from_be_slice(reader.take("value", VALUE_SIZE)?);
        let data = reader.read_prefixed("data")?;
        let depth = reader.read_u32("depth")?;
        let kind = CallKind::try_from(reader.read_u32("kind")?)?;
        let flags = CallFlags::from_bits_retain(reader.read_u32("flags")?);
        reader.finish()?;
        Ok(Self { destination, caller, energy_limit, value, data, depth, kind, flags })
    }
}

/// A cursor over big-endian wire data.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn take(
        &mut self,
        field: &'static str,
        len: usize,
    ) -> Result<&'a [u8], MessageError> {
        let remaining = self.bytes.len();
        if remaining < len {
            return Err(MessageError::Truncated { field, needed: len, remaining });
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    pub(crate) fn read_u32(&mut self, field: &'static str) -> Result<u32, MessageError> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take(field, 4)?);
        Ok(u32::from_be_bytes(word))
    }

    pub(crate) fn read_u64(&mut self, field: &'static str) -> Result<u64, MessageError> {
        let mut word = [0u8; 8];
        word.copy_from_slice(self.take(field, 8)?);
        Ok(u64::from_be_bytes(word))
    }

    /// Reads a u32 length followed by that many bytes.
    pub(crate) fn read_prefixed(&mut self, field: &'static str) -> Result<Bytes, MessageError> {
        let len = self.read_u32(field)? as usize;
        Ok(Bytes::copy_from_slice(self.take(field, len)?))
    }

    pub(crate) const fn finish(self) -> Result<(), MessageError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(MessageError::TrailingBytes(self.bytes.len()))
        }
    }
}
