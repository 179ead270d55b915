use alloy_primitives::Address;
use alloy_rlp::{Decodable, Encodable, Error as RlpError, EMPTY_STRING_CODE};
use bytes::{Buf, BufMut};

/// The `to` field of a transaction. Either a target address, or empty for a
/// contract creation.
///
/// An empty recipient is never represented by the zero address: the zero address is a valid
/// call target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Option<Address>", into = "Option<Address>"))]
pub enum TxKind {
    /// A transaction that creates a contract.
    #[default]
    Create,
    /// A transaction that calls a contract or transfer.
    Call(Address),
}

impl TxKind {
    /// Returns the address of the contract that will be called or will receive the transfer.
    pub const fn to(&self) -> Option<&Address> {
        match self {
            Self::Create => None,
            Self::Call(to) => Some(to),
        }
    }

    /// Returns true if the transaction is a contract creation.
    #[inline]
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create)
    }

    /// Returns true if the transaction is a contract call.
    #[inline]
    pub const fn is_call(&self) -> bool {
        matches!(self, Self::Call(_))
    }

    /// Calculates a heuristic for the in-memory size of the [`TxKind`].
    #[inline]
    pub const fn size(&self) -> usize {
        core::mem::size_of::<Self>()
    }
}

impl From<Address> for TxKind {
    fn from(to: Address) -> Self {
        Self::Call(to)
    }
}

impl From<Option<Address>> for TxKind {
    fn from(to: Option<Address>) -> Self {
        to.map_or(Self::Create, Self::Call)
    }
}

impl From<TxKind> for Option<Address> {
    fn from(kind: TxKind) -> Self {
        kind.to().copied()
    }
}

impl Encodable for TxKind {
    /// A call encodes the target address, a creation encodes the empty string `0x80`.
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Self::Call(to) => to.encode(out),
            Self::Create => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Call(to) => to.length(),
            Self::Create => 1, // EMPTY_STRING_CODE is a single byte
        }
    }
}

impl Decodable for TxKind {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        if let Some(&first) = buf.first() {
            if first == EMPTY_STRING_CODE {
                buf.advance(1);
                Ok(Self::Create)
            } else {
                let addr = <Address as Decodable>::decode(buf)?;
                Ok(Self::Call(addr))
            }
        } else {
            Err(RlpError::InputTooShort)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn raw_kind_encoding_sanity() {
        // check the 0x80 encoding for Create
        let mut buf = Vec::new();
        TxKind::Create.encode(&mut buf);
        assert_eq!(buf, vec![0x80]);

        // check decoding
        let buf = [0x80];
        let decoded = TxKind::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded, TxKind::Create);
    }

    #[test]
    fn zero_address_is_a_call() {
        let kind = TxKind::Call(Address::ZERO);
        assert!(kind.is_call());
        assert_eq!(kind.to(), Some(&Address::ZERO));

        let mut buf = Vec::new();
        kind.encode(&mut buf);
        assert_eq!(buf.len(), kind.length());
        assert_ne!(buf, vec![EMPTY_STRING_CODE]);
        assert_eq!(TxKind::decode(&mut buf.as_slice()).unwrap(), kind);
    }

    #[test]
    fn option_conversions() {
        let to = address!("d3e8763675e4c425df46cc3b5c0f6cbdac396046");
        assert_eq!(TxKind::from(Some(to)), TxKind::Call(to));
        assert_eq!(TxKind::from(None::<Address>), TxKind::Create);
        assert_eq!(Option::<Address>::from(TxKind::Create), None);
        assert_eq!(Option::<Address>::from(TxKind::Call(to)), Some(to));
    }

    #[test]
    fn decode_empty_input() {
        assert_eq!(TxKind::decode(&mut &[][..]), Err(RlpError::InputTooShort));
    }
}
