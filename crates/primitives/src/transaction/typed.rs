use crate::{
    AccessListItem, Transaction, TxBaseSystem, TxEip1559, TxEip2930, TxEip4844, TxKind, TxLegacy,
    TxSignature, TxType,
};
use alloy_primitives::{Bytes, ChainId, B256, U256};
use bytes::BufMut;
use derive_more::From;

/// A transaction of any supported shape.
///
/// The shape is the enum case, so the transaction type can never disagree with the fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, From)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum TypedTransaction {
    /// Legacy transaction (type `0x0`).
    #[cfg_attr(feature = "serde", serde(rename = "0x0", alias = "0x00"))]
    Legacy(TxLegacy),
    /// Transaction with an [`AccessList`](crate::AccessList) ([EIP-2930](https://eips.ethereum.org/EIPS/eip-2930)), type `0x1`.
    #[cfg_attr(feature = "serde", serde(rename = "0x1", alias = "0x01"))]
    Eip2930(TxEip2930),
    /// A transaction with a priority fee ([EIP-1559](https://eips.ethereum.org/EIPS/eip-1559)), type `0x2`.
    #[cfg_attr(feature = "serde", serde(rename = "0x2", alias = "0x02"))]
    Eip1559(TxEip1559),
    /// Shard Blob Transactions ([EIP-4844](https://eips.ethereum.org/EIPS/eip-4844)), type `0x3`.
    #[cfg_attr(feature = "serde", serde(rename = "0x3", alias = "0x03"))]
    Eip4844(TxEip4844),
    /// Base system transaction (type `0x7d`).
    #[cfg_attr(feature = "serde", serde(rename = "0x7d"))]
    BaseSystem(TxBaseSystem),
}

/// Calls the same method on whichever shape the transaction holds.
macro_rules! delegate {
    ($self:expr => $tx:ident.$method:ident($($arg:expr),*)) => {
        match $self {
            Self::Legacy($tx) => $tx.$method($($arg),*),
            Self::Eip2930($tx) => $tx.$method($($arg),*),
            Self::Eip1559($tx) => $tx.$method($($arg),*),
            Self::Eip4844($tx) => $tx.$method($($arg),*),
            Self::BaseSystem($tx) => $tx.$method($($arg),*),
        }
    };
}

impl TypedTransaction {
    /// Returns the [`TxLegacy`] variant if the transaction is a legacy transaction.
    pub const fn as_legacy(&self) -> Option<&TxLegacy> {
        match self {
            Self::Legacy(tx) => Some(tx),
            _ => None,
        }
    }

    /// Returns the [`TxEip2930`] variant if the transaction is an EIP-2930 transaction.
    pub const fn as_eip2930(&self) -> Option<&TxEip2930> {
        match self {
            Self::Eip2930(tx) => Some(tx),
            _ => None,
        }
    }

    /// Returns the [`TxEip1559`] variant if the transaction is an EIP-1559 transaction.
    pub const fn as_eip1559(&self) -> Option<&TxEip1559> {
        match self {
            Self::Eip1559(tx) => Some(tx),
            _ => None,
        }
    }

    /// Returns the [`TxEip4844`] variant if the transaction is an EIP-4844 transaction.
    pub const fn as_eip4844(&self) -> Option<&TxEip4844> {
        match self {
            Self::Eip4844(tx) => Some(tx),
            _ => None,
        }
    }

    /// Returns the [`TxBaseSystem`] variant if the transaction is a base system transaction.
    pub const fn as_base_system(&self) -> Option<&TxBaseSystem> {
        match self {
            Self::BaseSystem(tx) => Some(tx),
            _ => None,
        }
    }

    /// Returns true if the transaction is a legacy transaction.
    #[inline]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Encodes the payload that is signed for the given chain id.
    ///
    /// Typed shapes sign `type || rlp(fields)`, legacy style shapes sign the
    /// [EIP-155](https://eips.ethereum.org/EIPS/eip-155) payload, or the unprotected one without a
    /// chain id.
    pub fn encode_for_signing(&self, chain_id: Option<ChainId>, out: &mut dyn BufMut) {
        delegate!(self => tx.encode_for_signing(chain_id, out))
    }

    /// Heavy operation that returns the signature hash for the given chain id.
    pub fn signature_hash_for(&self, chain_id: Option<ChainId>) -> B256 {
        delegate!(self => tx.signature_hash(chain_id))
    }

    /// Heavy operation that returns the signature hash for the chain id the transaction is bound
    /// to. It is only for signature signing or signer recovery.
    pub fn signature_hash(&self) -> B256 {
        self.signature_hash_for(self.chain_id())
    }

    /// Returns the length of the EIP-2718 encoding, type byte included.
    pub(crate) fn eip2718_encoded_length(&self) -> usize {
        delegate!(self => tx.eip2718_encoded_length())
    }

    /// Encodes the transaction in the EIP-2718 format: `type || rlp(fields)` for typed shapes, a
    /// bare RLP list for legacy transactions.
    pub(crate) fn eip2718_encode(&self, out: &mut dyn BufMut) {
        delegate!(self => tx.eip2718_encode(out))
    }

    /// Decodes the RLP list of a transaction of the given type, the type byte already consumed.
    pub(crate) fn rlp_decode_typed(ty: TxType, buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(match ty {
            TxType::Legacy => Self::Legacy(TxLegacy::rlp_decode_signed(buf)?),
            TxType::Eip2930 => Self::Eip2930(TxEip2930::rlp_decode_signed(buf)?),
            TxType::Eip1559 => Self::Eip1559(TxEip1559::rlp_decode_signed(buf)?),
            TxType::Eip4844 => Self::Eip4844(TxEip4844::rlp_decode_signed(buf)?),
            TxType::BaseSystem => Self::BaseSystem(TxBaseSystem::rlp_decode_signed(buf)?),
        })
    }
}

impl Transaction for TypedTransaction {
    fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy(_) => TxLegacy::TX_TYPE,
            Self::Eip2930(_) => TxEip2930::TX_TYPE,
            Self::Eip1559(_) => TxEip1559::TX_TYPE,
            Self::Eip4844(_) => TxEip4844::TX_TYPE,
            Self::BaseSystem(_) => TxBaseSystem::TX_TYPE,
        }
    }

    fn chain_id(&self) -> Option<ChainId> {
        delegate!(self => tx.chain_id())
    }

    fn access_list(&self) -> &[AccessListItem] {
        delegate!(self => tx.access_list())
    }

    fn nonce(&self) -> u64 {
        delegate!(self => tx.nonce())
    }

    fn gas_limit(&self) -> u64 {
        delegate!(self => tx.gas_limit())
    }

    fn gas_price(&self) -> U256 {
        delegate!(self => tx.gas_price())
    }

    fn max_priority_fee_per_gas(&self) -> U256 {
        delegate!(self => tx.max_priority_fee_per_gas())
    }

    fn max_fee_per_gas(&self) -> U256 {
        delegate!(self => tx.max_fee_per_gas())
    }

    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256 {
        delegate!(self => tx.effective_gas_price(base_fee))
    }

    fn value(&self) -> U256 {
        delegate!(self => tx.value())
    }

    fn kind(&self) -> TxKind {
        delegate!(self => tx.kind())
    }

    fn input(&self) -> &Bytes {
        delegate!(self => tx.input())
    }

    fn max_fee_per_blob_gas(&self) -> Option<U256> {
        delegate!(self => tx.max_fee_per_blob_gas())
    }

    fn blob_versioned_hashes(&self) -> &[B256] {
        delegate!(self => tx.blob_versioned_hashes())
    }

    fn raw_signature(&self) -> Option<TxSignature> {
        delegate!(self => tx.raw_signature())
    }

    fn set_signature(&mut self, chain_id: ChainId, signature: TxSignature) {
        delegate!(self => tx.set_signature(chain_id, signature))
    }

    fn deep_copy(&self) -> Self {
        match self {
            Self::Legacy(tx) => Self::Legacy(tx.deep_copy()),
            Self::Eip2930(tx) => Self::Eip2930(tx.deep_copy()),
            Self::Eip1559(tx) => Self::Eip1559(tx.deep_copy()),
            Self::Eip4844(tx) => Self::Eip4844(tx.deep_copy()),
            Self::BaseSystem(tx) => Self::BaseSystem(tx.deep_copy()),
        }
    }

    fn size(&self) -> usize {
        delegate!(self => tx.size())
    }
}
