//! A transaction together with its memoized hash.

use crate::{
    transaction::util::secp256k1, AccessListItem, SignatureError, Transaction, TxKind, TxSignature,
    TxType, TypedTransaction,
};
use alloy_primitives::{keccak256, Address, Bytes, ChainId, TxHash, B256, U256};
use alloy_rlp::{Decodable, Encodable, Error as RlpError, Header, EMPTY_LIST_CODE};
use bytes::{Buf, BufMut};
use core::{
    hash::{Hash, Hasher},
    mem,
};
use derive_more::{AsRef, Deref};
use std::sync::OnceLock;
use tracing::{debug, trace};

/// A transaction of any shape, owned together with its hash.
///
/// The hash is the keccak256 of the EIP-2718 encoding. It is computed on first use and reset
/// whenever the signature changes, the only mutation a transaction allows after construction.
#[derive(Debug, Clone, Eq, AsRef, Deref)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxEnvelope {
    /// Transaction hash
    #[cfg_attr(feature = "serde", serde(skip))]
    hash: OnceLock<TxHash>,
    /// Raw transaction info
    #[deref]
    #[as_ref]
    transaction: TypedTransaction,
}

impl TxEnvelope {
    /// Wraps the transaction, the hash is computed on the first [`TxEnvelope::hash`] call.
    pub fn new(transaction: TypedTransaction) -> Self {
        Self { hash: OnceLock::new(), transaction }
    }

    /// Returns the wrapped transaction.
    pub const fn transaction(&self) -> &TypedTransaction {
        &self.transaction
    }

    /// Consumes the envelope and returns the wrapped transaction.
    pub fn into_transaction(self) -> TypedTransaction {
        self.transaction
    }

    /// Returns the transaction hash, computing it if the signature changed since the last call.
    pub fn hash(&self) -> TxHash {
        *self.hash.get_or_init(|| self.recalculate_hash())
    }

    /// Computes the hash of the EIP-2718 encoding, ignoring the memoized value.
    pub fn recalculate_hash(&self) -> TxHash {
        let hash = keccak256(self.encoded_2718());
        trace!(
            target: "primitives::tx",
            %hash,
            tx_type = %self.tx_type(),
            "computed transaction hash"
        );
        hash
    }

    /// Heavy operation that returns the signature hash for the chain id the transaction is bound
    /// to. It is only for signature signing or signer recovery.
    pub fn signature_hash(&self) -> B256 {
        self.transaction.signature_hash()
    }

    /// Returns `true` if the transaction carries a signature.
    pub fn is_signed(&self) -> bool {
        self.raw_signature().is_some()
    }

    /// Signs the transaction for `chain_id` with the given secret key.
    ///
    /// An unsigned transaction becomes signed, a signed transaction is never signed again and
    /// [`SignatureError::AlreadySigned`] is returned instead.
    pub fn sign(&mut self, secret: B256, chain_id: ChainId) -> Result<(), SignatureError> {
        if self.is_signed() {
            return Err(SignatureError::AlreadySigned)
        }

        let tx_type = self.tx_type();
        let signature_hash = self.transaction.signature_hash_for(Some(chain_id));
        let (r, s, odd_y_parity) = secp256k1::sign_message(secret, signature_hash)?;
        let signature = TxSignature::from_parity(tx_type, odd_y_parity, r, s, Some(chain_id));
        trace!(
            target: "primitives::tx",
            %tx_type,
            chain_id,
            %signature_hash,
            "signed transaction"
        );

        self.set_signature(chain_id, signature);
        Ok(())
    }

    /// Recover signer from signature and hash.
    ///
    /// Returns `None` if the transaction is not signed or the signature is invalid, or if the
    /// `s` value is greater than `secp256k1n / 2`, see [EIP-2](https://eips.ethereum.org/EIPS/eip-2).
    pub fn recover_signer(&self) -> Option<Address> {
        let signature = self.raw_signature()?;
        let signer = signature.recover_signer(self.tx_type(), self.signature_hash());
        if signer.is_none() {
            trace!(target: "primitives::tx", tx_type = %self.tx_type(), "failed to recover signer");
        }
        signer
    }

    /// Recover signer from signature and hash _without ensuring that the signature has a low `s`
    /// value_.
    ///
    /// Returns `None` if the transaction is not signed or the signature is invalid.
    pub fn recover_signer_unchecked(&self) -> Option<Address> {
        let signature = self.raw_signature()?;
        let signer = signature.recover_signer_unchecked(self.tx_type(), self.signature_hash());
        if signer.is_none() {
            trace!(target: "primitives::tx", tx_type = %self.tx_type(), "failed to recover signer");
        }
        signer
    }

    /// Returns the length of the EIP-2718 encoding.
    pub fn encode_2718_len(&self) -> usize {
        self.transaction.eip2718_encoded_length()
    }

    /// Encodes the transaction in the EIP-2718 format: `type || rlp(fields)` for typed shapes, a
    /// bare RLP list for legacy transactions.
    pub fn encode_2718(&self, out: &mut dyn BufMut) {
        self.transaction.eip2718_encode(out)
    }

    /// Returns the EIP-2718 encoding of the transaction.
    pub fn encoded_2718(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encode_2718_len());
        self.encode_2718(&mut out);
        out
    }

    /// Decodes a transaction from its EIP-2718 encoding.
    ///
    /// A first byte of at least `0xc0` starts a legacy transaction list, anything else must be the
    /// type byte of a supported typed transaction.
    pub fn decode_2718(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let ty = *buf.first().ok_or(RlpError::InputTooShort)?;
        if ty >= EMPTY_LIST_CODE {
            return TypedTransaction::rlp_decode_typed(TxType::Legacy, buf).map(Self::new)
        }

        let tx_type = match TxType::try_from(ty) {
            Ok(tx_type) if tx_type.is_typed() => tx_type,
            Ok(_) => {
                debug!(
                    target: "primitives::tx",
                    ty,
                    "rejected legacy transaction with a type byte"
                );
                return Err(RlpError::Custom("legacy transaction cannot be typed"))
            }
            Err(err) => {
                debug!(target: "primitives::tx", %err, "rejected transaction");
                return Err(err.into())
            }
        };
        buf.advance(1);
        TypedTransaction::rlp_decode_typed(tx_type, buf).map(Self::new)
    }
}

impl Transaction for TxEnvelope {
    fn tx_type(&self) -> TxType {
        self.transaction.tx_type()
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.transaction.chain_id()
    }

    fn access_list(&self) -> &[AccessListItem] {
        self.transaction.access_list()
    }

    fn nonce(&self) -> u64 {
        self.transaction.nonce()
    }

    fn gas_limit(&self) -> u64 {
        self.transaction.gas_limit()
    }

    fn gas_price(&self) -> U256 {
        self.transaction.gas_price()
    }

    fn max_priority_fee_per_gas(&self) -> U256 {
        self.transaction.max_priority_fee_per_gas()
    }

    fn max_fee_per_gas(&self) -> U256 {
        self.transaction.max_fee_per_gas()
    }

    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256 {
        self.transaction.effective_gas_price(base_fee)
    }

    fn value(&self) -> U256 {
        self.transaction.value()
    }

    fn kind(&self) -> TxKind {
        self.transaction.kind()
    }

    fn input(&self) -> &Bytes {
        self.transaction.input()
    }

    fn max_fee_per_blob_gas(&self) -> Option<U256> {
        self.transaction.max_fee_per_blob_gas()
    }

    fn blob_versioned_hashes(&self) -> &[B256] {
        self.transaction.blob_versioned_hashes()
    }

    fn raw_signature(&self) -> Option<TxSignature> {
        self.transaction.raw_signature()
    }

    /// Attaches the signature values and drops the memoized hash.
    fn set_signature(&mut self, chain_id: ChainId, signature: TxSignature) {
        self.transaction.set_signature(chain_id, signature);
        self.hash.take();
    }

    fn deep_copy(&self) -> Self {
        Self::new(self.transaction.deep_copy())
    }

    #[inline]
    fn size(&self) -> usize {
        mem::size_of::<OnceLock<TxHash>>() + self.transaction.size()
    }
}

impl From<TypedTransaction> for TxEnvelope {
    fn from(transaction: TypedTransaction) -> Self {
        Self::new(transaction)
    }
}

impl PartialEq for TxEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.transaction == other.transaction
    }
}

impl Hash for TxEnvelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.transaction.hash(state);
    }
}

impl Encodable for TxEnvelope {
    /// This encodes the transaction _with_ the signature, and an rlp header.
    ///
    /// For legacy transactions, it encodes the transaction data:
    /// `rlp(tx-data)`
    ///
    /// For EIP-2718 typed transactions, it encodes the transaction type followed by the rlp of the
    /// transaction:
    /// `rlp(tx-type || rlp(tx-data))`
    fn encode(&self, out: &mut dyn BufMut) {
        if self.transaction.is_legacy() {
            return self.encode_2718(out)
        }
        Header { list: false, payload_length: self.encode_2718_len() }.encode(out);
        self.encode_2718(out);
    }

    fn length(&self) -> usize {
        let mut payload_length = self.encode_2718_len();
        if !self.transaction.is_legacy() {
            payload_length += Header { list: false, payload_length }.length();
        }
        payload_length
    }
}

impl Decodable for TxEnvelope {
    /// This `Decodable` implementation only supports decoding rlp encoded transactions as it's used
    /// by p2p.
    ///
    /// The p2p encoding format always includes an RLP header, although the type RLP header depends
    /// on whether or not the transaction is a legacy transaction.
    ///
    /// If the transaction is a legacy transaction, it is just encoded as a RLP list:
    /// `rlp(tx-data)`.
    ///
    /// If the transaction is a typed transaction, it is encoded as a RLP string:
    /// `rlp(tx-type || rlp(tx-data))`
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let first = *buf.first().ok_or(RlpError::InputTooShort)?;
        if first >= EMPTY_LIST_CODE {
            return Self::decode_2718(buf)
        }

        let header = Header::decode(buf)?;
        if header.list {
            return Err(RlpError::UnexpectedList)
        }
        if buf.len() < header.payload_length {
            return Err(RlpError::InputTooShort)
        }

        let remaining = buf.len();
        let tx = Self::decode_2718(buf)?;
        if tx.transaction.is_legacy() {
            return Err(RlpError::Custom("legacy transaction wrapped in a string"))
        }
        let consumed = remaining - buf.len();
        if consumed != header.payload_length {
            return Err(RlpError::UnexpectedLength)
        }
        Ok(tx)
    }
}

#[cfg(any(test, feature = "arbitrary"))]
impl<'a> arbitrary::Arbitrary<'a> for TxEnvelope {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let mut transaction = <TypedTransaction as arbitrary::Arbitrary<'a>>::arbitrary(u)?;
        // attaching the signature again drops an all-zero triple
        if let Some(signature) = transaction.raw_signature() {
            let chain_id = transaction.chain_id().unwrap_or_default();
            transaction.set_signature(chain_id, signature);
        }
        Ok(Self::new(transaction))
    }
}
