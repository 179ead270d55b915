use crate::{
    transaction::{
        rlp::{decode_list, encode_list_header, list_length},
        signature::derive_chain_id,
    },
    Transaction, TxKind, TxSignature, TxType,
};
use alloy_primitives::{keccak256, Bytes, ChainId, B256, U256};
use alloy_rlp::{Decodable, Encodable};
use bytes::BufMut;
use core::mem;

/// Legacy transaction.
///
/// The chain id is not a field: it is encoded in the signature `v` value, see
/// [EIP-155](https://eips.ethereum.org/EIPS/eip-155).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxLegacy {
    /// A scalar value equal to the number of transactions sent by the sender; formally Tn.
    pub nonce: u64,
    /// A scalar value equal to the number of Wei to be paid per unit of gas for all computation
    /// costs incurred as a result of the execution of this transaction; formally Tp.
    pub gas_price: U256,
    /// A scalar value equal to the maximum amount of gas that should be used in executing this
    /// transaction. This is paid up-front, before any computation is done and may not be
    /// increased later; formally Tg.
    pub gas_limit: u64,
    /// The 160-bit address of the message call's recipient or, for a contract creation
    /// transaction, [`TxKind::Create`]; formally Tt.
    pub to: TxKind,
    /// A scalar value equal to the number of Wei to be transferred to the message call's
    /// recipient or, in the case of contract creation, as an endowment to the newly created
    /// account; formally Tv.
    pub value: U256,
    /// The init code of a contract creation, or the call data of a message call; formally Ti
    /// or Td.
    pub input: Bytes,
    /// The raw signature values, `None` until the transaction is signed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub signature: Option<TxSignature>,
}

impl TxLegacy {
    /// The type of the transaction.
    pub const TX_TYPE: TxType = TxType::Legacy;

    const fn as_fields(&self) -> LegacyFields<'_> {
        LegacyFields {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            input: &self.input,
            signature: self.signature.as_ref(),
        }
    }

    /// Outputs the length of all fields, signature included, without a RLP header.
    pub(crate) fn fields_len(&self) -> usize {
        self.as_fields().fields_len()
    }

    /// Encodes all fields in order, signature last, without a RLP header.
    pub(crate) fn encode_fields(&self, out: &mut dyn BufMut) {
        self.as_fields().encode_fields(out)
    }

    /// Decodes the fields of a legacy transaction in the order of [`Self::encode_fields`].
    pub(crate) fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self {
            nonce: Decodable::decode(buf)?,
            gas_price: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            signature: TxSignature::decode_fields(buf)?,
        })
    }

    /// Returns the length of the EIP-2718 encoding. A legacy transaction is a bare RLP list.
    pub(crate) fn eip2718_encoded_length(&self) -> usize {
        self.as_fields().eip2718_encoded_length(Self::TX_TYPE)
    }

    /// Encodes the transaction as a bare RLP list, signature included.
    pub(crate) fn eip2718_encode(&self, out: &mut dyn BufMut) {
        self.as_fields().eip2718_encode(Self::TX_TYPE, out)
    }

    /// Decodes a legacy transaction from a RLP list.
    pub(crate) fn rlp_decode_signed(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        decode_list(buf, Self::decode_fields)
    }

    /// Encodes the payload that is signed.
    ///
    /// With a chain id this is the [EIP-155](https://eips.ethereum.org/EIPS/eip-155) payload,
    /// `[nonce, gas_price, gas_limit, to, value, input, chain_id, 0, 0]`, without one it is the
    /// unprotected payload.
    pub fn encode_for_signing(&self, chain_id: Option<ChainId>, out: &mut dyn BufMut) {
        self.as_fields().encode_for_signing(Self::TX_TYPE, chain_id, out)
    }

    /// Returns the hash that is signed for the given chain id.
    pub fn signature_hash(&self, chain_id: Option<ChainId>) -> B256 {
        self.as_fields().signature_hash(Self::TX_TYPE, chain_id)
    }
}

/// The fields of a transaction laid out like a legacy transaction, borrowed from the shape.
///
/// Typed shapes with this layout get the type byte in front of the encoding and of the signing
/// payload.
#[derive(Debug)]
pub(crate) struct LegacyFields<'a> {
    pub(crate) nonce: u64,
    pub(crate) gas_price: U256,
    pub(crate) gas_limit: u64,
    pub(crate) to: TxKind,
    pub(crate) value: U256,
    pub(crate) input: &'a Bytes,
    pub(crate) signature: Option<&'a TxSignature>,
}

impl LegacyFields<'_> {
    /// Outputs the length of the fields without the signature and without a RLP header.
    fn unsigned_fields_len(&self) -> usize {
        self.nonce.length() +
            self.gas_price.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length()
    }

    /// Encodes the fields without the signature and without a RLP header.
    fn encode_unsigned_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
    }

    pub(crate) fn fields_len(&self) -> usize {
        self.unsigned_fields_len() + TxSignature::fields_len(self.signature)
    }

    pub(crate) fn encode_fields(&self, out: &mut dyn BufMut) {
        self.encode_unsigned_fields(out);
        TxSignature::encode_fields(self.signature, out);
    }

    pub(crate) fn eip2718_encoded_length(&self, tx_type: TxType) -> usize {
        type_prefix_len(tx_type) + list_length(self.fields_len())
    }

    pub(crate) fn eip2718_encode(&self, tx_type: TxType, out: &mut dyn BufMut) {
        put_type_prefix(tx_type, out);
        encode_list_header(self.fields_len(), out);
        self.encode_fields(out);
    }

    fn payload_len_for_signature(&self, chain_id: Option<ChainId>) -> usize {
        // `[chain_id, 0, 0]`, the zeroes are one byte each
        self.unsigned_fields_len() + chain_id.map_or(0, |id| id.length() + 2)
    }

    pub(crate) fn encode_for_signing(
        &self,
        tx_type: TxType,
        chain_id: Option<ChainId>,
        out: &mut dyn BufMut,
    ) {
        put_type_prefix(tx_type, out);
        encode_list_header(self.payload_len_for_signature(chain_id), out);
        self.encode_unsigned_fields(out);
        if let Some(id) = chain_id {
            id.encode(out);
            0x00u8.encode(out);
            0x00u8.encode(out);
        }
    }

    pub(crate) fn signature_hash(&self, tx_type: TxType, chain_id: Option<ChainId>) -> B256 {
        let len = type_prefix_len(tx_type) + list_length(self.payload_len_for_signature(chain_id));
        let mut buf = Vec::with_capacity(len);
        self.encode_for_signing(tx_type, chain_id, &mut buf);
        keccak256(&buf)
    }
}

const fn type_prefix_len(tx_type: TxType) -> usize {
    tx_type.is_typed() as usize
}

fn put_type_prefix(tx_type: TxType, out: &mut dyn BufMut) {
    if tx_type.is_typed() {
        out.put_u8(tx_type.into());
    }
}

impl Transaction for TxLegacy {
    fn tx_type(&self) -> TxType {
        Self::TX_TYPE
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.signature.and_then(|sig| derive_chain_id(sig.v))
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn gas_price(&self) -> U256 {
        self.gas_price
    }

    fn max_priority_fee_per_gas(&self) -> U256 {
        self.gas_price
    }

    fn max_fee_per_gas(&self) -> U256 {
        self.gas_price
    }

    fn effective_gas_price(&self, _base_fee: Option<U256>) -> U256 {
        self.gas_price
    }

    fn kind(&self) -> TxKind {
        self.to
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn input(&self) -> &Bytes {
        &self.input
    }

    fn raw_signature(&self) -> Option<TxSignature> {
        self.signature
    }

    fn set_signature(&mut self, _chain_id: ChainId, signature: TxSignature) {
        self.signature = signature.into_present();
    }

    fn deep_copy(&self) -> Self {
        Self { input: Bytes::copy_from_slice(&self.input), ..self.clone() }
    }

    #[inline]
    fn size(&self) -> usize {
        mem::size_of::<u64>() + // nonce
        mem::size_of::<U256>() + // gas_price
        mem::size_of::<u64>() + // gas_limit
        self.to.size() + // to
        mem::size_of::<U256>() + // value
        self.input.len() + // input
        mem::size_of::<Option<TxSignature>>() // signature
    }
}
