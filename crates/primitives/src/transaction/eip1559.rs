use crate::{
    transaction::rlp::{decode_list, encode_list_header, list_length},
    AccessList, AccessListItem, Transaction, TxKind, TxSignature, TxType,
};
use alloy_primitives::{keccak256, Bytes, ChainId, B256, U256};
use alloy_rlp::{Decodable, Encodable};
use bytes::BufMut;
use core::mem;

/// A transaction with a priority fee ([EIP-1559](https://eips.ethereum.org/EIPS/eip-1559)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxEip1559 {
    /// Added as EIP-155: Simple replay attack protection
    pub chain_id: ChainId,
    /// A scalar value equal to the number of transactions sent by the sender; formally Tn.
    pub nonce: u64,
    /// Maximum amount of gas that should be used in executing this transaction; formally Tg.
    pub gas_limit: u64,
    /// The maximum total fee per gas the sender is willing to pay, base fee included.
    pub max_fee_per_gas: U256,
    /// The maximum fee per gas paid to the block producer on top of the base fee.
    pub max_priority_fee_per_gas: U256,
    /// The recipient, or [`TxKind::Create`] for a contract creation; formally Tt.
    pub to: TxKind,
    /// Wei transferred to the recipient; formally Tv.
    pub value: U256,
    /// The accessed addresses and storage keys, warmed up before execution.
    pub access_list: AccessList,
    /// Call data, or the init code of a contract creation.
    pub input: Bytes,
    /// The signature values, `v` being the y parity. `None` until the transaction is signed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub signature: Option<TxSignature>,
}

impl TxEip1559 {
    /// The type of the transaction.
    pub const TX_TYPE: TxType = TxType::Eip1559;

    fn unsigned_fields_len(&self, chain_id: ChainId) -> usize {
        chain_id.length() +
            self.nonce.length() +
            self.max_priority_fee_per_gas.length() +
            self.max_fee_per_gas.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length() +
            self.access_list.length()
    }

    fn encode_unsigned_fields(&self, chain_id: ChainId, out: &mut dyn BufMut) {
        chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
        self.access_list.encode(out);
    }

    /// Outputs the length of all fields, signature included, without a RLP header.
    pub(crate) fn fields_len(&self) -> usize {
        self.unsigned_fields_len(self.chain_id) + TxSignature::fields_len(self.signature.as_ref())
    }

    /// Encodes all fields in order, signature last, without a RLP header.
    pub(crate) fn encode_fields(&self, out: &mut dyn BufMut) {
        self.encode_unsigned_fields(self.chain_id, out);
        TxSignature::encode_fields(self.signature.as_ref(), out);
    }

    /// Decodes the fields in the order of [`Self::encode_fields`]:
    ///
    /// `[chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas, gas_limit, to, value, input,
    /// access_list, y_parity, r, s]`
    pub(crate) fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self {
            chain_id: Decodable::decode(buf)?,
            nonce: Decodable::decode(buf)?,
            max_priority_fee_per_gas: Decodable::decode(buf)?,
            max_fee_per_gas: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            access_list: Decodable::decode(buf)?,
            signature: TxSignature::decode_fields(buf)?,
        })
    }

    /// Returns the length of the EIP-2718 encoding, type byte included.
    pub(crate) fn eip2718_encoded_length(&self) -> usize {
        1 + list_length(self.fields_len())
    }

    /// Encodes the type byte followed by the RLP list of all fields.
    pub(crate) fn eip2718_encode(&self, out: &mut dyn BufMut) {
        out.put_u8(Self::TX_TYPE.into());
        encode_list_header(self.fields_len(), out);
        self.encode_fields(out);
    }

    /// Decodes the RLP list that follows the type byte.
    pub(crate) fn rlp_decode_signed(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        decode_list(buf, Self::decode_fields)
    }

    /// Encodes the payload that is signed, the type byte followed by the unsigned fields.
    ///
    /// `chain_id` replaces the stored chain id when set.
    pub fn encode_for_signing(&self, chain_id: Option<ChainId>, out: &mut dyn BufMut) {
        let chain_id = chain_id.unwrap_or(self.chain_id);
        out.put_u8(Self::TX_TYPE.into());
        encode_list_header(self.unsigned_fields_len(chain_id), out);
        self.encode_unsigned_fields(chain_id, out);
    }

    /// Returns the hash that is signed for the given chain id.
    pub fn signature_hash(&self, chain_id: Option<ChainId>) -> B256 {
        let len = self.unsigned_fields_len(chain_id.unwrap_or(self.chain_id));
        let mut buf = Vec::with_capacity(1 + list_length(len));
        self.encode_for_signing(chain_id, &mut buf);
        keccak256(&buf)
    }
}

/// Returns the price per gas a dynamic fee transaction pays.
///
/// Without a base fee the fee cap is returned, otherwise `min(fee_cap, base_fee + tip_cap)`.
pub(crate) fn dynamic_effective_gas_price(
    max_fee_per_gas: U256,
    max_priority_fee_per_gas: U256,
    base_fee: Option<U256>,
) -> U256 {
    match base_fee {
        None => max_fee_per_gas,
        Some(base_fee) => {
            max_fee_per_gas.min(base_fee.saturating_add(max_priority_fee_per_gas))
        }
    }
}

impl Transaction for TxEip1559 {
    fn tx_type(&self) -> TxType {
        Self::TX_TYPE
    }

    fn chain_id(&self) -> Option<ChainId> {
        Some(self.chain_id)
    }

    fn access_list(&self) -> &[AccessListItem] {
        &self.access_list
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn gas_price(&self) -> U256 {
        self.max_fee_per_gas
    }

    fn max_priority_fee_per_gas(&self) -> U256 {
        self.max_priority_fee_per_gas
    }

    fn max_fee_per_gas(&self) -> U256 {
        self.max_fee_per_gas
    }

    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256 {
        dynamic_effective_gas_price(self.max_fee_per_gas, self.max_priority_fee_per_gas, base_fee)
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

    fn set_signature(&mut self, chain_id: ChainId, signature: TxSignature) {
        self.chain_id = chain_id;
        self.signature = signature.into_present();
    }

    fn deep_copy(&self) -> Self {
        Self { input: Bytes::copy_from_slice(&self.input), ..self.clone() }
    }

    #[inline]
    fn size(&self) -> usize {
        mem::size_of::<ChainId>() + // chain_id
        mem::size_of::<u64>() + // nonce
        mem::size_of::<u64>() + // gas_limit
        mem::size_of::<U256>() + // max_fee_per_gas
        mem::size_of::<U256>() + // max_priority_fee_per_gas
        self.to.size() + // to
        mem::size_of::<U256>() + // value
        self.access_list.size() + // access_list
        self.input.len() + // input
        mem::size_of::<Option<TxSignature>>() // signature
    }
}
