use crate::{
    transaction::rlp::{decode_list, encode_list_header, list_length},
    AccessList, AccessListItem, Transaction, TxKind, TxSignature, TxType,
};
use alloy_primitives::{keccak256, Bytes, ChainId, B256, U256};
use alloy_rlp::{Decodable, Encodable};
use bytes::BufMut;
use core::mem;

/// Transaction with an [`AccessList`] ([EIP-2930](https://eips.ethereum.org/EIPS/eip-2930)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxEip2930 {
    /// Added as EIP-155: Simple replay attack protection
    pub chain_id: ChainId,
    /// A scalar value equal to the number of transactions sent by the sender; formally Tn.
    pub nonce: u64,
    /// Wei paid per unit of gas; formally Tp.
    pub gas_price: U256,
    /// Maximum amount of gas that should be used in executing this transaction; formally Tg.
    pub gas_limit: u64,
    /// The recipient, or [`TxKind::Create`] for a contract creation; formally Tt.
    pub to: TxKind,
    /// Wei transferred to the recipient; formally Tv.
    pub value: U256,
    /// Call data, or the init code of a contract creation.
    pub input: Bytes,
    /// The accessed addresses and storage keys, warmed up before execution.
    pub access_list: AccessList,
    /// The signature values, `v` being the y parity. `None` until the transaction is signed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub signature: Option<TxSignature>,
}

impl TxEip2930 {
    /// The type of the transaction.
    pub const TX_TYPE: TxType = TxType::Eip2930;

    /// Outputs the length of the unsigned fields for the given chain id, without a RLP header.
    fn unsigned_fields_len(&self, chain_id: ChainId) -> usize {
        chain_id.length() +
            self.nonce.length() +
            self.gas_price.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length() +
            self.access_list.length()
    }

    /// Encodes the unsigned fields with the given chain id, without a RLP header.
    fn encode_unsigned_fields(&self, chain_id: ChainId, out: &mut dyn BufMut) {
        chain_id.encode(out);
        self.nonce.encode(out);
        self.gas_price.encode(out);
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

    /// Decodes the fields in the order of [`Self::encode_fields`].
    pub(crate) fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(Self {
            chain_id: Decodable::decode(buf)?,
            nonce: Decodable::decode(buf)?,
            gas_price: Decodable::decode(buf)?,
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

    /// Encodes the payload that is signed, `0x01 || rlp([chain_id, nonce, gas_price, gas_limit,
    /// to, value, input, access_list])`.
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

impl Transaction for TxEip2930 {
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
        mem::size_of::<U256>() + // gas_price
        mem::size_of::<u64>() + // gas_limit
        self.to.size() + // to
        mem::size_of::<U256>() + // value
        self.access_list.size() + // access_list
        self.input.len() + // input
        mem::size_of::<Option<TxSignature>>() // signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, Address};

    fn request(to: TxKind) -> TxEip2930 {
        TxEip2930 {
            chain_id: 1,
            nonce: 0,
            gas_price: U256::from(1),
            gas_limit: 2,
            to,
            value: U256::from(3),
            input: Bytes::from(vec![1, 2]),
            access_list: Default::default(),
            signature: Some(TxSignature::new(U256::from(1), U256::ZERO, U256::ZERO)),
        }
    }

    #[test]
    fn test_decode_create() {
        // tests that a contract creation tx encodes and decodes properly
        let tx = request(TxKind::Create);

        let mut encoded = Vec::new();
        tx.eip2718_encode(&mut encoded);
        assert_eq!(encoded.len(), tx.eip2718_encoded_length());
        assert_eq!(encoded[0], 0x01);

        let decoded = TxEip2930::rlp_decode_signed(&mut &encoded[1..]).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.to(), None);
    }

    #[test]
    fn test_decode_call() {
        let tx = request(Address::default().into());

        let mut encoded = Vec::new();
        tx.eip2718_encode(&mut encoded);
        assert_eq!(encoded.len(), tx.eip2718_encoded_length());

        let decoded = TxEip2930::rlp_decode_signed(&mut &encoded[1..]).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.to(), Some(Address::ZERO));
    }

    #[test]
    fn access_list_is_exposed_in_order() {
        let items = vec![
            AccessListItem {
                address: address!("0000000000000000000000000000000000000002"),
                storage_keys: vec![b256!(
                    "0000000000000000000000000000000000000000000000000000000000000001"
                )],
            },
            AccessListItem {
                address: address!("0000000000000000000000000000000000000001"),
                storage_keys: vec![],
            },
        ];
        let tx = TxEip2930 { access_list: items.clone().into(), ..request(TxKind::Create) };
        assert_eq!(tx.access_list(), &items[..]);

        let mut encoded = Vec::new();
        tx.eip2718_encode(&mut encoded);
        let decoded = TxEip2930::rlp_decode_signed(&mut &encoded[1..]).unwrap();
        assert_eq!(decoded.access_list(), &items[..]);
    }

    #[test]
    fn set_signature_stores_chain_id() {
        let mut tx = TxEip2930 { signature: None, ..request(TxKind::Create) };
        assert_eq!(tx.chain_id(), Some(1));

        let sig = TxSignature::new(U256::ZERO, U256::from(5), U256::from(6));
        tx.set_signature(10, sig);
        assert_eq!(tx.chain_id(), Some(10));
        assert_eq!(tx.raw_signature(), Some(sig));
        assert_eq!(tx.signature_hash(None), tx.signature_hash(Some(10)));
        assert_ne!(tx.signature_hash(Some(1)), tx.signature_hash(Some(10)));
    }

    #[test]
    fn flat_price_and_fallbacks() {
        let tx = request(TxKind::Create);
        assert_eq!(tx.effective_gas_price(Some(U256::from(100))), U256::from(1));
        assert_eq!(tx.max_fee_per_gas(), U256::from(1));
        assert_eq!(tx.max_fee_per_blob_gas(), None);
        assert!(tx.blob_versioned_hashes().is_empty());
        assert_eq!(tx.blob_gas(), 0);
    }
}
