use crate::{
    transaction::{legacy::LegacyFields, rlp::decode_list, signature::derive_chain_id},
    Transaction, TxKind, TxLegacy, TxSignature, TxType,
};
use alloy_primitives::{Bytes, ChainId, B256, U256};
use bytes::BufMut;
use core::mem;

/// Base system transaction.
///
/// A typed transaction (`0x7d`) that keeps the flat gas price and the legacy style signature:
/// the chain id is encoded in the `v` value like [EIP-155](https://eips.ethereum.org/EIPS/eip-155)
/// does, and the network encoding is `0x7d || rlp([nonce, gas_price, gas_limit, to, value, input,
/// v, r, s])`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxBaseSystem {
    /// Number of transactions sent by the sender.
    pub nonce: u64,
    /// Wei paid per unit of gas, independent of the base fee.
    pub gas_price: U256,
    /// Maximum amount of gas the transaction may use.
    pub gas_limit: u64,
    /// The recipient, or [`TxKind::Create`] for a contract creation.
    pub to: TxKind,
    /// Wei transferred to the recipient.
    pub value: U256,
    /// Call data, or the init code of a contract creation.
    pub input: Bytes,
    /// The raw signature values, `None` until the transaction is signed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub signature: Option<TxSignature>,
}

impl TxBaseSystem {
    /// The type of the transaction.
    pub const TX_TYPE: TxType = TxType::BaseSystem;

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

    /// Decodes the fields in the order of [`Self::encode_fields`], which is the legacy order.
    pub(crate) fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let TxLegacy { nonce, gas_price, gas_limit, to, value, input, signature } =
            TxLegacy::decode_fields(buf)?;
        Ok(Self { nonce, gas_price, gas_limit, to, value, input, signature })
    }

    /// Returns the length of the EIP-2718 encoding, type byte included.
    pub(crate) fn eip2718_encoded_length(&self) -> usize {
        self.as_fields().eip2718_encoded_length(Self::TX_TYPE)
    }

    /// Encodes the type byte followed by the RLP list of all fields.
    pub(crate) fn eip2718_encode(&self, out: &mut dyn BufMut) {
        self.as_fields().eip2718_encode(Self::TX_TYPE, out)
    }

    /// Decodes the RLP list that follows the type byte.
    pub(crate) fn rlp_decode_signed(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        decode_list(buf, Self::decode_fields)
    }

    /// Encodes the payload that is signed: the type byte followed by the
    /// [EIP-155](https://eips.ethereum.org/EIPS/eip-155) style list.
    pub fn encode_for_signing(&self, chain_id: Option<ChainId>, out: &mut dyn BufMut) {
        self.as_fields().encode_for_signing(Self::TX_TYPE, chain_id, out)
    }

    /// Returns the hash that is signed for the given chain id.
    pub fn signature_hash(&self, chain_id: Option<ChainId>) -> B256 {
        self.as_fields().signature_hash(Self::TX_TYPE, chain_id)
    }
}

impl Transaction for TxBaseSystem {
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

    /// The flat gas price is paid as is, whatever the base fee.
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

    /// Stores the signature values. The chain id is carried by `v`, the argument is ignored.
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

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{hex, Address};
    use proptest::prelude::*;

    fn scenario() -> TxBaseSystem {
        TxBaseSystem {
            nonce: 5,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: TxKind::Create,
            value: U256::ZERO,
            input: Bytes::from_static(&[0x60, 0x80]),
            signature: None,
        }
    }

    #[test]
    fn chain_id_follows_signature() {
        let mut tx = scenario();
        assert_eq!(tx.chain_id(), None);
        assert_eq!(tx.raw_signature(), None);

        let sig = TxSignature::new(U256::from(37), U256::from(0xaa), U256::from(0xbb));
        tx.set_signature(1, sig);
        assert_eq!(tx.chain_id(), Some(1));
        assert_eq!(tx.raw_signature(), Some(sig));

        // the chain id argument does not override `v`
        tx.set_signature(7, TxSignature::new(U256::from(27), U256::from(1), U256::from(1)));
        assert_eq!(tx.chain_id(), None);
    }

    #[test]
    fn deep_copy_keeps_every_field() {
        let mut tx = scenario();
        tx.set_signature(1, TxSignature::new(U256::from(37), U256::from(1), U256::from(2)));

        let copy = tx.deep_copy().deep_copy();
        assert_eq!(copy, tx);
        assert_eq!(copy.tx_type(), TxType::BaseSystem);
        assert_eq!(copy.to(), None);
        assert!(copy.kind().is_create());
        assert_ne!(copy.input.as_ptr(), tx.input.as_ptr());
    }

    #[test]
    fn typed_legacy_encoding() {
        let mut tx = scenario();
        tx.set_signature(1, TxSignature::new(U256::from(37), U256::from(1), U256::from(2)));

        let mut encoded = Vec::new();
        tx.eip2718_encode(&mut encoded);
        assert_eq!(encoded.len(), tx.eip2718_encoded_length());
        assert_eq!(encoded, hex!("7dd2058504a817c8008252088080826080250102"));

        let decoded = TxBaseSystem::rlp_decode_signed(&mut &encoded[1..]).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn signing_payload_is_prefixed() {
        let tx = scenario();
        let mut payload = Vec::new();
        tx.encode_for_signing(Some(1), &mut payload);
        assert_eq!(payload[0], 0x7d);

        let legacy = TxLegacy {
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: tx.to,
            value: tx.value,
            input: tx.input.clone(),
            signature: None,
        };
        let mut legacy_payload = Vec::new();
        legacy.encode_for_signing(Some(1), &mut legacy_payload);
        assert_eq!(payload[1..], legacy_payload[..]);
        assert_ne!(tx.signature_hash(Some(1)), legacy.signature_hash(Some(1)));
    }

    #[test]
    fn call_to_zero_address_is_not_a_creation() {
        let tx = TxBaseSystem { to: TxKind::Call(Address::ZERO), ..scenario() };
        assert_eq!(tx.to(), Some(Address::ZERO));

        let mut encoded = Vec::new();
        tx.eip2718_encode(&mut encoded);
        let decoded = TxBaseSystem::rlp_decode_signed(&mut &encoded[1..]).unwrap();
        assert_eq!(decoded.kind(), tx.kind());
    }

    proptest! {
        #[test]
        fn flat_price_ignores_base_fee(
            price in any::<u128>(),
            base_fee in proptest::option::of(any::<u128>()),
        ) {
            let tx = TxBaseSystem { gas_price: U256::from(price), ..scenario() };
            prop_assert_eq!(tx.effective_gas_price(base_fee.map(U256::from)), U256::from(price));
        }
    }
}
