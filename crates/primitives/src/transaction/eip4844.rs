use crate::{
    transaction::{
        eip1559::dynamic_effective_gas_price,
        rlp::{decode_list, encode_list_header, list_length},
    },
    AccessList, AccessListItem, Transaction, TxKind, TxSignature, TxType,
};
use alloy_primitives::{keccak256, Address, Bytes, ChainId, B256, U256};
use alloy_rlp::{Decodable, Encodable, Error as RlpError, EMPTY_STRING_CODE};
use bytes::BufMut;
use core::mem;
use tracing::debug;

/// [EIP-4844 Blob Transaction](https://eips.ethereum.org/EIPS/eip-4844#blob-transaction)
///
/// A transaction with blob hashes and max blob fee. It does not support creating contracts, the
/// recipient is always set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TxEip4844 {
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
    /// The 160-bit address of the message call's recipient.
    pub to: Address,
    /// Wei transferred to the recipient; formally Tv.
    pub value: U256,
    /// The accessed addresses and storage keys, warmed up before execution.
    pub access_list: AccessList,
    /// It contains a vector of fixed size hash(32 bytes)
    pub blob_versioned_hashes: Vec<B256>,
    /// Max fee per data gas
    pub max_fee_per_blob_gas: U256,
    /// Call data.
    pub input: Bytes,
    /// The signature values, `v` being the y parity. `None` until the transaction is signed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub signature: Option<TxSignature>,
}

impl TxEip4844 {
    /// The type of the transaction.
    pub const TX_TYPE: TxType = TxType::Eip4844;

    fn unsigned_fields_len(&self, chain_id: ChainId) -> usize {
        chain_id.length() +
            self.nonce.length() +
            self.max_priority_fee_per_gas.length() +
            self.max_fee_per_gas.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length() +
            self.access_list.length() +
            self.max_fee_per_blob_gas.length() +
            self.blob_versioned_hashes.length()
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
        self.max_fee_per_blob_gas.encode(out);
        self.blob_versioned_hashes.encode(out);
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
    /// access_list, max_fee_per_blob_gas, blob_versioned_hashes, y_parity, r, s]`
    ///
    /// An empty `to` field is rejected, blob transactions cannot create contracts.
    pub(crate) fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let chain_id: ChainId = Decodable::decode(buf)?;
        let nonce: u64 = Decodable::decode(buf)?;
        let max_priority_fee_per_gas = Decodable::decode(buf)?;
        let max_fee_per_gas = Decodable::decode(buf)?;
        let gas_limit = Decodable::decode(buf)?;
        if buf.first() == Some(&EMPTY_STRING_CODE) {
            debug!(
                target: "primitives::tx",
                chain_id,
                nonce,
                "rejected blob transaction without recipient"
            );
            return Err(RlpError::Custom("blob transaction cannot create a contract"))
        }

        Ok(Self {
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            access_list: Decodable::decode(buf)?,
            max_fee_per_blob_gas: Decodable::decode(buf)?,
            blob_versioned_hashes: Decodable::decode(buf)?,
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

impl Transaction for TxEip4844 {
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
        TxKind::Call(self.to)
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn input(&self) -> &Bytes {
        &self.input
    }

    fn max_fee_per_blob_gas(&self) -> Option<U256> {
        Some(self.max_fee_per_blob_gas)
    }

    fn blob_versioned_hashes(&self) -> &[B256] {
        &self.blob_versioned_hashes
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
        mem::size_of::<Address>() + // to
        mem::size_of::<U256>() + // value
        self.access_list.size() + // access_list
        self.input.len() +  // input
        self.blob_versioned_hashes.capacity() * mem::size_of::<B256>() + // blob hashes size
        mem::size_of::<U256>() + // max_fee_per_blob_gas
        mem::size_of::<Option<TxSignature>>() // signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DATA_GAS_PER_BLOB;
    use alloy_primitives::{address, b256, hex};

    // <https://sepolia.etherscan.io/tx/0x9a22ccb0029bc8b0ddd073be1a1d923b7ae2b2ea52100bae0db4424f9107e9c0>
    const SEPOLIA_BLOB_TX: [u8; 289] = hex!("03f9011d83aa36a7820fa28477359400852e90edd0008252089411e9ca82a3a762b4b5bd264d4173a242e7a770648080c08504a817c800f8a5a0012ec3d6f66766bedb002a190126b3549fce0047de0d4c25cffce0dc1c57921aa00152d8e24762ff22b1cfd9f8c0683786a7ca63ba49973818b3d1e9512cd2cec4a0013b98c6c83e066d5b14af2b85199e3d4fc7d1e778dd53130d180f5077e2d1c7a001148b495d6e859114e670ca54fb6e2657f0cbae5b08063605093a4b3dc9f8f1a0011ac212f13c5dff2b2c6b600a79635103d6f580a4221079951181b25c7e654901a0c8de4cced43169f9aa3d36506363b2d2c44f6c49fc1fd91ea114c86f3757077ea01e11fdd0d1934eda0492606ee0bb80a7bf8f35cc5f86ec60fe5031ba48bfd544");

    #[test]
    fn decode_recover_sepolia_blob_tx() {
        let tx = TxEip4844::rlp_decode_signed(&mut &SEPOLIA_BLOB_TX[1..]).unwrap();

        assert_eq!(tx.chain_id(), Some(11155111));
        assert_eq!(tx.to(), Some(address!("11E9CA82A3a762b4B5bd264d4173a242e7a77064")));
        assert_eq!(
            tx.blob_versioned_hashes(),
            &[
                b256!("012ec3d6f66766bedb002a190126b3549fce0047de0d4c25cffce0dc1c57921a"),
                b256!("0152d8e24762ff22b1cfd9f8c0683786a7ca63ba49973818b3d1e9512cd2cec4"),
                b256!("013b98c6c83e066d5b14af2b85199e3d4fc7d1e778dd53130d180f5077e2d1c7"),
                b256!("01148b495d6e859114e670ca54fb6e2657f0cbae5b08063605093a4b3dc9f8f1"),
                b256!("011ac212f13c5dff2b2c6b600a79635103d6f580a4221079951181b25c7e6549"),
            ][..]
        );
        assert_eq!(tx.blob_gas(), 5 * DATA_GAS_PER_BLOB);
        assert_eq!(tx.max_fee_per_blob_gas(), Some(U256::from(20_000_000_000u64)));

        let sig = tx.signature.unwrap();
        assert_eq!(
            sig.recover_signer(TxType::Eip4844, tx.signature_hash(None)),
            Some(address!("A83C816D4f9b2783761a22BA6FADB0eB0606D7B2"))
        );

        let mut encoded = Vec::new();
        tx.eip2718_encode(&mut encoded);
        assert_eq!(encoded, SEPOLIA_BLOB_TX);
        assert_eq!(
            keccak256(&encoded),
            b256!("9a22ccb0029bc8b0ddd073be1a1d923b7ae2b2ea52100bae0db4424f9107e9c0")
        );
    }

    #[test]
    fn reject_contract_creation() {
        let mut encoded = Vec::new();
        TxEip4844::default().eip2718_encode(&mut encoded);

        // swap the 20 byte `to` for an empty string
        let to = hex!("940000000000000000000000000000000000000000");
        let pos = encoded.windows(to.len()).position(|window| window == to).unwrap();
        let mut payload = encoded[..pos].to_vec();
        payload.push(EMPTY_STRING_CODE);
        payload.extend_from_slice(&encoded[pos + to.len()..]);
        // the list shrinks by 20 bytes, the header stays a single byte
        payload[1] -= 20;

        assert_eq!(
            TxEip4844::rlp_decode_signed(&mut &payload[1..]),
            Err(RlpError::Custom("blob transaction cannot create a contract"))
        );
    }

    #[test]
    fn recipient_is_never_absent() {
        let tx = TxEip4844::default();
        assert_eq!(tx.kind(), TxKind::Call(Address::ZERO));
        assert_eq!(tx.to(), Some(Address::ZERO));
    }

    #[test]
    fn deep_copy_owns_blob_hashes() {
        let tx = TxEip4844 {
            blob_versioned_hashes: vec![B256::repeat_byte(1)],
            input: Bytes::from_static(&[1, 2, 3]),
            ..Default::default()
        };
        let mut copy = tx.deep_copy();
        copy.blob_versioned_hashes.push(B256::repeat_byte(2));
        assert_eq!(tx.blob_versioned_hashes.len(), 1);
        assert_eq!(copy.blob_gas(), 2 * DATA_GAS_PER_BLOB);
        assert_ne!(copy.input.as_ptr(), tx.input.as_ptr());
    }
}
