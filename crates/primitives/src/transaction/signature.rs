use crate::{
    constants::{EIP155_V_OFFSET, LEGACY_V_OFFSET},
    transaction::util::secp256k1,
    TxType,
};
use alloy_primitives::{Address, ChainId, B256, U256};
use alloy_rlp::{Decodable, Encodable};
use bytes::BufMut;

/// The order of the secp256k1 curve, divided by two. Signatures that should be checked according
/// to EIP-2 should have an S value less than or equal to this.
///
/// `57896044618658097711785492504343953926418782139537452191302581570759080747168`
const SECP256K1N_HALF: U256 = U256::from_be_bytes([
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
]);

/// The raw `(v, r, s)` signature values of a transaction.
///
/// `v` is stored exactly as it was provided: for legacy style transactions it carries the chain
/// id (EIP-155) or is `27`/`28`, for typed transactions it is the y parity (`0`/`1`).
///
/// An unsigned transaction has no [`TxSignature`] at all. The all-zero triple is not a
/// signature: it encodes like an absent one, so transactions never hold it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxSignature {
    /// The raw `v` value.
    pub v: U256,
    /// The R field of the signature; the point on the curve.
    pub r: U256,
    /// The S field of the signature; the point on the curve.
    pub s: U256,
}

impl TxSignature {
    /// Creates a signature from its raw values.
    pub const fn new(v: U256, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Builds the signature values for a transaction of the given type from the output of a
    /// signer: legacy style types get an EIP-155 `v`, typed transactions the plain y parity.
    pub fn from_parity(
        tx_type: TxType,
        odd_y_parity: bool,
        r: U256,
        s: U256,
        chain_id: Option<ChainId>,
    ) -> Self {
        let v = if tx_type.has_legacy_signature() {
            to_eip155_v(odd_y_parity, chain_id)
        } else {
            U256::from(odd_y_parity as u8)
        };
        Self { v, r, s }
    }

    /// Returns `true` if `v`, `r` and `s` are all zero.
    pub fn is_empty(&self) -> bool {
        self.v.is_zero() && self.r.is_zero() && self.s.is_zero()
    }

    /// Returns the signature, or `None` for the all-zero triple.
    pub(crate) fn into_present(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }

    /// Returns the y parity encoded in `v`, or `None` if `v` is not a valid value for a
    /// transaction of the given type.
    pub fn odd_y_parity(&self, tx_type: TxType) -> Option<bool> {
        let v = self.v;
        if !tx_type.has_legacy_signature() {
            return match v {
                v if v.is_zero() => Some(false),
                v if v == U256::from(1) => Some(true),
                _ => None,
            }
        }
        if v == U256::from(LEGACY_V_OFFSET) || v == U256::from(LEGACY_V_OFFSET + 1) {
            return Some(v == U256::from(LEGACY_V_OFFSET + 1))
        }
        // same range as `derive_chain_id`
        let offset = v.checked_sub(U256::from(EIP155_V_OFFSET))?;
        u64::try_from(offset >> 1).ok()?;
        Some(offset.bit(0))
    }

    /// Returns `true` if `s` is in the lower half of the curve order, as required by EIP-2.
    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1N_HALF
    }

    /// Recovers the signer of `hash`, rejecting signatures with a high `s` value (EIP-2).
    pub fn recover_signer(&self, tx_type: TxType, hash: B256) -> Option<Address> {
        if !self.is_low_s() {
            return None
        }
        self.recover_signer_unchecked(tx_type, hash)
    }

    /// Recovers the signer of `hash` _without ensuring that the signature has a low `s` value_.
    ///
    /// Returns `None` if the signature values do not describe a valid secp256k1 signature.
    pub fn recover_signer_unchecked(&self, tx_type: TxType, hash: B256) -> Option<Address> {
        let odd_y_parity = self.odd_y_parity(tx_type)?;
        let mut sig: [u8; 65] = [0; 65];
        sig[0..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        sig[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        sig[64] = odd_y_parity as u8;

        secp256k1::recover_signer(&sig, &hash.0).ok()
    }

    /// Calculates a heuristic for the in-memory size of the [`TxSignature`].
    #[inline]
    pub const fn size(&self) -> usize {
        core::mem::size_of::<Self>()
    }

    /// Output the length of the signature values in an RLP list, see
    /// [`TxSignature::encode_fields`].
    pub(crate) fn fields_len(signature: Option<&Self>) -> usize {
        match signature {
            Some(sig) => sig.v.length() + sig.r.length() + sig.s.length(),
            // three empty strings
            None => 3,
        }
    }

    /// Encodes the signature values as the trailing fields of a transaction list.
    ///
    /// An absent signature is encoded as three zero scalars.
    pub(crate) fn encode_fields(signature: Option<&Self>, out: &mut dyn BufMut) {
        let sig = signature.copied().unwrap_or_default();
        sig.v.encode(out);
        sig.r.encode(out);
        sig.s.encode(out);
    }

    /// Decodes the trailing signature values of a transaction list.
    ///
    /// Three zero scalars decode to an absent signature.
    pub(crate) fn decode_fields(buf: &mut &[u8]) -> alloy_rlp::Result<Option<Self>> {
        let sig = Self {
            v: Decodable::decode(buf)?,
            r: Decodable::decode(buf)?,
            s: Decodable::decode(buf)?,
        };
        Ok(sig.into_present())
    }
}

/// Derives the chain id a legacy style signature was created for from its `v` value.
///
/// - `27` and `28` are signatures without replay protection and carry no chain id.
/// - `v >= 35` encodes the chain id as `(v - 35) / 2`, see
///   [EIP-155](https://eips.ethereum.org/EIPS/eip-155).
///
/// Every other value (including `0`, which is what an unsigned transaction has) yields `None`, as
/// does a chain id that does not fit into a [`ChainId`].
pub fn derive_chain_id(v: U256) -> Option<ChainId> {
    if v == U256::from(LEGACY_V_OFFSET) || v == U256::from(LEGACY_V_OFFSET + 1) {
        return None
    }
    let offset = v.checked_sub(U256::from(EIP155_V_OFFSET))?;
    u64::try_from(offset >> 1).ok()
}

/// Returns the legacy style `v` value for the given y parity and chain id.
///
/// Without a chain id this is `27` or `28`, otherwise `chain_id * 2 + 35 + y_parity`.
pub fn to_eip155_v(odd_y_parity: bool, chain_id: Option<ChainId>) -> U256 {
    let parity = U256::from(odd_y_parity as u8);
    match chain_id {
        Some(id) => U256::from(id) * U256::from(2) + U256::from(EIP155_V_OFFSET) + parity,
        None => U256::from(LEGACY_V_OFFSET) + parity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn chain_id_of_legacy_v() {
        assert_eq!(derive_chain_id(U256::from(27)), None);
        assert_eq!(derive_chain_id(U256::from(28)), None);
    }

    #[test]
    fn chain_id_of_eip155_v() {
        assert_eq!(derive_chain_id(U256::from(35)), Some(0));
        assert_eq!(derive_chain_id(U256::from(36)), Some(0));
        assert_eq!(derive_chain_id(U256::from(37)), Some(1));
        assert_eq!(derive_chain_id(U256::from(38)), Some(1));
        // goerli
        assert_eq!(derive_chain_id(U256::from(45)), Some(5));
        let max = U256::from(u64::MAX) * U256::from(2) + U256::from(35);
        assert_eq!(derive_chain_id(max), Some(u64::MAX));
    }

    #[test]
    fn chain_id_of_unrecognized_v() {
        assert_eq!(derive_chain_id(U256::ZERO), None);
        assert_eq!(derive_chain_id(U256::from(1)), None);
        for v in 29..35u64 {
            assert_eq!(derive_chain_id(U256::from(v)), None, "v = {v}");
        }
        assert_eq!(derive_chain_id(U256::MAX), None);
    }

    #[test]
    fn parity_from_v() {
        let sig = |v: u64| TxSignature::new(U256::from(v), U256::from(1), U256::from(1));
        assert_eq!(sig(27).odd_y_parity(TxType::Legacy), Some(false));
        assert_eq!(sig(28).odd_y_parity(TxType::Legacy), Some(true));
        assert_eq!(sig(37).odd_y_parity(TxType::BaseSystem), Some(false));
        assert_eq!(sig(38).odd_y_parity(TxType::Legacy), Some(true));
        assert_eq!(sig(30).odd_y_parity(TxType::Legacy), None);
        assert_eq!(sig(1).odd_y_parity(TxType::Eip1559), Some(true));
        assert_eq!(sig(0).odd_y_parity(TxType::Eip2930), Some(false));
        assert_eq!(sig(27).odd_y_parity(TxType::Eip4844), None);
    }

    #[test]
    fn absent_signature_fields() {
        let mut buf = Vec::new();
        TxSignature::encode_fields(None, &mut buf);
        assert_eq!(buf, vec![0x80, 0x80, 0x80]);
        assert_eq!(TxSignature::fields_len(None), buf.len());
        assert_eq!(TxSignature::decode_fields(&mut buf.as_slice()), Ok(None));
    }

    #[test]
    fn zero_triple_is_absent() {
        assert!(TxSignature::default().is_empty());
        assert_eq!(TxSignature::default().into_present(), None);

        let sig = TxSignature::new(U256::ZERO, U256::from(1), U256::from(1));
        assert!(!sig.is_empty());
        assert_eq!(sig.into_present(), Some(sig));

        let mut buf = Vec::new();
        TxSignature::encode_fields(Some(&TxSignature::default()), &mut buf);
        assert_eq!(buf, vec![0x80, 0x80, 0x80]);
    }

    #[test]
    fn parity_of_largest_chain_ids() {
        for chain_id in [u64::MAX / 2, u64::MAX - 1, u64::MAX] {
            for odd in [false, true] {
                let v = to_eip155_v(odd, Some(chain_id));
                assert!(v > U256::from(u64::MAX));
                let sig = TxSignature::new(v, U256::from(1), U256::from(1));
                assert_eq!(sig.odd_y_parity(TxType::Legacy), Some(odd));
                assert_eq!(sig.odd_y_parity(TxType::BaseSystem), Some(odd));
            }
        }
        // beyond the largest chain id
        let v = U256::from(u64::MAX) * U256::from(2) + U256::from(EIP155_V_OFFSET + 2);
        let sig = TxSignature::new(v, U256::from(1), U256::from(1));
        assert_eq!(sig.odd_y_parity(TxType::Legacy), None);
        assert_eq!(derive_chain_id(v), None);
    }

    #[test]
    fn low_s() {
        let mut sig = TxSignature::new(U256::from(27), U256::from(1), SECP256K1N_HALF);
        assert!(sig.is_low_s());
        sig.s += U256::from(1);
        assert!(!sig.is_low_s());
    }

    proptest! {
        #[test]
        fn eip155_v_roundtrip(chain_id in any::<u64>(), odd in any::<bool>()) {
            let v = to_eip155_v(odd, Some(chain_id));
            prop_assert_eq!(derive_chain_id(v), Some(chain_id));
            let sig = TxSignature::new(v, U256::from(1), U256::from(1));
            prop_assert_eq!(sig.odd_y_parity(TxType::Legacy), Some(odd));
        }

        #[test]
        fn derive_chain_id_is_total(limbs in any::<[u64; 4]>()) {
            let v = U256::from_limbs(limbs);
            let _ = derive_chain_id(v);
        }
    }
}
