//! Transaction types.

use crate::constants::DATA_GAS_PER_BLOB;
use alloy_primitives::{Address, Bytes, ChainId, B256, U256};
use core::fmt;

pub use access_list::{AccessList, AccessListItem};
pub use base_system::TxBaseSystem;
pub use eip1559::TxEip1559;
pub use eip2930::TxEip2930;
pub use eip4844::TxEip4844;
pub use envelope::TxEnvelope;
pub use error::{SignatureError, UnsupportedTxType};
pub use kind::TxKind;
pub use legacy::TxLegacy;
pub use signature::{derive_chain_id, to_eip155_v, TxSignature};
pub use tx_type::{
    TxType, BASE_SYSTEM_TX_TYPE_ID, EIP1559_TX_TYPE_ID, EIP2930_TX_TYPE_ID, EIP4844_TX_TYPE_ID,
    LEGACY_TX_TYPE_ID,
};
pub use typed::TypedTransaction;

mod access_list;
mod base_system;
mod eip1559;
mod eip2930;
mod eip4844;
mod envelope;
mod error;
mod kind;
mod legacy;
mod rlp;
mod tx_type;
mod typed;

/// Signature values and chain id derivation.
pub mod signature;
pub(crate) mod util;

/// The capabilities shared by every transaction shape.
///
/// Callers that only need to read a transaction, or attach its signature, use this trait and never
/// look at the concrete shape. Every accessor is total: a value a shape does not have is reported
/// with a fallback (an empty access list, the flat price as fee caps, `None` as blob fee cap).
pub trait Transaction: fmt::Debug + Send + Sync {
    /// Returns the type of the transaction.
    fn tx_type(&self) -> TxType;

    /// Returns the chain id the transaction is bound to.
    ///
    /// Shapes with a legacy style signature derive it from the signature `v` value, see
    /// [`derive_chain_id`], and return `None` while unsigned. Typed shapes return their chain id
    /// field.
    fn chain_id(&self) -> Option<ChainId>;

    /// Returns the access list, empty for shapes without one.
    fn access_list(&self) -> &[AccessListItem] {
        &[]
    }

    /// Get `nonce`.
    fn nonce(&self) -> u64;

    /// Get `gas_limit`.
    fn gas_limit(&self) -> u64;

    /// Returns the gas price: the flat price, or the fee cap of dynamic fee shapes.
    fn gas_price(&self) -> U256;

    /// Returns the tip cap, or the flat price for shapes without one.
    fn max_priority_fee_per_gas(&self) -> U256;

    /// Returns the fee cap, or the flat price for shapes without one.
    fn max_fee_per_gas(&self) -> U256;

    /// Returns the price per gas the transaction pays given the block's base fee.
    ///
    /// Flat price shapes always pay their gas price, the base fee is not taken into account.
    /// Dynamic fee shapes pay `min(max_fee_per_gas, base_fee + max_priority_fee_per_gas)`, or the
    /// fee cap if no base fee is known.
    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256;

    /// Get `value`.
    fn value(&self) -> U256;

    /// Returns the transaction kind.
    fn kind(&self) -> TxKind;

    /// Returns the recipient, `None` for a contract creation.
    fn to(&self) -> Option<Address> {
        self.kind().to().copied()
    }

    /// Get `input`.
    fn input(&self) -> &Bytes;

    /// Returns the max fee per blob gas, `None` for shapes without blobs.
    fn max_fee_per_blob_gas(&self) -> Option<U256> {
        None
    }

    /// Returns the blob versioned hashes, empty for shapes without blobs.
    fn blob_versioned_hashes(&self) -> &[B256] {
        &[]
    }

    /// Returns the total gas of all blobs of the transaction.
    fn blob_gas(&self) -> u64 {
        DATA_GAS_PER_BLOB * self.blob_versioned_hashes().len() as u64
    }

    /// Returns `true` if the transaction pays dynamic fees.
    fn is_dynamic_fee(&self) -> bool {
        self.tx_type().is_dynamic_fee()
    }

    /// Returns the raw signature values, `None` if the transaction is not signed.
    fn raw_signature(&self) -> Option<TxSignature>;

    /// Attaches the signature values.
    ///
    /// This is the only mutation of a transaction after construction. The values are stored
    /// without validation and replace any previous signature. Typed shapes also store `chain_id`,
    /// shapes with a legacy style signature ignore it as the chain id is part of `v`.
    ///
    /// The all-zero triple is encoded like a missing signature, attaching it leaves the
    /// transaction unsigned.
    fn set_signature(&mut self, chain_id: ChainId, signature: TxSignature);

    /// Returns an independent copy of the transaction, byte buffers included.
    fn deep_copy(&self) -> Self
    where
        Self: Sized;

    /// Calculates a heuristic for the in-memory size of the transaction.
    fn size(&self) -> usize;
}
