//! Commonly used transaction types in agora.
//!
//! ## Overview
//!
//! This crate defines the transaction model shared by the pool, the block builder, the executor
//! and the RPC layer. Every supported transaction shape is its own struct, and all of them
//! implement the [`Transaction`] trait so that callers never need to know which shape they hold.
//!
//! - [`TxLegacy`] - the original transaction, chain id encoded in the signature `v` value
//! - [`TxBaseSystem`] - a typed, flat-price transaction with a legacy-style signature
//! - [`TxEip2930`] - a flat-price transaction with an access list
//! - [`TxEip1559`] - a dynamic fee transaction
//! - [`TxEip4844`] - a dynamic fee transaction that references blobs
//!
//! [`TypedTransaction`] is the closed set of all shapes and [`TxEnvelope`] owns exactly one of
//! them together with its memoized hash.
//!
//! ### Signing
//!
//! Transactions are built unsigned. The signature is attached once, either from an external
//! signer through [`Transaction::set_signature`] or with [`TxEnvelope::sign`]. The raw
//! signature is absent until then: an unsigned transaction never reports a zero signature.
//!
//! ## Feature Flags
//!
//! - `serde`: Adds serde support for all types (enabled by default).
//! - `arbitrary`: Adds `arbitrary` support for all types.

#![doc(issue_tracker_base_url = "https://github.com/agoraxyz/agora/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;
pub mod transaction;

pub use transaction::{
    derive_chain_id, to_eip155_v, AccessList, AccessListItem, SignatureError, Transaction,
    TxBaseSystem, TxEip1559, TxEip2930, TxEip4844, TxEnvelope, TxKind, TxLegacy, TxSignature,
    TxType, TypedTransaction, UnsupportedTxType, BASE_SYSTEM_TX_TYPE_ID, EIP1559_TX_TYPE_ID,
    EIP2930_TX_TYPE_ID, EIP4844_TX_TYPE_ID, LEGACY_TX_TYPE_ID,
};

pub use alloy_primitives::{keccak256, Address, Bytes, ChainId, TxHash, B256, U256};
