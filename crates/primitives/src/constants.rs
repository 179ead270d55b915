//! Protocol constants used by the transaction types.

/// Gas consumed by a single blob.
///
/// See [EIP-4844](https://eips.ethereum.org/EIPS/eip-4844#parameters).
pub const DATA_GAS_PER_BLOB: u64 = 131_072;

/// The minimum gas a transaction has to pay for, i.e. a plain value transfer.
pub const MIN_TRANSACTION_GAS: u64 = 21_000;

/// Legacy signatures without replay protection use a `v` value of `27` or `28`.
pub const LEGACY_V_OFFSET: u64 = 27;

/// Offset of the [EIP-155](https://eips.ethereum.org/EIPS/eip-155) `v` encoding:
/// `v = chain_id * 2 + 35 + y_parity`.
pub const EIP155_V_OFFSET: u64 = 35;
