/// The transaction type byte is not one of the supported shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported transaction type: {0:#04x}")]
pub struct UnsupportedTxType(pub u8);

impl From<UnsupportedTxType> for alloy_rlp::Error {
    fn from(_: UnsupportedTxType) -> Self {
        Self::Custom("unsupported typed transaction type")
    }
}

/// Errors that can happen while attaching a signature to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The transaction already carries a signature.
    ///
    /// Signing is a one way transition, a signed transaction is never re-signed.
    #[error("transaction is already signed")]
    AlreadySigned,
    /// The secret key or the signing message was rejected by secp256k1.
    #[error(transparent)]
    Secp256k1(#[from] secp256k1::Error),
}
