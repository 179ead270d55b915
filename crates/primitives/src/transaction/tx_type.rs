use crate::transaction::error::UnsupportedTxType;
use derive_more::Display;

/// Identifier for legacy transaction, however a legacy tx is technically not typed.
pub const LEGACY_TX_TYPE_ID: u8 = 0;

/// Identifier for [`TxEip2930`](crate::TxEip2930) transaction.
pub const EIP2930_TX_TYPE_ID: u8 = 1;

/// Identifier for [`TxEip1559`](crate::TxEip1559) transaction.
pub const EIP1559_TX_TYPE_ID: u8 = 2;

/// Identifier for [`TxEip4844`](crate::TxEip4844) transaction.
pub const EIP4844_TX_TYPE_ID: u8 = 3;

/// Identifier for [`TxBaseSystem`](crate::TxBaseSystem) transaction.
pub const BASE_SYSTEM_TX_TYPE_ID: u8 = 0x7d;

/// Transaction Type
///
/// The discriminant of every transaction shape. It is never stored next to the transaction
/// fields, each shape reports its own constant type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
#[cfg_attr(any(test, feature = "arbitrary"), derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TxType {
    /// Legacy transaction pre EIP-2929
    #[default]
    #[display("legacy")]
    Legacy = 0_isize,
    /// AccessList transaction
    #[display("eip2930")]
    Eip2930 = 1_isize,
    /// Transaction with Priority fee
    #[display("eip1559")]
    Eip1559 = 2_isize,
    /// Shard Blob Transactions - EIP-4844
    #[display("eip4844")]
    Eip4844 = 3_isize,
    /// Flat price transaction with a legacy style signature
    #[display("base-system")]
    BaseSystem = 0x7d_isize,
}

impl TxType {
    /// Returns `true` if the signature `v` value of this type carries the chain id, like a
    /// legacy transaction does.
    pub const fn has_legacy_signature(&self) -> bool {
        matches!(self, Self::Legacy | Self::BaseSystem)
    }

    /// Returns `true` if the transaction type has dynamic fee.
    pub const fn is_dynamic_fee(&self) -> bool {
        matches!(self, Self::Eip1559 | Self::Eip4844)
    }

    /// Returns `true` if this type is prefixed with its type byte in the EIP-2718 envelope.
    pub const fn is_typed(&self) -> bool {
        !matches!(self, Self::Legacy)
    }
}

impl From<TxType> for u8 {
    fn from(value: TxType) -> Self {
        match value {
            TxType::Legacy => LEGACY_TX_TYPE_ID,
            TxType::Eip2930 => EIP2930_TX_TYPE_ID,
            TxType::Eip1559 => EIP1559_TX_TYPE_ID,
            TxType::Eip4844 => EIP4844_TX_TYPE_ID,
            TxType::BaseSystem => BASE_SYSTEM_TX_TYPE_ID,
        }
    }
}

impl TryFrom<u8> for TxType {
    type Error = UnsupportedTxType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            LEGACY_TX_TYPE_ID => Self::Legacy,
            EIP2930_TX_TYPE_ID => Self::Eip2930,
            EIP1559_TX_TYPE_ID => Self::Eip1559,
            EIP4844_TX_TYPE_ID => Self::Eip4844,
            BASE_SYSTEM_TX_TYPE_ID => Self::BaseSystem,
            ty => return Err(UnsupportedTxType(ty)),
        })
    }
}

impl PartialEq<u8> for TxType {
    fn eq(&self, other: &u8) -> bool {
        u8::from(*self) == *other
    }
}
