use agora_primitives::{
    derive_chain_id, Bytes, SignatureError, Transaction, TxBaseSystem, TxEip1559, TxEnvelope,
    TxKind, TxSignature, TxType, TypedTransaction, U256,
};
use alloy_primitives::{address, b256};
use assert_matches::assert_matches;

const R: U256 = U256::from_limbs([0x1111, 0, 0, 0]);
const S: U256 = U256::from_limbs([0x2222, 0, 0, 0]);

fn base_system() -> TxBaseSystem {
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
fn base_system_signature_lifecycle() {
    let mut tx = base_system();
    assert_eq!(tx.chain_id(), None);
    assert_eq!(tx.raw_signature(), None);

    tx.set_signature(1, TxSignature::new(U256::from(37), R, S));
    assert_eq!(tx.chain_id(), Some(1));
    assert_eq!(tx.raw_signature(), Some(TxSignature::new(U256::from(37), R, S)));

    let copy = tx.deep_copy();
    assert_eq!(copy.nonce(), 5);
    assert_eq!(copy.gas_price(), U256::from(20_000_000_000u64));
    assert_eq!(copy.gas_limit(), 21_000);
    assert_eq!(copy.to(), None);
    assert_eq!(copy.value(), U256::ZERO);
    assert_eq!(copy.input(), &Bytes::from_static(&[0x60, 0x80]));
    assert_eq!(copy.raw_signature(), tx.raw_signature());
    assert_eq!(copy.tx_type(), TxType::BaseSystem);
}

#[test]
fn envelope_through_the_common_contract() {
    let mut envelope = TxEnvelope::new(base_system().into());
    let unsigned_hash = envelope.hash();

    envelope.set_signature(1, TxSignature::new(U256::from(37), R, S));
    assert_ne!(envelope.hash(), unsigned_hash);
    assert_eq!(envelope.chain_id(), Some(1));

    let decoded = TxEnvelope::decode_2718(&mut envelope.encoded_2718().as_slice()).unwrap();
    assert_eq!(decoded, envelope);
    assert_eq!(decoded.hash(), envelope.hash());
}

#[test]
fn sign_once_then_recover() {
    let secret = b256!("4646464646464646464646464646464646464646464646464646464646464646");
    let mut envelope = TxEnvelope::from(TypedTransaction::Eip1559(TxEip1559 {
        max_fee_per_gas: U256::from(30),
        max_priority_fee_per_gas: U256::from(2),
        gas_limit: 21_000,
        to: TxKind::Call(address!("3535353535353535353535353535353535353535")),
        ..Default::default()
    }));

    envelope.sign(secret, 7).unwrap();
    assert_eq!(envelope.chain_id(), Some(7));
    assert_eq!(
        envelope.recover_signer(),
        Some(address!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"))
    );
    assert_matches!(envelope.sign(secret, 7), Err(SignatureError::AlreadySigned));

    assert_eq!(envelope.effective_gas_price(None), U256::from(30));
    assert_eq!(envelope.effective_gas_price(Some(U256::from(10))), U256::from(12));
    assert_eq!(envelope.effective_gas_price(Some(U256::from(29))), U256::from(30));
}

#[test]
fn chain_id_derivation() {
    assert_eq!(derive_chain_id(U256::from(27)), None);
    assert_eq!(derive_chain_id(U256::from(28)), None);
    assert_eq!(derive_chain_id(U256::from(37)), Some(1));
    assert_eq!(derive_chain_id(U256::ZERO), None);
    assert_eq!(derive_chain_id(U256::from(255)), Some(110));
    assert_eq!(derive_chain_id(U256::MAX), None);
}
