use agora_primitives::{
    AccessListItem, Address, Bytes, Transaction, TxEip2930, TxEnvelope, TxKind, TxLegacy,
    TxSignature, TypedTransaction, B256, U256,
};

#[test]
fn unsigned_legacy_has_no_signature_field() {
    let tx = TxLegacy { nonce: 1, to: TxKind::Create, ..Default::default() };
    let json = serde_json::to_value(&tx).unwrap();
    assert!(json.get("signature").is_none());
    assert!(json["to"].is_null());

    let back: TxLegacy = serde_json::from_value(json).unwrap();
    assert_eq!(back, tx);
    assert_eq!(back.raw_signature(), None);
}

#[test]
fn envelope_roundtrip_recomputes_hash() {
    let tx = TypedTransaction::Eip2930(TxEip2930 {
        chain_id: 1,
        to: TxKind::Call(Address::ZERO),
        input: Bytes::from_static(&[1, 2, 3]),
        access_list: vec![AccessListItem {
            address: Address::repeat_byte(0x11),
            storage_keys: vec![B256::repeat_byte(0x22)],
        }]
        .into(),
        signature: Some(TxSignature::new(U256::from(1), U256::from(2), U256::from(3))),
        ..Default::default()
    });
    let envelope = TxEnvelope::new(tx);
    let hash = envelope.hash();

    let json = serde_json::to_string(&envelope).unwrap();
    assert!(!json.contains("hash"));

    let back: TxEnvelope = serde_json::from_str(&json).unwrap();
    assert_eq!(back, envelope);
    assert_eq!(back.hash(), hash);
    assert_eq!(back.access_list()[0].storage_keys, vec![B256::repeat_byte(0x22)]);
}
