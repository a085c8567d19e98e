// Codec Tests
// Wire encoding of signed transactions

use ledger_spammer::identity::Seed;
use ledger_spammer::ledger::{
    Balances, CodecError, Color, OutputId, TransactionBuilder, TransactionCodec, TransactionId,
};

#[test]
fn test_decoded_transaction_still_verifies() {
    let seed = Seed::generate();
    let keypair = seed.keypair(2);
    let tx = TransactionBuilder::new()
        .input(OutputId::new(&TransactionId::from_bytes([1; 32]), 3), &keypair)
        .output(Seed::generate().address(0), Balances::single(Color::NATIVE, 42))
        .build()
        .unwrap();

    let encoded = TransactionCodec::encode_base64(&tx).unwrap();
    let decoded = TransactionCodec::decode_base64(&encoded).unwrap();

    assert_eq!(decoded, tx);
    assert_eq!(decoded.id().unwrap(), tx.id().unwrap());
    assert!(decoded.verify(&[seed.address(2)]));
}

#[test]
fn test_decode_invalid_base64() {
    let result = TransactionCodec::decode_base64("***");
    assert!(matches!(result, Err(CodecError::InvalidBase64(_))));
}

#[test]
fn test_decode_truncated_bytes() {
    let result = TransactionCodec::decode(&[1, 2, 3]);
    assert!(matches!(result, Err(CodecError::DecodeError(_))));
}
