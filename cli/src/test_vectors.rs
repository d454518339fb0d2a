//! Known-answer test vectors
//!
//! The Ethereum vector is a real personal-sign signature over a NEAR
//! transfer payload; the WebAuthn vector is a real authenticator
//! assertion. Both verified end-to-end against the on-chain precompiles
//! before being frozen here, so they pin down every byte of the codec,
//! canonicalizer, derivation and builder pipeline at once.

#[cfg(test)]
mod ethereum_vectors {
    use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey as K256VerifyingKey};

    use crate::derive::eth_address_from_compressed;
    use crate::message::{eth_message_hash, eth_signed_message};
    use crate::precompile::{build_verification_instruction, SignatureScheme};
    use crate::signature::{parse_signature, Curve, VEncoding};

    const MESSAGE: &str = "{\"actions\":[{\"Transfer\":{\"deposit\":\"10000000000000000000\"}}],\"nonce\":\"4\",\"receiver_id\":\"felipe-sandbox-account.testnet\"}";
    const SIGNATURE: &str =
        "0x1413a2cc33c3ad9a150de47566c098c7f0a3f3236767ae80cfb3dcef1447d5ad\
         1850f86f1161a5cc3620dcd8a0675f5e7ccf76f5772bb3af6ed6ea6e4ee05d111b";
    const COMPRESSED_PUBKEY: &str =
        "0x0304ab3cb2897344aa3f6ffaac94e477aeac170b9235d2416203e2a72bc9b8a7c7";
    const ETH_ADDRESS: &str = "4174678c78feafd778c1ff319d5d326701449b25";

    fn expected_pubkey() -> Vec<u8> {
        hex::decode(COMPRESSED_PUBKEY.trim_start_matches("0x")).unwrap()
    }

    fn recover(message: &str, signature_hex: &str) -> Option<Vec<u8>> {
        let parsed =
            parse_signature(signature_hex, Curve::Secp256k1, VEncoding::EthereumLegacy).ok()?;
        let digest = eth_message_hash(message.as_bytes());
        let signature = K256Signature::from_slice(&parsed.rs_bytes()).ok()?;
        let recovery_id = RecoveryId::try_from(parsed.recovery_id?).ok()?;
        let recovered =
            K256VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id).ok()?;
        Some(recovered.to_encoded_point(true).as_bytes().to_vec())
    }

    #[test]
    fn test_vector_signature_recovers_the_expected_key() {
        // v = 0x1b = 27 -> recovery id 0
        let recovered = recover(MESSAGE, SIGNATURE).expect("recovery must succeed");
        assert_eq!(recovered, expected_pubkey());
    }

    #[test]
    fn test_vector_address_derivation() {
        let address = eth_address_from_compressed(&expected_pubkey()).unwrap();
        assert_eq!(hex::encode(address), ETH_ADDRESS);
    }

    #[test]
    fn test_tampered_message_does_not_recover_the_key() {
        // flipping any single byte of the payload must break the match;
        // verification reports this as a rejection, never a success
        let mut tampered = MESSAGE.to_string();
        tampered.replace_range(tampered.len() - 1.., "u");

        match recover(&tampered, SIGNATURE) {
            Some(recovered) => assert_ne!(recovered, expected_pubkey()),
            None => {} // failing to recover at all is an equally valid rejection
        }
    }

    #[test]
    fn test_tampered_recovery_byte_does_not_recover_the_key() {
        // 0x1b -> 0x1c flips the recovery id and must change the
        // recovered key
        let tampered = format!("{}1c", &SIGNATURE[..SIGNATURE.len() - 2]);
        match recover(MESSAGE, &tampered) {
            Some(recovered) => assert_ne!(recovered, expected_pubkey()),
            None => {}
        }
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let other_key = k256::ecdsa::SigningKey::from_slice(&[0x42u8; 32])
            .unwrap()
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec();

        let recovered = recover(MESSAGE, SIGNATURE).unwrap();
        assert_ne!(recovered, other_key);
    }

    #[test]
    fn test_vector_precompile_instruction_bytes() {
        // the full pipeline: parse -> derive -> canonicalize -> build
        let parsed =
            parse_signature(SIGNATURE, Curve::Secp256k1, VEncoding::EthereumLegacy).unwrap();
        let message = eth_signed_message(MESSAGE.as_bytes());
        let program_id = solana_sdk::pubkey::Pubkey::new_unique();

        let instruction = build_verification_instruction(
            &program_id,
            SignatureScheme::K1Pubkey,
            &parsed,
            &expected_pubkey(),
            &message,
            1,
        )
        .unwrap();
        let data = &instruction.data;

        // 12-byte header, address, signature, recovery id, message
        assert_eq!(data.len(), 12 + 20 + 64 + 1 + message.len());
        assert_eq!(hex::encode(&data[12..32]), ETH_ADDRESS);
        assert_eq!(&data[32..96], &parsed.rs_bytes());
        assert_eq!(data[96], 0);
        assert_eq!(&data[97..], &message);
        // prefix length for this payload is three decimal digits
        assert!(message.starts_with(b"\x19Ethereum Signed Message:\n121"));
    }
}

#[cfg(test)]
mod webauthn_vectors {
    use p256::ecdsa::signature::Verifier;
    use p256::ecdsa::{Signature as P256Signature, VerifyingKey as P256VerifyingKey};

    use crate::message::webauthn_message;
    use crate::precompile::{build_verification_instruction, SignatureScheme};
    use crate::signature::{normalize, parse_signature, Curve, VEncoding};

    const SIGNATURE: &str =
        "0xf77969b7eaeaaed4b9a5cc5636b3755259d29d1406d8e852a8ce43dc74644da1\
         1453962702ea21a9efdd4a7077e39fcd754e3d01579493cf972f0151b6672f1f";
    const AUTHENTICATOR_DATA: &str =
        "0x49960de5880e8c687434170f6476605b8fe4aeb9a28632c7995cf3ba831d97631900000000";
    const CLIENT_DATA: &str = "{\"type\":\"webauthn.get\",\"challenge\":\"tAuyPmQcczI8CFoTekJz5iITeP80zcJ60VTC4sYz5s8\",\"origin\":\"http://localhost:3000\",\"crossOrigin\":false}";
    const COMPRESSED_PUBKEY: &str =
        "0x0220fb23e028391b72c517850b3cc83ba529ef4db766098a29bf3c8d06be957878";

    fn message() -> Vec<u8> {
        let authenticator_data =
            hex::decode(AUTHENTICATOR_DATA.trim_start_matches("0x")).unwrap();
        webauthn_message(&authenticator_data, CLIENT_DATA)
    }

    fn verifying_key() -> P256VerifyingKey {
        let pubkey = hex::decode(COMPRESSED_PUBKEY.trim_start_matches("0x")).unwrap();
        P256VerifyingKey::from_sec1_bytes(&pubkey).unwrap()
    }

    #[test]
    fn test_vector_signature_verifies() {
        let parsed =
            parse_signature(SIGNATURE, Curve::Secp256r1, VEncoding::RawRecovery).unwrap();
        let canonical = normalize(&parsed, Curve::Secp256r1).unwrap();
        let signature = P256Signature::from_slice(&canonical.rs_bytes()).unwrap();

        // the precompile SHA-256-hashes the full message before curve
        // verification; p256's Verifier does the same
        verifying_key()
            .verify(&message(), &signature)
            .expect("known-good webauthn assertion must verify");
    }

    #[test]
    fn test_tampered_authenticator_data_is_rejected() {
        let mut authenticator_data =
            hex::decode(AUTHENTICATOR_DATA.trim_start_matches("0x")).unwrap();
        authenticator_data[0] ^= 0x01;
        let tampered = webauthn_message(&authenticator_data, CLIENT_DATA);

        let parsed =
            parse_signature(SIGNATURE, Curve::Secp256r1, VEncoding::RawRecovery).unwrap();
        let signature = P256Signature::from_slice(&parsed.rs_bytes()).unwrap();
        assert!(verifying_key().verify(&tampered, &signature).is_err());
    }

    #[test]
    fn test_tampered_client_data_is_rejected() {
        let authenticator_data =
            hex::decode(AUTHENTICATOR_DATA.trim_start_matches("0x")).unwrap();
        let tampered_json = CLIENT_DATA.replace("localhost:3000", "localhost:3001");
        let tampered = webauthn_message(&authenticator_data, &tampered_json);

        let parsed =
            parse_signature(SIGNATURE, Curve::Secp256r1, VEncoding::RawRecovery).unwrap();
        let signature = P256Signature::from_slice(&parsed.rs_bytes()).unwrap();
        assert!(verifying_key().verify(&tampered, &signature).is_err());
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let other_key = *p256::ecdsa::SigningKey::from_slice(&[0x42u8; 32])
            .unwrap()
            .verifying_key();

        let parsed =
            parse_signature(SIGNATURE, Curve::Secp256r1, VEncoding::RawRecovery).unwrap();
        let signature = P256Signature::from_slice(&parsed.rs_bytes()).unwrap();
        assert!(other_key.verify(&message(), &signature).is_err());
    }

    #[test]
    fn test_vector_precompile_instruction_bytes() {
        let parsed =
            parse_signature(SIGNATURE, Curve::Secp256r1, VEncoding::RawRecovery).unwrap();
        let canonical = normalize(&parsed, Curve::Secp256r1).unwrap();
        let pubkey = hex::decode(COMPRESSED_PUBKEY.trim_start_matches("0x")).unwrap();
        let message = message();
        let program_id = solana_sdk::pubkey::Pubkey::new_unique();

        let instruction = build_verification_instruction(
            &program_id,
            SignatureScheme::R1Pubkey,
            &canonical,
            &pubkey,
            &message,
            1,
        )
        .unwrap();
        let data = &instruction.data;

        // 16-byte header, signature, key, 37 + 32 byte message
        assert_eq!(data.len(), 16 + 64 + 33 + 37 + 32);
        assert_eq!(&data[16..80], &canonical.rs_bytes());
        assert_eq!(&data[80..113], &pubkey);
        assert_eq!(&data[113..], &message);
        // this vector is already low-s, so normalization left it alone
        assert_eq!(canonical.rs_bytes(), parsed.rs_bytes());
    }
}
