//! Per-algorithm round-trip tests
//!
//! Every registered algorithm must:
//! 1. Sign a claims set into a compact token
//! 2. Verify the token with the matching public or shared key
//! 3. Preserve the claims through the round-trip
//! 4. Reject the token when the signed bytes change

mod common;

use common::*;
use jwtseal::*;

fn round_trip(algorithm: AlgorithmId) {
    let clock = ManualClock::new(NOW);
    let key = key_for(algorithm);

    let token = Signer::new(algorithm, key.clone())
        .unwrap_or_else(|e| panic!("{algorithm}: {e}"))
        .with_clock(clock.clone())
        .sign(&claims(
            StandardClaims::new()
                .issuer("https://issuer.example")
                .subject("test-user")
                .audience("test-app")
                .expiration(NOW + 3600),
        ))
        .unwrap_or_else(|e| panic!("{algorithm}: {e}"));

    let verified = Verifier::new(key.verifying_key())
        .algorithms(AlgorithmPolicy::only(algorithm))
        .validation(ValidationConfig::default().clock(clock))
        .verify(&token)
        .unwrap_or_else(|e| panic!("{algorithm}: {e}"));

    assert_eq!(verified.algorithm(), algorithm);
    assert_eq!(verified.header().algorithm_str(), algorithm.as_str());
    assert_eq!(verified.header().token_type.as_deref(), Some("JWT"));

    let claims = verified.claims();
    assert_eq!(claims.issuer.as_deref(), Some("https://issuer.example"));
    assert_eq!(claims.subject.as_deref(), Some("test-user"));
    assert!(claims.audience.as_ref().is_some_and(|aud| aud.contains("test-app")));
    assert_eq!(claims.expiration, Some(NOW + 3600));
}

mod hmac_tests {
    use super::*;

    #[test]
    fn round_trip_hs256() {
        round_trip(AlgorithmId::HS256);
    }

    #[test]
    fn round_trip_hs384() {
        round_trip(AlgorithmId::HS384);
    }

    #[test]
    fn round_trip_hs512() {
        round_trip(AlgorithmId::HS512);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = sign(
            AlgorithmId::HS256,
            &SigningKey::symmetric(HS256_SECRET),
            &ClaimsSet::new(),
        )
        .unwrap();

        let result = Verifier::new(VerifyingKey::symmetric(vec![0x11; 32])).verify(&token);
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }
}

mod rsa_tests {
    use super::*;

    #[test]
    fn round_trip_rs256() {
        round_trip(AlgorithmId::RS256);
    }

    #[test]
    fn round_trip_rs384() {
        round_trip(AlgorithmId::RS384);
    }

    #[test]
    fn round_trip_rs512() {
        round_trip(AlgorithmId::RS512);
    }

    #[test]
    fn round_trip_ps256() {
        round_trip(AlgorithmId::PS256);
    }

    #[test]
    fn round_trip_ps384() {
        round_trip(AlgorithmId::PS384);
    }

    #[test]
    fn round_trip_ps512() {
        round_trip(AlgorithmId::PS512);
    }

    #[test]
    fn public_key_from_der_verifies() {
        let key = rsa_key();
        let der = match key.verifying_key() {
            VerifyingKey::Rsa(public) => public.as_der().to_vec(),
            other => panic!("unexpected key: {other:?}"),
        };

        let token = sign(AlgorithmId::RS256, key, &ClaimsSet::new()).unwrap();
        let verified = Verifier::new(VerifyingKey::rsa_public(der))
            .verify(&token)
            .unwrap();
        assert_eq!(verified.algorithm(), AlgorithmId::RS256);
    }

    #[test]
    fn pkcs1_token_does_not_verify_as_pss() {
        let key = rsa_key();
        let token = sign(AlgorithmId::RS256, key, &ClaimsSet::new()).unwrap();

        // Relabel the header; the signature bytes stay the same
        let (_, rest) = token.split_once('.').unwrap();
        let header = utils::encode_bytes(r#"{"alg":"PS256","typ":"JWT"}"#);
        let relabeled = format!("{header}.{rest}");

        let result = Verifier::new(key.verifying_key()).verify(&relabeled);
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }
}

mod ecdsa_tests {
    use super::*;

    #[test]
    fn round_trip_es256() {
        round_trip(AlgorithmId::ES256);
    }

    #[test]
    fn round_trip_es384() {
        round_trip(AlgorithmId::ES384);
    }

    #[test]
    fn round_trip_es512() {
        round_trip(AlgorithmId::ES512);
    }

    #[test]
    fn signatures_are_fixed_width() {
        for (algorithm, width) in [
            (AlgorithmId::ES256, 64),
            (AlgorithmId::ES384, 96),
            (AlgorithmId::ES512, 132),
        ] {
            let token = sign(algorithm, &key_for(algorithm), &ClaimsSet::new()).unwrap();
            let signature = token.rsplit('.').next().unwrap();
            let bytes = utils::decode_bytes(signature, 1024).unwrap();
            assert_eq!(bytes.len(), width, "{algorithm}");
        }
    }

    #[test]
    fn curve_mismatch_rejected() {
        let key = ecdsa_key(EcdsaCurve::P384);
        let result = Signer::new(AlgorithmId::ES256, key);
        assert!(matches!(result, Err(Error::KeyMismatch { .. })));
    }
}

mod eddsa_tests {
    use super::*;

    #[test]
    fn round_trip_eddsa() {
        round_trip(AlgorithmId::EdDSA);
    }

    #[test]
    fn raw_public_key_verifies() {
        let key = ed25519_key();
        let raw = match key.verifying_key() {
            VerifyingKey::Ed25519(public) => public.as_bytes().to_vec(),
            other => panic!("unexpected key: {other:?}"),
        };

        let token = sign(AlgorithmId::EdDSA, &key, &ClaimsSet::new()).unwrap();
        let verifier = Verifier::new(VerifyingKey::ed25519_public(&raw).unwrap());
        assert!(verifier.verify(&token).is_ok());
    }
}

#[test]
fn every_algorithm_rejects_tampered_payload() {
    for algorithm in AlgorithmId::ALL {
        let key = key_for(algorithm);
        let token = sign(
            algorithm,
            &key,
            &claims(StandardClaims::new().subject("alice")),
        )
        .unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let payload = utils::encode_bytes(r#"{"sub":"mallory"}"#);
        let tampered = format!("{}.{}.{}", parts[0], payload, parts[2]);

        let result = Verifier::new(key.verifying_key()).verify(&tampered);
        assert!(
            matches!(result, Err(Error::SignatureInvalid)),
            "{algorithm}: {result:?}"
        );
    }
}
