use crate::error::{Error, Result};
use crate::keys::{Ed25519PrivateKey, Ed25519PublicKey};

use aws_lc_rs::signature::{UnparsedPublicKey, ED25519};

/// Ed25519 signing is deterministic and cannot fail once the key is loaded
pub(crate) fn sign(key: &Ed25519PrivateKey, message: &[u8]) -> Vec<u8> {
    key.keypair().sign(message).as_ref().to_vec()
}

pub(crate) fn verify(key: &Ed25519PublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
    UnparsedPublicKey::new(&ED25519, key.as_bytes())
        .verify(message, signature)
        .map_err(|_| Error::SignatureInvalid)
}
