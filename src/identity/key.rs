//! Master key material.
//!
//! # Security
//! - Seeds live in `Zeroizing` buffers and are wiped on drop
//! - The secp256k1 secret key zeroizes itself on drop
//! - Neither type is `Clone`, and `Debug` never prints key bytes

use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::identity::did::DidError;

/// Length of a wallet-style seed in bytes.
pub const SEED_LEN: usize = 64;

const DERIVATION_DOMAIN: &[u8] = b"prism-publisher/master-key/v1";

/// Random seed a master key is derived from.
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    /// Draw a fresh seed from the operating system RNG.
    pub fn random() -> Self {
        let mut bytes = Zeroizing::new([0u8; SEED_LEN]);
        OsRng.fill_bytes(&mut bytes[..]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

/// secp256k1 master key controlling a DID.
pub struct MasterKey {
    secret: SecretKey,
}

impl MasterKey {
    /// Derive the key deterministically from `seed`.
    ///
    /// Hashes the seed with a counter until the digest is a valid scalar;
    /// the first candidate is valid with overwhelming probability.
    pub fn from_seed(seed: &Seed) -> Result<Self, DidError> {
        for counter in 0u32..16 {
            let digest: Zeroizing<[u8; 32]> = Zeroizing::new(
                Sha256::new()
                    .chain_update(DERIVATION_DOMAIN)
                    .chain_update(seed.as_bytes())
                    .chain_update(counter.to_be_bytes())
                    .finalize()
                    .into(),
            );
            if let Ok(secret) = SecretKey::from_slice(&digest[..]) {
                return Ok(Self { secret });
            }
        }
        Err(DidError::KeyDerivation)
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// SEC1 compressed public key (33 bytes).
    pub fn compressed_public_key(&self) -> Vec<u8> {
        compress(&self.public_key())
    }

    /// ECDSA (SHA-256) signature over `message`, DER encoded.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signing_key = SigningKey::from(&self.secret);
        let signature: Signature = signing_key.sign(message);
        signature.to_der().as_bytes().to_vec()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("public_key", &hex::encode(self.compressed_public_key()))
            .finish_non_exhaustive()
    }
}

/// SEC1 compressed encoding of a public key.
pub fn compress(public_key: &PublicKey) -> Vec<u8> {
    public_key.to_encoded_point(true).as_bytes().to_vec()
}
