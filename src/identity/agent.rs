//! DID agent seam and the bundled local Prism agent.
//!
//! The agent owns everything DID-method specific: turning a seed into a
//! master key, a public key into a DID, and a key plus DID into the
//! anchoring payload that ends up in transaction metadata.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use k256::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::identity::did::{Did, DidError};
use crate::identity::key::{compress, MasterKey, Seed};

/// Identifier of the master key inside the DID state.
pub const MASTER_KEY_ID: &str = "master0";

/// DID method and cryptography collaborator.
#[async_trait]
pub trait DidAgent: Send + Sync {
    fn create_master_key(&self, seed: &Seed) -> Result<MasterKey, DidError>;

    async fn create_did(&self, public_key: &PublicKey) -> Result<Did, DidError>;

    /// Serialized anchoring payload proving `master_key` creates `did`.
    async fn create_atala_object(&self, master_key: &MasterKey, did: &Did) -> Result<Vec<u8>, DidError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyUsage {
    MasterKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyEntry {
    pub id: String,
    pub usage: KeyUsage,
    pub curve: String,
    /// Hex SEC1 compressed point.
    pub compressed: String,
}

/// Initial DID state, encoded into the long-form DID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidState {
    pub public_keys: Vec<PublicKeyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOperation {
    pub signed_with: String,
    /// Hex DER ECDSA signature over the encoded state.
    pub signature: String,
    pub create_did: DidState,
}

/// Anchoring payload published on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtalaObject {
    pub operations: Vec<SignedOperation>,
}

impl AtalaObject {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DidError> {
        serde_json::from_slice(bytes).map_err(|e| DidError::MalformedState(e.to_string()))
    }
}

/// Self-contained Prism-style agent using secp256k1 keys.
#[derive(Debug, Clone, Default)]
pub struct LocalPrismAgent;

impl LocalPrismAgent {
    pub fn new() -> Self {
        Self
    }

    fn encode_state(public_key: &PublicKey) -> Result<Vec<u8>, DidError> {
        let state = DidState {
            public_keys: vec![PublicKeyEntry {
                id: MASTER_KEY_ID.to_string(),
                usage: KeyUsage::MasterKey,
                curve: "secp256k1".to_string(),
                compressed: hex::encode(compress(public_key)),
            }],
        };
        serde_json::to_vec(&state).map_err(|e| DidError::Encoding(e.to_string()))
    }

    /// Recover the encoded state from a long-form DID, checking it against the hash segment.
    fn decode_state(did: &Did) -> Result<(Vec<u8>, DidState), DidError> {
        let mut segments = did.segments();
        let (Some(hash), Some(encoded), None) = (segments.next(), segments.next(), segments.next()) else {
            return Err(DidError::NotLongForm(did.to_string()));
        };

        let state_bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| DidError::MalformedState(e.to_string()))?;
        if hex::encode(Sha256::digest(&state_bytes)) != hash {
            return Err(DidError::MalformedState("state does not match DID suffix".to_string()));
        }

        let state: DidState =
            serde_json::from_slice(&state_bytes).map_err(|e| DidError::MalformedState(e.to_string()))?;
        Ok((state_bytes, state))
    }
}

#[async_trait]
impl DidAgent for LocalPrismAgent {
    fn create_master_key(&self, seed: &Seed) -> Result<MasterKey, DidError> {
        MasterKey::from_seed(seed)
    }

    async fn create_did(&self, public_key: &PublicKey) -> Result<Did, DidError> {
        let state = Self::encode_state(public_key)?;
        let did = format!(
            "did:prism:{}:{}",
            hex::encode(Sha256::digest(&state)),
            URL_SAFE_NO_PAD.encode(&state)
        );
        Did::parse(&did)
    }

    async fn create_atala_object(&self, master_key: &MasterKey, did: &Did) -> Result<Vec<u8>, DidError> {
        if did.method() != "prism" {
            return Err(DidError::Invalid(did.to_string(), "not a prism DID"));
        }
        let (state_bytes, state) = Self::decode_state(did)?;

        let expected = hex::encode(master_key.compressed_public_key());
        let controls = state
            .public_keys
            .iter()
            .any(|k| k.id == MASTER_KEY_ID && k.usage == KeyUsage::MasterKey && k.compressed == expected);
        if !controls {
            return Err(DidError::KeyMismatch);
        }

        let object = AtalaObject {
            operations: vec![SignedOperation {
                signed_with: MASTER_KEY_ID.to_string(),
                signature: hex::encode(master_key.sign(&state_bytes)),
                create_did: state,
            }],
        };
        serde_json::to_vec(&object).map_err(|e| DidError::Encoding(e.to_string()))
    }
}
