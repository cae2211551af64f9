//! Test fixtures and helpers.
//!
//! Common setup code for integration tests and benchmarks.

use rand::RngCore;

use keyledger::{Client, Datacenter, DatacenterConfig, Result, SharedKey, X25519PublicKey};
use keyledger_core::{Ledger, Nonce};
use keyledger_keys::X25519StaticSecret;

/// Random bytes from the thread-local generator.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// A ledger of genesis plus `count` blocks of `len` random bytes, each with a
/// fresh nonce.
pub fn random_ledger(count: usize, len: usize) -> Ledger {
    let mut ledger = Ledger::with_genesis(0, random_nonce());
    for _ in 0..count {
        ledger.add_block(random_bytes(len), random_nonce());
    }
    ledger
}

/// A fully deterministic ledger: fixed timestamps, nonces and contents.
pub fn deterministic_ledger(count: usize) -> Ledger {
    let mut ledger = Ledger::with_genesis(1_736_870_400_000, Nonce::ZERO);
    for i in 1..=count {
        let byte = i as u8;
        ledger.add_block_at(
            vec![byte; 32],
            Nonce::from_bytes([byte; 12]),
            1_736_870_400_000 + i as i64,
        );
    }
    ledger
}

/// Zero the content of block `index`, keeping its length.
pub fn zero_content(ledger: &mut Ledger, index: usize) {
    if let Some(block) = ledger.block_mut(index) {
        block.content = vec![0u8; block.content.len()].into();
    }
}

fn random_nonce() -> Nonce {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    Nonce::from_bytes(bytes)
}

/// A datacenter plus the clients registered with it.
pub struct TestFixture {
    pub datacenter: Datacenter,
    pub clients: Vec<Client>,
}

impl TestFixture {
    /// Create a fixture with a datacenter keyed from `seed`.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_config(DatacenterConfig::default(), seed)
    }

    pub fn with_config(config: DatacenterConfig, seed: [u8; 32]) -> Self {
        let datacenter = Datacenter::with_secret(config, X25519StaticSecret::from_bytes(seed))
            .unwrap_or_else(|e| panic!("fixture datacenter: {e}"));
        Self {
            datacenter,
            clients: Vec::new(),
        }
    }

    /// Register a new client keyed from `seed`.
    pub fn register(&mut self, name: &str, id: u64, seed: [u8; 32]) -> Result<X25519PublicKey> {
        let client = Client::with_secret(name, id, X25519StaticSecret::from_bytes(seed));
        let key = client.public_key();
        self.datacenter.register_new_user(id, key)?;
        self.clients.push(client);
        Ok(key)
    }

    pub fn client(&self, id: u64) -> Option<&Client> {
        self.clients.iter().find(|c| c.id() == id)
    }

    pub fn client_mut(&mut self, id: u64) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.id() == id)
    }

    /// The proof client `id` presents to rotate away from its current key.
    pub fn rotation_proof(&self, id: u64) -> Option<SharedKey> {
        let datacenter_key = self.datacenter.public_key();
        self.client(id).map(|c| c.shared_secret_with(&datacenter_key))
    }

    /// Give client `id` a new key from `seed` and rotate it in the datacenter.
    pub fn rotate(&mut self, id: u64, seed: [u8; 32]) -> Result<X25519PublicKey> {
        let proof = self
            .rotation_proof(id)
            .ok_or(keyledger::DatacenterError::UnknownIdentifier(id))?;
        let secret = X25519StaticSecret::from_bytes(seed);
        let key = secret.public_key();
        self.datacenter.rotate_user_key(id, &proof, key)?;
        if let Some(client) = self.client_mut(id) {
            client.replace_secret(secret);
        }
        Ok(key)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::with_seed([0xdc; 32])
    }
}

/// Secret seed for fixture user `id`.
///
/// Hashed so that X25519 clamping cannot collapse neighbouring ids onto the
/// same key.
pub fn user_seed(id: u64) -> [u8; 32] {
    *blake3::hash(&id.to_le_bytes()).as_bytes()
}

/// A fixture with `count` registered clients, ids 1..=count.
pub fn multi_user_fixture(count: usize) -> TestFixture {
    let mut fixture = TestFixture::default();
    for id in 1..=count as u64 {
        fixture
            .register(&format!("user-{id}"), id, user_seed(id))
            .unwrap_or_else(|e| panic!("fixture user {id}: {e}"));
    }
    fixture
}
