//! Datacenter registry and write pipeline scenarios.

use keyledger::event::info;
use keyledger::{
    Client, Datacenter, DatacenterConfig, DatacenterError, KeyStatus, SharedKey, RECORD_CAPACITY,
};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn datacenter() -> Datacenter {
    Datacenter::new(DatacenterConfig::default()).unwrap()
}

/// A client whose key the datacenter has never seen.
fn fresh_client(dc: &Datacenter, name: &str, id: u64) -> Client {
    let mut client = Client::new(name, id).unwrap();
    while dc.public_key_exists(&client.public_key()) {
        client.random_initialization().unwrap();
    }
    client
}

#[test]
fn test_registry_lifecycle() {
    init_tracing();
    let mut dc = datacenter();
    assert_eq!(dc.request_public_key(0).unwrap(), dc.public_key());

    let mut alice = fresh_client(&dc, "alice", 101);
    let bob = fresh_client(&dc, "bob", 102);
    dc.register_new_user(101, alice.public_key()).unwrap();
    dc.register_new_user(102, bob.public_key()).unwrap();

    assert_eq!(dc.request_public_key(101).unwrap(), alice.public_key());
    assert_eq!(dc.request_public_key(102).unwrap(), bob.public_key());
    assert!(matches!(
        dc.request_public_key(103),
        Err(DatacenterError::UnknownIdentifier(103))
    ));

    // Rotate with a proof derived from alice's old key.
    let old_proof = alice.shared_secret_with(&dc.public_key());
    let old_key = alice.public_key();
    while alice.public_key() == old_key || dc.public_key_exists(&alice.public_key()) {
        alice.random_initialization().unwrap();
    }
    dc.rotate_user_key(101, &old_proof, alice.public_key()).unwrap();
    assert_eq!(dc.request_public_key(101).unwrap(), alice.public_key());

    // Same request again: the key is now current.
    assert!(matches!(
        dc.rotate_user_key(101, &old_proof, alice.public_key()),
        Err(DatacenterError::KeyUnchanged(101))
    ));
    // Proof from the new key, but rotating to itself.
    let new_proof = alice.shared_secret_with(&dc.public_key());
    assert!(dc
        .rotate_user_key(101, &new_proof, alice.public_key())
        .is_err());
    // Rotating onto someone else's key.
    assert!(matches!(
        dc.rotate_user_key(101, &new_proof, bob.public_key()),
        Err(DatacenterError::KeyInUse(_))
    ));
    // Rotating back to a revoked key.
    assert_eq!(dc.key_status(&old_key), Some(KeyStatus::Revoked));
    assert!(matches!(
        dc.rotate_user_key(101, &new_proof, old_key),
        Err(DatacenterError::KeyInUse(_))
    ));

    dc.force_write().unwrap();
    assert_eq!(dc.pending(), 0);
    assert!(dc.verify().is_valid());

    let infos: Vec<_> = dc.audit_trail().unwrap().iter().map(|e| e.info()).collect();
    assert_eq!(
        infos,
        [
            info::DATACENTER_READY,
            info::REGISTER_NEW_USER,
            info::REGISTER_NEW_USER,
            info::UPDATE_KEY,
            info::UPDATE_KEY_SUCCESS,
        ]
    );
}

#[test]
fn test_duplicate_identifier_keeps_first_key() {
    let mut dc = datacenter();
    let first = fresh_client(&dc, "first", 42);
    let second = fresh_client(&dc, "second", 42);

    dc.register_new_user(42, first.public_key()).unwrap();
    let result = dc.register_new_user(42, second.public_key());

    assert!(matches!(result, Err(DatacenterError::DuplicateIdentifier(42))));
    assert_eq!(dc.request_public_key(42).unwrap(), first.public_key());
    assert!(!dc.public_key_exists(&second.public_key()));
}

#[test]
fn test_wrong_proof_then_correct_proof() {
    init_tracing();
    let mut dc = datacenter();
    let mut alice = fresh_client(&dc, "alice", 7);
    let mallory = fresh_client(&dc, "mallory", 8);
    dc.register_new_user(7, alice.public_key()).unwrap();

    let original = alice.public_key();
    let real_proof = alice.shared_secret_with(&dc.public_key());
    alice.random_initialization().unwrap();
    let replacement = alice.public_key();

    // Mallory knows alice's public key but not her secret.
    let forged = mallory.shared_secret_with(&dc.public_key());
    assert!(matches!(
        dc.rotate_user_key(7, &forged, replacement),
        Err(DatacenterError::ProofMismatch(7))
    ));
    assert!(matches!(
        dc.rotate_user_key(7, &SharedKey::from_bytes([0xff; 32]), replacement),
        Err(DatacenterError::ProofMismatch(7))
    ));
    assert_eq!(dc.request_public_key(7).unwrap(), original);
    assert_eq!(dc.key_status(&replacement), None);

    dc.rotate_user_key(7, &real_proof, replacement).unwrap();
    assert_eq!(dc.request_public_key(7).unwrap(), replacement);

    // Each failed attempt still left an "update key" record.
    let trail = dc.audit_trail().unwrap();
    let requested = trail.iter().filter(|e| e.info() == info::UPDATE_KEY).count();
    let succeeded = trail
        .iter()
        .filter(|e| e.info() == info::UPDATE_KEY_SUCCESS)
        .count();
    assert_eq!((requested, succeeded), (3, 1));
}

#[test]
fn test_exact_multiple_write_seals_full_blocks() {
    let mut dc = datacenter();
    dc.force_write().unwrap();
    let size = dc.ledger().size();

    let sealed = dc.write_bytes(&vec![0x5a; 3 * RECORD_CAPACITY]).unwrap();

    assert_eq!(sealed, 3);
    assert_eq!(dc.ledger().size(), size + 3);
    assert_eq!(dc.pending(), 0);
    for block in &dc.ledger().blocks()[size..] {
        assert_eq!(block.content().len(), RECORD_CAPACITY);
    }
}

#[test]
fn test_messages_through_registered_keys() {
    let mut dc = datacenter();
    let alice = fresh_client(&dc, "alice", 1);
    let bob = fresh_client(&dc, "bob", 2);
    dc.register_new_user(1, alice.public_key()).unwrap();
    dc.register_new_user(2, bob.public_key()).unwrap();

    let bob_key = dc.request_public_key(2).unwrap();
    let message = alice.encrypt_msg("meet at the datacenter", &bob_key).unwrap();
    assert_eq!(bob.decrypt_msg(&message).unwrap(), "meet at the datacenter");
    assert!(alice.decrypt_msg(&message).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_write_loses_no_bytes(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..300), 1..12),
        capacity in 1usize..128,
    ) {
        let config = DatacenterConfig::default().with_buffer_capacity(capacity);
        let mut dc = Datacenter::new(config).unwrap();
        dc.force_write().unwrap();
        let size = dc.ledger().size();

        let mut written = Vec::new();
        for chunk in &chunks {
            dc.write_bytes(chunk).unwrap();
            written.extend_from_slice(chunk);
        }
        dc.force_write().unwrap();

        let sealed: Vec<u8> = dc.ledger().blocks()[size..]
            .iter()
            .flat_map(|block| block.content().iter().copied())
            .collect();
        prop_assert_eq!(sealed, written);
        prop_assert!(dc.verify().is_valid());
    }
}
