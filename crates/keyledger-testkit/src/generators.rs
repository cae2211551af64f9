//! Proptest generators for property-based testing.

use proptest::prelude::*;

use keyledger::AuditEvent;
use keyledger_core::{Fingerprint, Ledger, Nonce, RECORD_CAPACITY};
use keyledger_keys::{X25519PublicKey, X25519StaticSecret};

/// Generate a random Nonce.
pub fn nonce() -> impl Strategy<Value = Nonce> {
    any::<[u8; 12]>().prop_map(Nonce::from_bytes)
}

/// Generate a random Fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate a valid X25519 public key.
pub fn public_key() -> impl Strategy<Value = X25519PublicKey> {
    any::<[u8; 32]>().prop_map(|seed| X25519StaticSecret::from_bytes(seed).public_key())
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Generate block content no longer than a record.
pub fn content() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=RECORD_CAPACITY)
}

/// Generate any audit event.
pub fn audit_event() -> impl Strategy<Value = AuditEvent> {
    (0u8..4, timestamp(), any::<u64>(), public_key()).prop_map(|(tag, at, id, key)| match tag {
        0 => AuditEvent::DatacenterReady {
            at,
            datacenter: id,
            key,
        },
        1 => AuditEvent::UserRegistered { at, user: id, key },
        2 => AuditEvent::KeyRotationRequested {
            at,
            user: id,
            current: key,
        },
        _ => AuditEvent::KeyRotated { at, user: id, key },
    })
}

/// Parameters for building a ledger.
#[derive(Debug, Clone)]
pub struct LedgerParams {
    pub genesis_timestamp: i64,
    pub genesis_nonce: Nonce,
    pub blocks: Vec<(Vec<u8>, Nonce, i64)>,
}

impl Arbitrary for LedgerParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            timestamp(),
            nonce(),
            prop::collection::vec((content(), nonce(), timestamp()), 0..16),
        )
            .prop_map(|(genesis_timestamp, genesis_nonce, blocks)| LedgerParams {
                genesis_timestamp,
                genesis_nonce,
                blocks,
            })
            .boxed()
    }
}

/// Build a ledger from parameters.
pub fn ledger_from_params(params: &LedgerParams) -> Ledger {
    let mut ledger = Ledger::with_genesis(params.genesis_timestamp, params.genesis_nonce);
    for (content, nonce, timestamp) in &params.blocks {
        ledger.add_block_at(content.clone(), *nonce, *timestamp);
    }
    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyledger::decode_events;

    proptest! {
        #[test]
        fn test_built_ledgers_verify(params: LedgerParams) {
            let ledger = ledger_from_params(&params);
            prop_assert_eq!(ledger.size(), params.blocks.len() + 1);
            prop_assert!(ledger.verify().is_valid());
        }

        #[test]
        fn test_top_fingerprint_deterministic(params: LedgerParams) {
            let a = ledger_from_params(&params);
            let b = ledger_from_params(&params);
            prop_assert_eq!(a.top_fingerprint(), b.top_fingerprint());
            prop_assert!(a.vote(&b));
        }

        #[test]
        fn test_interior_tamper_reported_at_site(
            params: LedgerParams,
            site_seed in any::<usize>(),
            forged in timestamp(),
        ) {
            prop_assume!(!params.blocks.is_empty());
            let mut ledger = ledger_from_params(&params);
            let honest = ledger.clone();

            // Any block except the top.
            let site = site_seed % (ledger.size() - 1);
            prop_assume!(ledger.block(site).unwrap().timestamp() != forged);
            ledger.block_mut(site).unwrap().header.timestamp = forged;

            prop_assert_eq!(ledger.verify().offending_block(), Some(site));
            prop_assert!(!honest.vote(&ledger));
        }

        #[test]
        fn test_event_stream_decodes(events in prop::collection::vec(audit_event(), 1..8)) {
            let mut joined = Vec::new();
            for event in &events {
                joined.extend(event.to_bytes().unwrap());
            }
            prop_assert_eq!(decode_events(&joined).unwrap(), events);
        }
    }
}
