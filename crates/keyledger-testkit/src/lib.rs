//! # keyledger testkit
//!
//! Testing utilities for keyledger.
//!
//! - **Generators**: Proptest strategies for nonces, keys, events and whole
//!   ledgers
//! - **Fixtures**: Deterministic ledgers, tampering helpers and a datacenter
//!   with registered clients
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use keyledger_testkit::generators::{ledger_from_params, LedgerParams};
//!
//! proptest! {
//!     #[test]
//!     fn built_ledgers_verify(params: LedgerParams) {
//!         prop_assert!(ledger_from_params(&params).verify().is_valid());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use keyledger_testkit::fixtures::multi_user_fixture;
//!
//! let mut fixture = multi_user_fixture(2);
//! fixture.rotate(1, [0x11; 32]).unwrap();
//! assert!(fixture.datacenter.verify().is_valid());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    deterministic_ledger, multi_user_fixture, random_bytes, random_ledger, user_seed,
    zero_content, TestFixture,
};
pub use generators::{ledger_from_params, LedgerParams};
