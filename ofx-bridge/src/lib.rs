//! OFX Bridge Library
//!
//! The boundary between a native, synchronous OFX parsing engine and a Rust
//! host. The engine calls one C-ABI trampoline per discovered statement,
//! account and transaction; the trampoline copies the record into an owned
//! host type, hands it to the host's callback set and returns the host's
//! continue/abort decision to the engine.
//!
//! # Architecture
//!
//! - [`records`]: owned host records (`Statement`, `Account`, `Transaction`)
//! - [`native`]: `#[repr(C)]` mirrors of `native/ofx_bridge.h`
//! - [`trampoline`]: the three `extern "C"` forwarding functions
//! - [`registry`]: per-parse dispatch context and the [`HostCallbacks`] trait
//! - [`engine`]: the [`NativeEngine`] seam, the C replay engine and, with the
//!   `libofx` feature, the libofx engine
//!
//! The library does NOT:
//! - Parse OFX syntax itself
//! - Validate financial semantics (currencies, balances)
//! - Retry or cache anything
//!
//! # Example Usage
//!
//! ```no_run
//! use ofx_bridge::{parse, Collector, Entity, ReplayEngine, Transaction};
//!
//! let entities = vec![Entity::Transaction(Transaction {
//!     amount: Some(-12.5),
//!     ..Default::default()
//! })];
//! let mut engine = ReplayEngine::from_entities(&entities).unwrap();
//!
//! let mut collector = Collector::new();
//! let report = parse(&mut engine, &mut collector).unwrap();
//! assert!(report.is_completed());
//! ```

// Public modules
pub mod engine;
pub mod native;
pub mod records;
pub mod registry;
pub mod trampoline;
pub mod types;

mod convert;

// Re-export main types for convenience
#[cfg(feature = "libofx")]
pub use engine::LibOfxEngine;
pub use engine::{parse, NativeEngine, ReplayEngine};
pub use native::Trampolines;
pub use records::{
    Account, AccountType, CorrectionAction, Entity, EntityKind, InvestmentTransactionType,
    Security, Statement, Timestamp, Transaction, TransactionType,
};
pub use registry::{Collector, HostCallbacks, Registry};
pub use trampoline::{ofxb_account_trampoline, ofxb_statement_trampoline, ofxb_transaction_trampoline};
pub use types::{BridgeError, ParseOutcome, ParseReport, Result, Status};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
