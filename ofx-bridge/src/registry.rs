//! Dispatch registry and host callback set
//!
//! A [`Registry`] is the per-parse context the native engine carries around
//! as its opaque user-data pointer. It borrows the host callback set for the
//! duration of one parse call and records what happened: how many records
//! of each kind reached the host, whether the run was aborted, and the first
//! failure a trampoline ran into.
//!
//! The registry belongs to the thread that created it. Only the owner thread
//! dispatches; a call arriving from any other thread is counted through an
//! atomic, marks the run aborted, and never touches the callback set.

use crate::records::{Account, Entity, EntityKind, Statement, Transaction};
use crate::types::{BridgeError, ParseOutcome, ParseReport, Result, Status};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::os::raw::{c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, ThreadId};

/// Marks a live registry ("OFXBREG1")
const REGISTRY_TAG: u64 = 0x4f46_5842_5245_4731;

/// Host-side handlers, one per entity kind
///
/// Each handler receives an owned copy of the record and decides whether the
/// engine should keep going. `self` is the host accumulator: whatever the
/// handlers mutate is what the host inspects once `parse` returns, including
/// everything delivered before an abort.
pub trait HostCallbacks {
    fn statement(&mut self, statement: Statement) -> Status {
        let _ = statement;
        Status::Continue
    }

    fn account(&mut self, account: Account) -> Status {
        let _ = account;
        Status::Continue
    }

    fn transaction(&mut self, transaction: Transaction) -> Status {
        let _ = transaction;
        Status::Continue
    }
}

/// Accumulator that keeps every delivered record in document order
#[derive(Debug, Default)]
pub struct Collector {
    entities: Vec<Entity>,
    abort_after_transactions: Option<usize>,
    transactions_seen: usize,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: return ABORT from the n-th transaction (1-based)
    pub fn abort_after_transactions(mut self, n: usize) -> Self {
        self.abort_after_transactions = Some(n);
        self
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Statement(s) => Some(s),
            _ => None,
        })
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Account(a) => Some(a),
            _ => None,
        })
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Transaction(t) => Some(t),
            _ => None,
        })
    }

    /// Kinds in delivery order
    pub fn kinds(&self) -> Vec<EntityKind> {
        self.entities.iter().map(Entity::kind).collect()
    }
}

impl HostCallbacks for Collector {
    fn statement(&mut self, statement: Statement) -> Status {
        self.entities.push(Entity::Statement(statement));
        Status::Continue
    }

    fn account(&mut self, account: Account) -> Status {
        self.entities.push(Entity::Account(account));
        Status::Continue
    }

    fn transaction(&mut self, transaction: Transaction) -> Status {
        self.entities.push(Entity::Transaction(transaction));
        self.transactions_seen += 1;
        match self.abort_after_transactions {
            Some(n) if self.transactions_seen >= n => Status::Abort,
            _ => Status::Continue,
        }
    }
}

/// Per-parse dispatch context threaded through the native engine
pub struct Registry<'a> {
    tag: u64,
    owner: ThreadId,
    callbacks: RefCell<&'a mut dyn HostCallbacks>,
    statements: Cell<usize>,
    accounts: Cell<usize>,
    transactions: Cell<usize>,
    suppressed: Cell<usize>,
    failure: RefCell<Option<BridgeError>>,
    aborted: AtomicBool,
    foreign_calls: AtomicUsize,
    // Pinned to the creating thread
    _not_send: PhantomData<*const ()>,
}

impl<'a> Registry<'a> {
    /// Create a registry for one parse call on the current thread
    pub fn new(callbacks: &'a mut dyn HostCallbacks) -> Self {
        Self {
            tag: REGISTRY_TAG,
            owner: thread::current().id(),
            callbacks: RefCell::new(callbacks),
            statements: Cell::new(0),
            accounts: Cell::new(0),
            transactions: Cell::new(0),
            suppressed: Cell::new(0),
            failure: RefCell::new(None),
            aborted: AtomicBool::new(false),
            foreign_calls: AtomicUsize::new(0),
            _not_send: PhantomData,
        }
    }

    /// Opaque pointer to hand to the native engine
    ///
    /// Valid for as long as the registry is neither moved nor dropped.
    pub fn user_data(&self) -> *mut c_void {
        self as *const Registry<'a> as *mut c_void
    }

    /// Resolve a user-data pointer produced by [`Registry::user_data`]
    ///
    /// Returns `None` for null, misaligned or untagged pointers.
    ///
    /// # Safety
    /// A non-null `user_data` must point to readable memory of at least
    /// `size_of::<Registry>()` bytes; a tagged one must be a live registry.
    pub(crate) unsafe fn from_user_data<'r>(user_data: *mut c_void) -> Option<&'r Registry<'r>> {
        if user_data.is_null() || (user_data as usize) % std::mem::align_of::<Registry<'r>>() != 0 {
            return None;
        }
        let registry = &*(user_data as *const Registry<'r>);
        (registry.tag == REGISTRY_TAG).then_some(registry)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn foreign_calls(&self) -> usize {
        self.foreign_calls.load(Ordering::SeqCst)
    }

    /// Run one delivery: thread check, abort check, conversion, dispatch
    pub(crate) fn deliver<T>(
        &self,
        kind: EntityKind,
        convert: impl FnOnce() -> Result<T>,
        call: impl FnOnce(&mut dyn HostCallbacks, T) -> Status,
    ) -> Status {
        if thread::current().id() != self.owner {
            // Only atomics may be touched from here
            self.foreign_calls.fetch_add(1, Ordering::SeqCst);
            self.aborted.store(true, Ordering::SeqCst);
            log::error!("{} trampoline called from a foreign thread, aborting run", kind);
            return Status::Abort;
        }

        if self.is_aborted() {
            self.suppressed.set(self.suppressed.get() + 1);
            log::warn!("Dropping {} delivered after abort", kind);
            return Status::Abort;
        }

        let record = match convert() {
            Ok(record) => record,
            Err(e) => {
                self.fail(e);
                return Status::Abort;
            }
        };

        let mut callbacks = match self.callbacks.try_borrow_mut() {
            Ok(callbacks) => callbacks,
            Err(_) => {
                self.fail(BridgeError::Reentrant(kind));
                return Status::Abort;
            }
        };

        self.count(kind);
        log::debug!("Dispatching {} #{}", kind, self.count_of(kind));

        match catch_unwind(AssertUnwindSafe(|| call(&mut **callbacks, record))) {
            Ok(Status::Continue) => Status::Continue,
            Ok(Status::Abort) => {
                log::info!("Host {} callback requested abort", kind);
                self.aborted.store(true, Ordering::SeqCst);
                Status::Abort
            }
            Err(payload) => {
                drop(callbacks);
                self.fail(BridgeError::CallbackPanicked(kind, panic_message(payload.as_ref())));
                Status::Abort
            }
        }
    }

    /// Abort the run; keep the first failure, log the rest
    fn fail(&self, error: BridgeError) {
        self.aborted.store(true, Ordering::SeqCst);
        let mut slot = self.failure.borrow_mut();
        if slot.is_none() {
            log::error!("Aborting parse: {}", error);
            *slot = Some(error);
        } else {
            log::warn!("Additional failure after abort: {}", error);
        }
    }

    fn count(&self, kind: EntityKind) {
        let cell = match kind {
            EntityKind::Statement => &self.statements,
            EntityKind::Account => &self.accounts,
            EntityKind::Transaction => &self.transactions,
        };
        cell.set(cell.get() + 1);
    }

    fn count_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Statement => self.statements.get(),
            EntityKind::Account => self.accounts.get(),
            EntityKind::Transaction => self.transactions.get(),
        }
    }

    /// Fold the engine's native status with what this registry observed
    pub fn into_report(mut self, native_status: c_int) -> ParseReport {
        let foreign_calls = self.foreign_calls();
        let mut failure = self.failure.get_mut().take();
        if failure.is_none() && foreign_calls > 0 {
            failure = Some(BridgeError::ForeignThread);
        }

        ParseReport {
            outcome: ParseOutcome::from_native(native_status, self.is_aborted()),
            statements: self.statements.get(),
            accounts: self.accounts.get(),
            transactions: self.transactions.get(),
            suppressed: self.suppressed.get(),
            foreign_calls,
            failure,
        }
    }
}

impl Drop for Registry<'_> {
    fn drop(&mut self) {
        // Stale user-data pointers must not resolve
        unsafe { std::ptr::write_volatile(&mut self.tag, 0) };
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
