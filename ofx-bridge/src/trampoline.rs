//! C-ABI trampolines
//!
//! The three functions a native engine calls once per discovered entity.
//! Each one resolves the registry behind the user-data pointer, converts the
//! by-value record into an owned host record, dispatches it and returns the
//! host's decision using the engine's convention (`0` continue, `1` abort).
//!
//! No panic ever crosses back into native code: anything that unwinds is
//! caught here and turned into an abort. A null or foreign user-data pointer
//! is a binding bug and terminates the process.

use crate::native::{OfxbAccount, OfxbStatement, OfxbTransaction, Trampolines, OFXB_ABORT};
use crate::records::{Account, EntityKind, Statement, Transaction};
use crate::registry::{HostCallbacks, Registry};
use crate::types::{Result, Status};
use std::os::raw::{c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

impl Trampolines {
    /// Table pointing at this crate's trampolines
    pub fn bridge() -> Self {
        Self {
            statement: Some(ofxb_statement_trampoline),
            account: Some(ofxb_account_trampoline),
            transaction: Some(ofxb_transaction_trampoline),
        }
    }
}

/// Statement callback for native engines
///
/// # Safety
/// `user_data` must be the pointer returned by [`Registry::user_data`] for a
/// registry that is alive for the duration of this call.
pub unsafe extern "C" fn ofxb_statement_trampoline(
    record: OfxbStatement,
    user_data: *mut c_void,
) -> c_int {
    bounce(
        EntityKind::Statement,
        user_data,
        || Statement::try_from(&record),
        |host, statement| host.statement(statement),
    )
}

/// Account callback for native engines
///
/// # Safety
/// Same contract as [`ofxb_statement_trampoline`].
pub unsafe extern "C" fn ofxb_account_trampoline(
    record: OfxbAccount,
    user_data: *mut c_void,
) -> c_int {
    bounce(
        EntityKind::Account,
        user_data,
        || Account::try_from(&record),
        |host, account| host.account(account),
    )
}

/// Transaction callback for native engines
///
/// # Safety
/// Same contract as [`ofxb_statement_trampoline`].
pub unsafe extern "C" fn ofxb_transaction_trampoline(
    record: OfxbTransaction,
    user_data: *mut c_void,
) -> c_int {
    bounce(
        EntityKind::Transaction,
        user_data,
        || Transaction::try_from(&record),
        |host, transaction| host.transaction(transaction),
    )
}

unsafe fn bounce<T>(
    kind: EntityKind,
    user_data: *mut c_void,
    convert: impl FnOnce() -> Result<T>,
    call: impl FnOnce(&mut dyn HostCallbacks, T) -> Status,
) -> c_int {
    let Some(registry) = Registry::from_user_data(user_data) else {
        log::error!(
            "{} trampoline received invalid user data {:p}; aborting process",
            kind,
            user_data
        );
        std::process::abort();
    };

    match catch_unwind(AssertUnwindSafe(|| registry.deliver(kind, convert, call))) {
        Ok(status) => status.to_native(),
        Err(_) => {
            log::error!("Panic inside {} trampoline, aborting parse", kind);
            OFXB_ABORT
        }
    }
}
