//! Native record layout and FFI declarations
//!
//! Mirrors `native/ofx_bridge.h` field for field. These are the shapes the
//! native engines hand to the trampolines by value; nothing in here may be
//! kept past the callback that received it.

use std::os::raw::{c_char, c_double, c_int, c_void};

/// Callback status: keep parsing
pub const OFXB_CONTINUE: c_int = 0;
/// Callback status: stop parsing now
pub const OFXB_ABORT: c_int = 1;

/// Aggregate engine status: document fully processed
pub const OFXB_PARSE_OK: c_int = 0;
/// Aggregate engine status: a callback stopped the run
pub const OFXB_PARSE_ABORTED: c_int = 1;
/// Aggregate engine status: generic parse failure
pub const OFXB_PARSE_ERROR: c_int = 2;

pub const ACCOUNT_ID_LEN: usize = 57;
pub const ACCOUNT_NAME_LEN: usize = 255;
pub const ACCTID_LEN: usize = 23;
pub const BANKID_LEN: usize = 10;
pub const BRANCHID_LEN: usize = 23;
pub const BROKERID_LEN: usize = 23;
pub const CURRENCY_LEN: usize = 4;
pub const MARKETING_INFO_LEN: usize = 361;
pub const FITID_LEN: usize = 256;
pub const NAME_LEN: usize = 97;
pub const MEMO_LEN: usize = 391;
pub const CHECK_NUMBER_LEN: usize = 13;
pub const REFERENCE_NUMBER_LEN: usize = 33;
pub const PAYEE_ID_LEN: usize = 37;
pub const SVRTID_LEN: usize = 37;
pub const UNIQUE_ID_LEN: usize = 33;
pub const UNIQUE_ID_TYPE_LEN: usize = 11;
pub const SECNAME_LEN: usize = 121;
pub const TICKER_LEN: usize = 33;
pub const SECURITY_MEMO_LEN: usize = 391;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OfxbStatement {
    pub account_id: [c_char; ACCOUNT_ID_LEN],
    pub account_id_valid: c_int,
    pub currency: [c_char; CURRENCY_LEN],
    pub currency_valid: c_int,
    pub ledger_balance: c_double,
    pub ledger_balance_valid: c_int,
    pub ledger_balance_date: i64,
    pub ledger_balance_date_valid: c_int,
    pub available_balance: c_double,
    pub available_balance_valid: c_int,
    pub available_balance_date: i64,
    pub available_balance_date_valid: c_int,
    pub date_start: i64,
    pub date_start_valid: c_int,
    pub date_end: i64,
    pub date_end_valid: c_int,
    pub marketing_info: [c_char; MARKETING_INFO_LEN],
    pub marketing_info_valid: c_int,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OfxbAccount {
    pub account_id: [c_char; ACCOUNT_ID_LEN],
    pub account_id_valid: c_int,
    pub account_name: [c_char; ACCOUNT_NAME_LEN],
    pub account_name_valid: c_int,
    pub account_type: c_int,
    pub account_type_valid: c_int,
    pub currency: [c_char; CURRENCY_LEN],
    pub currency_valid: c_int,
    pub account_number: [c_char; ACCTID_LEN],
    pub account_number_valid: c_int,
    pub bank_id: [c_char; BANKID_LEN],
    pub bank_id_valid: c_int,
    pub broker_id: [c_char; BROKERID_LEN],
    pub broker_id_valid: c_int,
    pub branch_id: [c_char; BRANCHID_LEN],
    pub branch_id_valid: c_int,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OfxbSecurity {
    pub unique_id: [c_char; UNIQUE_ID_LEN],
    pub unique_id_valid: c_int,
    pub unique_id_type: [c_char; UNIQUE_ID_TYPE_LEN],
    pub unique_id_type_valid: c_int,
    pub secname: [c_char; SECNAME_LEN],
    pub secname_valid: c_int,
    pub ticker: [c_char; TICKER_LEN],
    pub ticker_valid: c_int,
    pub unit_price: c_double,
    pub unit_price_valid: c_int,
    pub date_unit_price: i64,
    pub date_unit_price_valid: c_int,
    pub currency: [c_char; CURRENCY_LEN],
    pub currency_valid: c_int,
    pub memo: [c_char; SECURITY_MEMO_LEN],
    pub memo_valid: c_int,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OfxbTransaction {
    pub account_id: [c_char; ACCOUNT_ID_LEN],
    pub account_id_valid: c_int,
    pub fi_id: [c_char; FITID_LEN],
    pub fi_id_valid: c_int,
    pub fi_id_corrected: [c_char; FITID_LEN],
    pub fi_id_corrected_valid: c_int,
    pub fi_id_correction_action: c_int,
    pub fi_id_correction_action_valid: c_int,
    pub transaction_type: c_int,
    pub transaction_type_valid: c_int,
    pub investment_type: c_int,
    pub investment_type_valid: c_int,
    pub standard_industrial_code: i64,
    pub standard_industrial_code_valid: c_int,
    pub date_posted: i64,
    pub date_posted_valid: c_int,
    pub date_initiated: i64,
    pub date_initiated_valid: c_int,
    pub date_funds_available: i64,
    pub date_funds_available_valid: c_int,
    pub date_payout: i64,
    pub date_payout_valid: c_int,
    pub amount: c_double,
    pub amount_valid: c_int,
    pub units: c_double,
    pub units_valid: c_int,
    pub unit_price: c_double,
    pub unit_price_valid: c_int,
    pub fees: c_double,
    pub fees_valid: c_int,
    pub commission: c_double,
    pub commission_valid: c_int,
    pub old_units: c_double,
    pub old_units_valid: c_int,
    pub new_units: c_double,
    pub new_units_valid: c_int,
    pub accrued_interest: c_double,
    pub accrued_interest_valid: c_int,
    pub load: c_double,
    pub load_valid: c_int,
    pub markup: c_double,
    pub markup_valid: c_int,
    pub markdown: c_double,
    pub markdown_valid: c_int,
    pub withholding: c_double,
    pub withholding_valid: c_int,
    pub taxes: c_double,
    pub taxes_valid: c_int,
    pub penalty: c_double,
    pub penalty_valid: c_int,
    pub name: [c_char; NAME_LEN],
    pub name_valid: c_int,
    pub memo: [c_char; MEMO_LEN],
    pub memo_valid: c_int,
    pub check_number: [c_char; CHECK_NUMBER_LEN],
    pub check_number_valid: c_int,
    pub reference_number: [c_char; REFERENCE_NUMBER_LEN],
    pub reference_number_valid: c_int,
    pub payee_id: [c_char; PAYEE_ID_LEN],
    pub payee_id_valid: c_int,
    pub server_transaction_id: [c_char; SVRTID_LEN],
    pub server_transaction_id_valid: c_int,
    pub security: OfxbSecurity,
    pub security_valid: c_int,
}

macro_rules! zeroed_default {
    ($($ty:ty),*) => {
        $(
            impl Default for $ty {
                fn default() -> Self {
                    // SAFETY: plain C data; all-zero is "every field absent".
                    unsafe { std::mem::zeroed() }
                }
            }
        )*
    };
}

zeroed_default!(OfxbStatement, OfxbAccount, OfxbSecurity, OfxbTransaction);

pub type StatementCallback = unsafe extern "C" fn(OfxbStatement, *mut c_void) -> c_int;
pub type AccountCallback = unsafe extern "C" fn(OfxbAccount, *mut c_void) -> c_int;
pub type TransactionCallback = unsafe extern "C" fn(OfxbTransaction, *mut c_void) -> c_int;

/// Callback table handed to a native engine (`struct ofxb_callbacks`)
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Trampolines {
    pub statement: Option<StatementCallback>,
    pub account: Option<AccountCallback>,
    pub transaction: Option<TransactionCallback>,
}

/// Opaque replay engine handle
#[repr(C)]
pub struct OfxbReplay {
    _private: [u8; 0],
}

extern "C" {
    pub fn ofxb_replay_new() -> *mut OfxbReplay;
    pub fn ofxb_replay_free(replay: *mut OfxbReplay);
    pub fn ofxb_replay_push_statement(replay: *mut OfxbReplay, record: *const OfxbStatement) -> c_int;
    pub fn ofxb_replay_push_account(replay: *mut OfxbReplay, record: *const OfxbAccount) -> c_int;
    pub fn ofxb_replay_push_transaction(
        replay: *mut OfxbReplay,
        record: *const OfxbTransaction,
    ) -> c_int;
    pub fn ofxb_replay_fail_after(replay: *mut OfxbReplay, deliveries: usize, status: c_int);
    pub fn ofxb_replay_len(replay: *const OfxbReplay) -> usize;
    pub fn ofxb_replay_run(
        replay: *mut OfxbReplay,
        callbacks: *const Trampolines,
        user_data: *mut c_void,
    ) -> c_int;
}

#[cfg(feature = "libofx")]
extern "C" {
    pub fn ofxb_libofx_proc_file(
        path: *const c_char,
        callbacks: *const Trampolines,
        user_data: *mut c_void,
        native_messages: c_int,
    ) -> c_int;
}
