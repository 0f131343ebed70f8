//! Replay engine
//!
//! Safe wrapper around the C replay engine in `native/ofx_replay.c`. Records
//! are queued as native structs and delivered to the trampolines from C,
//! by value, in the order they were pushed, the same way libofx delivers
//! them while walking a document.

use super::NativeEngine;
use crate::native::*;
use crate::records::{Account, Entity, Statement, Transaction};
use crate::types::{BridgeError, Result};
use std::os::raw::{c_int, c_void};

/// In-process native engine fed with records instead of an OFX file
pub struct ReplayEngine {
    raw: *mut OfxbReplay,
}

impl ReplayEngine {
    pub fn new() -> Result<Self> {
        let raw = unsafe { ofxb_replay_new() };
        if raw.is_null() {
            return Err(BridgeError::EngineSetup(
                "failed to allocate replay engine".to_string(),
            ));
        }
        Ok(Self { raw })
    }

    /// Build an engine that replays `entities` in order
    pub fn from_entities<'e, I>(entities: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'e Entity>,
    {
        let mut engine = Self::new()?;
        for entity in entities {
            engine.push(entity)?;
        }
        Ok(engine)
    }

    pub fn push(&mut self, entity: &Entity) -> Result<()> {
        match entity {
            Entity::Statement(s) => self.push_statement(s),
            Entity::Account(a) => self.push_account(a),
            Entity::Transaction(t) => self.push_transaction(t),
        }
    }

    pub fn push_statement(&mut self, statement: &Statement) -> Result<()> {
        let raw = OfxbStatement::try_from(statement)?;
        self.push_raw_statement(&raw)
    }

    pub fn push_account(&mut self, account: &Account) -> Result<()> {
        let raw = OfxbAccount::try_from(account)?;
        self.push_raw_account(&raw)
    }

    pub fn push_transaction(&mut self, transaction: &Transaction) -> Result<()> {
        let raw = OfxbTransaction::try_from(transaction)?;
        self.push_raw_transaction(&raw)
    }

    /// Queue a native record as-is, including malformed ones
    pub fn push_raw_statement(&mut self, record: &OfxbStatement) -> Result<()> {
        check_push(unsafe { ofxb_replay_push_statement(self.raw, record) })
    }

    pub fn push_raw_account(&mut self, record: &OfxbAccount) -> Result<()> {
        check_push(unsafe { ofxb_replay_push_account(self.raw, record) })
    }

    pub fn push_raw_transaction(&mut self, record: &OfxbTransaction) -> Result<()> {
        check_push(unsafe { ofxb_replay_push_transaction(self.raw, record) })
    }

    /// Make the run stop with `status` once `deliveries` records went out
    ///
    /// `deliveries == len()` fails after the last record; anything larger is
    /// never reached and the run completes normally.
    pub fn fail_after(&mut self, deliveries: usize, status: c_int) {
        unsafe { ofxb_replay_fail_after(self.raw, deliveries, status) };
    }

    /// Number of queued records
    pub fn len(&self) -> usize {
        unsafe { ofxb_replay_len(self.raw) }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_push(rc: c_int) -> Result<()> {
    if rc == 0 {
        Ok(())
    } else {
        Err(BridgeError::EngineSetup(
            "replay engine could not queue record".to_string(),
        ))
    }
}

impl NativeEngine for ReplayEngine {
    fn name(&self) -> &str {
        "replay"
    }

    fn run(&mut self, trampolines: &Trampolines, user_data: *mut c_void) -> Result<c_int> {
        log::debug!("Replaying {} records", self.len());
        Ok(unsafe { ofxb_replay_run(self.raw, trampolines, user_data) })
    }
}

impl Drop for ReplayEngine {
    fn drop(&mut self) {
        unsafe { ofxb_replay_free(self.raw) };
        log::debug!("Replay engine released");
    }
}

// The handle is owned exclusively; the C side keeps no global state
unsafe impl Send for ReplayEngine {}
