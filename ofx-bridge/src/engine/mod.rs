//! Native engines and the parse entry point
//!
//! A [`NativeEngine`] owns one native parser instance. [`parse`] wires it to
//! the trampolines through a fresh [`Registry`] and folds everything the
//! registry observed into a [`ParseReport`].

use crate::native::Trampolines;
use crate::registry::{HostCallbacks, Registry};
use crate::types::{ParseReport, Result};
use std::os::raw::{c_int, c_void};

pub mod replay;
#[cfg(feature = "libofx")]
pub mod libofx;

pub use replay::ReplayEngine;
#[cfg(feature = "libofx")]
pub use libofx::LibOfxEngine;

/// Common trait for native parsing engines
///
/// `run` must call the given trampolines synchronously, on the calling
/// thread, passing `user_data` through untouched, and must not keep either
/// of them after it returns.
pub trait NativeEngine {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Drive the native parse and return its aggregate status
    fn run(&mut self, trampolines: &Trampolines, user_data: *mut c_void) -> Result<c_int>;
}

/// Parse one document, delivering every record to `callbacks`
///
/// Blocks until the engine returns. Records delivered before an abort stay
/// with the host accumulator.
///
/// # Example
/// ```no_run
/// use ofx_bridge::{parse, Collector, ReplayEngine};
///
/// let mut engine = ReplayEngine::new().unwrap();
/// let mut collector = Collector::new();
/// let report = parse(&mut engine, &mut collector).unwrap();
/// println!("{} transactions", report.transactions);
/// ```
pub fn parse<E>(engine: &mut E, callbacks: &mut dyn HostCallbacks) -> Result<ParseReport>
where
    E: NativeEngine + ?Sized,
{
    log::info!("Starting {} parse", engine.name());

    let registry = Registry::new(callbacks);
    let trampolines = Trampolines::bridge();
    let status = engine.run(&trampolines, registry.user_data())?;
    let report = registry.into_report(status);

    log::info!(
        "{} parse {}: {} statements, {} accounts, {} transactions",
        engine.name(),
        report.outcome,
        report.statements,
        report.accounts,
        report.transactions
    );
    if let Some(failure) = &report.failure {
        log::warn!("Recorded failure: {}", failure);
    }

    Ok(report)
}
