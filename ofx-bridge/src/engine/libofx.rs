//! libofx engine
//!
//! Parses OFX files with the system libofx through the C adapter in
//! `native/libofx_adapter.c`.

use super::NativeEngine;
use crate::native::{ofxb_libofx_proc_file, Trampolines};
use crate::types::{BridgeError, Result};
use std::ffi::CString;
use std::os::raw::{c_int, c_void};
use std::path::{Path, PathBuf};

/// Native engine backed by libofx
pub struct LibOfxEngine {
    path: PathBuf,
    native_messages: bool,
}

impl LibOfxEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            native_messages: false,
        }
    }

    /// Builder method: let libofx print its own diagnostics
    pub fn with_native_messages(mut self, enabled: bool) -> Self {
        self.native_messages = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NativeEngine for LibOfxEngine {
    fn name(&self) -> &str {
        "libofx"
    }

    fn run(&mut self, trampolines: &Trampolines, user_data: *mut c_void) -> Result<c_int> {
        log::info!("Parsing OFX file: {:?}", self.path);

        if !self.path.exists() {
            return Err(BridgeError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("OFX file not found: {:?}", self.path),
            )));
        }

        let path_str = self.path.to_str().ok_or_else(|| {
            BridgeError::EngineSetup(format!("Invalid UTF-8 in path: {:?}", self.path))
        })?;
        let c_path = CString::new(path_str).map_err(|e| {
            BridgeError::EngineSetup(format!("Failed to convert path to C string: {}", e))
        })?;

        let status = unsafe {
            ofxb_libofx_proc_file(
                c_path.as_ptr(),
                trampolines,
                user_data,
                c_int::from(self.native_messages),
            )
        };
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parse;
    use crate::registry::Collector;

    #[test]
    fn test_ofx_file_not_found() {
        let mut engine = LibOfxEngine::new("nonexistent.ofx");
        let mut collector = Collector::new();
        let result = parse(&mut engine, &mut collector);
        assert!(matches!(result, Err(BridgeError::IoError(_))));
    }
}
