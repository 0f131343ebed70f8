//! Input file handling
//!
//! Picks the engine for a file from its extension: JSON record fixtures are
//! replayed through the C replay engine, OFX/QFX documents go to libofx when
//! the `libofx` feature is enabled.

use anyhow::{bail, Context, Result};
use ofx_bridge::{Entity, NativeEngine, ReplayEngine};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open the engine that can process `path`
pub fn open_engine(path: &Path, native_messages: bool) -> Result<Box<dyn NativeEngine>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let entities = load_fixture(path)?;
            let engine = ReplayEngine::from_entities(&entities)
                .with_context(|| format!("Failed to stage records from {:?}", path))?;
            Ok(Box::new(engine))
        }
        "ofx" | "qfx" => open_ofx(path, native_messages),
        other => bail!("Unsupported input format '{}': {:?}", other, path),
    }
}

/// Read a JSON array of tagged entities
pub fn load_fixture(path: &Path) -> Result<Vec<Entity>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open fixture: {:?}", path))?;
    let entities: Vec<Entity> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse fixture: {:?}", path))?;
    log::debug!("Loaded {} records from {:?}", entities.len(), path);
    Ok(entities)
}

#[cfg(feature = "libofx")]
fn open_ofx(path: &Path, native_messages: bool) -> Result<Box<dyn NativeEngine>> {
    let engine = ofx_bridge::LibOfxEngine::new(path).with_native_messages(native_messages);
    Ok(Box::new(engine))
}

#[cfg(not(feature = "libofx"))]
fn open_ofx(path: &Path, _native_messages: bool) -> Result<Box<dyn NativeEngine>> {
    bail!(
        "OFX input {:?} requires building with the `libofx` feature",
        path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fixture_loads_into_replay_engine() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"kind": "account", "account_id": "1", "account_type": "checking", "currency": "USD"}},
                {{"kind": "transaction", "amount": -3.25, "name": "Bus"}}
            ]"#
        )
        .unwrap();

        let entities = load_fixture(file.path()).unwrap();
        assert_eq!(entities.len(), 2);
        let engine = open_engine(file.path(), false).unwrap();
        assert_eq!(engine.name(), "replay");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = open_engine(Path::new("statement.csv"), false).err().unwrap();
        assert!(err.to_string().contains("Unsupported input format"));
    }

    #[test]
    fn test_malformed_fixture_reports_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"kind": "invoice"}}]"#).unwrap();
        let err = load_fixture(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse fixture"));
    }
}
