use sea_orm::TransactionTrait;
use serde_json::{Map, Value};

use crate::{
    EngineError, ResultEngine, kv,
    storage::{BUSINESS_NAME_KEY, BUSINESS_PHONE_KEY, KNOWN_KEYS},
};

use super::{Engine, with_tx};

/// Text to store for a restored value.
///
/// Collections given as a string hold the raw stored text (that is how a
/// backup embeds a document that was not valid JSON), so they are written
/// back as is. Everything else is stored as JSON.
fn stored_text(key: &str, value: &Value) -> ResultEngine<String> {
    let is_text_key = key == BUSINESS_NAME_KEY || key == BUSINESS_PHONE_KEY;
    match value {
        Value::String(raw) if !is_text_key => Ok(raw.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}

impl Engine {
    /// Snapshot of every application key.
    ///
    /// Missing and empty keys are `null`; a stored value that is not valid JSON is
    /// embedded as a string.
    pub async fn backup(&self) -> ResultEngine<Value> {
        with_tx!(self, |db_tx| {
            let mut out = Map::new();
            for key in KNOWN_KEYS {
                let value = match kv::load(&db_tx, key).await? {
                    None => Value::Null,
                    Some(raw) if raw.trim().is_empty() => Value::Null,
                    Some(raw) =>serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
                };
                out.insert(key.to_string(), value);
            }
            tracing::info!(keys = out.len(), "backup created");
            Ok(Value::Object(out))
        })
    }

    /// Write the known keys of a backup document back to the store.
    ///
    /// A `null` value clears its key. Unknown keys are skipped. Returns the
    /// number of keys restored; a document with none is rejected and leaves
    /// the store untouched.
    pub async fn restore(&self, json: &str) -> ResultEngine<usize> {
        let document: Value = serde_json::from_str(json)
            .map_err(|err| EngineError::InvalidBackup(err.to_string()))?;
        let Value::Object(entries) = document else {
            return Err(EngineError::InvalidBackup(
                "expected a JSON object".to_string(),
            ));
        };

        let mut known = Vec::new();
        for (key, value) in &entries {
            match KNOWN_KEYS.iter().find(|k| **k == key.as_str()) {
                Some(known_key) => known.push((*known_key, value)),
                None => tracing::warn!(key, "skipping unknown backup key"),
            }
        }
        if known.is_empty() {
            return Err(EngineError::InvalidBackup(
                "no known keys in backup".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            for (key, value) in &known {
                if value.is_null() {
                    kv::remove(&db_tx, key).await?;
                } else {
                    kv::save(&db_tx, key, stored_text(key, value)?).await?;
                }
            }
            tracing::info!(restored = known.len(), "backup restored");
            Ok(known.len())
        })
    }
}
