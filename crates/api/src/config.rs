//! Types for use when configuring peer selection modules.

use crate::*;

/// helper transcode function
fn tc<S: serde::Serialize, D: serde::de::DeserializeOwned>(
    s: &S,
) -> PsResult<D> {
    serde_json::from_str(
        &serde_json::to_string(s)
            .map_err(|e| PsError::other_src("encode", e))?,
    )
    .map_err(|e| PsError::other_src("decode", e))
}

/// Denotes a type used to configure a specific module.
///
/// A module config is a struct with a single field named after the module
/// (camelCase), holding the actual parameters. That field should carry
/// `#[serde(default)]` so that a config file that never mentions the module
/// still loads.
///
/// It is highly recommended that you expose this struct in your module
/// docs to help devs using your module understand how to configure it.
pub trait ModConfig:
    'static
    + Sized
    + Default
    + std::fmt::Debug
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Send
    + Sync
{
}

/// Peer selection configuration.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Config(serde_json::Map<String, serde_json::Value>);

impl Config {
    /// Factories call this from `default_config` to contribute the default
    /// parameters of their module. Refuses to overwrite a module key that
    /// is already present.
    pub fn set_module_config<M: ModConfig>(&mut self, m: &M) -> PsResult<()> {
        let map: serde_json::Map<String, serde_json::Value> = tc(m)?;
        if let Some(k) = map.keys().find(|k| self.0.contains_key(*k)) {
            return Err(PsError::other(format!(
                "Refusing to overwrite conflicting module name: {k}"
            )));
        }
        self.0.extend(map);
        Ok(())
    }

    /// Extract a module config. Note that this config may be loaded from
    /// disk and edited by humans: missing properties take their defaults
    /// and extraneous properties are ignored.
    pub fn get_module_config<M: ModConfig>(&self) -> PsResult<M> {
        tc(&self.0)
    }
}
