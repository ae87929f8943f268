// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Airways Disruption Simulator

pub mod types;
pub mod error;
pub mod geometry;
pub mod network;
pub mod registry;
pub mod scenario;
pub mod traffic;
pub mod session;
pub mod stats;
pub mod config;
pub mod presets;
pub mod logging;

pub use types::*;
pub use config::SessionConfig;
pub use error::{CommandError, ConfigError, EngineError};
pub use network::Topology;
pub use scenario::ScenarioTrack;
pub use session::{AirwaysSession, Command, NodeSpec};

use serde::Serialize;
use wasm_bindgen::prelude::*;

// Plain objects instead of ES Maps; `CommandResult` flattens its status.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).unwrap_or(JsValue::NULL)
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl AirwaysSession {
    /// Accepts a partial `SessionConfig` object, or nothing for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<AirwaysSession, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
        logging::init(config.level());

        Ok(AirwaysSession::with_config(config))
    }

    /// Runs a JSON-shaped command, e.g. `{type: "disrupt", track: "routes"}`.
    #[wasm_bindgen(js_name = dispatch)]
    pub fn dispatch_js(&mut self, command: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<Command>(command) {
            Ok(command) => to_js(&self.dispatch(command)),
            Err(e) => {
                log::warn!("malformed command: {}", e);
                to_js(&CommandResult {
                    status: CommandStatus::NoOp { reason: format!("malformed command: {}", e) },
                    narration: None,
                    superseded: None,
                    snapshot: self.snapshot(),
                })
            }
        }
    }

    pub fn tick(&mut self, dt: f64) -> JsValue {
        let frame = self.tick_core(dt);
        to_js(&frame)
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot_js(&self) -> JsValue {
        to_js(&self.snapshot())
    }

    pub fn stats(&self) -> JsValue {
        to_js(&self.stats_core())
    }

    pub fn set_normal(&mut self) -> JsValue {
        let result = self.dispatch(Command::SetTopology { topology: presets::normal_topology() });
        to_js(&result)
    }

    pub fn set_hub(&mut self) -> JsValue {
        let topology = presets::hub_topology(&self.config.hub);
        to_js(&self.dispatch(Command::SetTopology { topology }))
    }

    pub fn disrupt_routes(&mut self) -> JsValue {
        to_js(&self.dispatch(Command::Disrupt { track: ScenarioTrack::Routes }))
    }

    pub fn disrupt_airports(&mut self) -> JsValue {
        to_js(&self.dispatch(Command::Disrupt { track: ScenarioTrack::Airports }))
    }

    #[wasm_bindgen(js_name = correct)]
    pub fn correct_js(&mut self) -> JsValue {
        to_js(&self.dispatch(Command::Correct))
    }

    pub fn add_airport(&mut self, code: &str) -> JsValue {
        to_js(&self.dispatch(Command::AddNode { node: NodeSpec::Code(code.to_string()) }))
    }

    pub fn zoom(&mut self, zoom: f64) {
        self.set_zoom(zoom);
    }

    /// Restart from the configuration the session was created with.
    pub fn reset(&mut self) {
        *self = AirwaysSession::with_config(self.config.clone());
    }
}
