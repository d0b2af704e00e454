pub mod config;
pub mod dsp;
pub mod error;

pub use crate::config::MixerConfig;
pub use crate::dsp::mixer::{MixerCv, MixerInput, MixerOutput};
pub use crate::error::MixerError;

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the mixercv-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse a JSON config; an empty string means the stock layout.
fn parse_config(config_json: &str) -> Result<MixerConfig, MixerError> {
    if config_json.trim().is_empty() {
        Ok(MixerConfig::default())
    } else {
        MixerConfig::from_json(config_json)
    }
}

/// WASM-exposed mixer handle, driven one tick at a time from an AudioWorklet.
#[wasm_bindgen]
pub struct WasmMixer {
    mixer: MixerCv,
    frame: MixerInput,
    output: MixerOutput,
}

#[wasm_bindgen]
impl WasmMixer {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmMixer, JsValue> {
        let config = parse_config(config_json).map_err(js_err)?;
        let frame = MixerInput::from_config(&config);
        let mixer = MixerCv::new(config).map_err(js_err)?;
        Ok(WasmMixer {
            mixer,
            frame,
            output: MixerOutput::default(),
        })
    }

    #[wasm_bindgen(js_name = channelCount)]
    pub fn channel_count(&self) -> usize {
        self.mixer.channel_count()
    }

    /// Process one tick. Takes a `MixerInput`-shaped object, returns a
    /// `MixerOutput`-shaped object.
    pub fn process(&mut self, frame: JsValue) -> Result<JsValue, JsValue> {
        self.frame = serde_wasm_bindgen::from_value(frame).map_err(js_err)?;
        self.mixer.config().clamp_controls(&mut self.frame);
        self.mixer
            .process_into(&self.frame, &mut self.output)
            .map_err(js_err)?;
        serde_wasm_bindgen::to_value(&self.output).map_err(js_err)
    }

    pub fn reset(&mut self) {
        self.mixer.reset();
    }
}

/// WASM-exposed: render a list of frames to a WAV byte array.
#[wasm_bindgen]
pub fn render_mix_wav(config_json: &str, frames: JsValue, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let config = parse_config(config_json).map_err(js_err)?;
    let frames: Vec<MixerInput> = serde_wasm_bindgen::from_value(frames).map_err(js_err)?;
    dsp::renderer::render_wav(&config, &frames, sample_rate).map_err(js_err)
}
