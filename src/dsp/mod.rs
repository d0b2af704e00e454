//! DSP core: the per-sample mixing path.
//!
//! Everything here is synchronous and allocation-free per tick once the
//! mixer is built. The same code serves the WASM bindings and the offline
//! WAV renderer.

pub mod channel;
pub mod master;
pub mod mixer;
pub mod renderer;
pub mod solo;
pub mod toggle;
pub mod trigger;
