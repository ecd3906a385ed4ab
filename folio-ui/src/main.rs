//! Folio Dashboard
//!
//! Browser side of the portfolio dashboard, compiled to WebAssembly.
//!
//! The page ships two chart regions and an embedded JSON payload. Nothing is
//! drawn until a region is about to scroll into view; only then is the chart
//! library imported and the charts constructed, once.

mod bootstrap;
mod charts;
mod dom;
mod format;
mod payload;
mod trigger;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    wasm_bindgen_futures::spawn_local(bootstrap::start());
}
