use wasm_bindgen::prelude::*;
use web_sys::{console, window};

pub mod components;
pub mod geojson;
pub mod state;

/// Entry point for the WebAssembly module
/// This function is called from JavaScript to initialize and mount the uploader
#[wasm_bindgen]
pub fn main() {
    // Set up panic hook for better error reporting in the browser console
    console_error_panic_hook::set_once();

    console::log_1(&"GeoJSON uploader module initialized".into());

    if let Err(error) = create_app() {
        console::error_1(&format!("Failed to create app: {:?}", error).into());
        return;
    }

    console::log_1(&"Uploader mounted to DOM".into());
}

/// Alternative entry point using wasm-bindgen start attribute
#[wasm_bindgen(start)]
pub fn start() {
    main();
}

/// Find the app container and mount the uploader into it
fn create_app() -> Result<(), JsValue> {
    let window = window().ok_or("No global window exists")?;
    let document = window.document().ok_or("Should have a document on window")?;

    let container = document
        .get_element_by_id("app")
        .ok_or("Should have an element with id 'app'")?;

    components::mount(&document, &container)
}
