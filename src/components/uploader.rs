//! Intake controller: owns the selection state, wires the file input to the
//! reader, and re-renders the error slot, summary and submit button after
//! every transition.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, Document, Element, FileReader, HtmlButtonElement, HtmlInputElement, ProgressEvent};

use super::progress_bar;
use crate::state::{ReadId, Selection};

type SharedSelection = Rc<RefCell<Selection>>;

const FORM_HTML: &str = r#"
    <form id="upload-form" action="" method="POST" class="upload-form">
        <label class="upload-title">Upload Geo JSON File</label>

        <input type="file" name="file" id="file-input" class="sr-only" accept=".geojson,application/json">
        <label for="file-input" class="drop-zone">
            <div>
                <span class="drop-zone-headline">Drop files here</span>
                <span class="drop-zone-or">Or</span>
                <span class="browse-btn">Browse</span>
            </div>
        </label>
        <p id="upload-error" class="upload-error"></p>

        <div id="upload-summary"></div>

        <button type="submit" id="upload-btn" class="upload-btn" disabled>Upload</button>
    </form>
"#;

/// Mount the uploader into `container` and attach its event listeners.
pub fn mount(document: &Document, container: &Element) -> Result<(), JsValue> {
    container.set_inner_html(FORM_HTML);

    let state: SharedSelection = Rc::new(RefCell::new(Selection::new()));
    wire_file_input(document, &state)?;
    wire_remove(document, &state)?;
    render(document, &state.borrow());

    Ok(())
}

fn wire_file_input(document: &Document, state: &SharedSelection) -> Result<(), JsValue> {
    let input = document
        .get_element_by_id("file-input")
        .ok_or("should have an element with id 'file-input'")?;

    let state = Rc::clone(state);
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        if let Some(target) = event.target() {
            if let Ok(input) = target.dyn_into::<HtmlInputElement>() {
                if let Some(files) = input.files() {
                    // Zero selected files is a no-op.
                    if let Some(file) = files.get(0) {
                        on_file_chosen(&state, file);
                    }
                }
            }
        }
    }) as Box<dyn FnMut(_)>);

    input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
    closure.forget(); // Keep the closure alive

    Ok(())
}

fn wire_remove(document: &Document, state: &SharedSelection) -> Result<(), JsValue> {
    let summary = document
        .get_element_by_id("upload-summary")
        .ok_or("should have an element with id 'upload-summary'")?;

    let state = Rc::clone(state);
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let on_remove_control = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .and_then(|element| element.closest("[data-remove]").ok().flatten())
            .is_some();
        if !on_remove_control {
            return;
        }

        state.borrow_mut().remove();

        if let Some(document) = web_sys::window().and_then(|window| window.document()) {
            // Clear the native input so re-choosing the same file fires
            // another change event.
            if let Some(input) = document
                .get_element_by_id("file-input")
                .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value("");
            }
            render(&document, &state.borrow());
        }
    }) as Box<dyn FnMut(_)>);

    summary.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget(); // Keep the closure alive

    Ok(())
}

fn on_file_chosen(state: &SharedSelection, file: web_sys::File) {
    let read_id = state.borrow_mut().begin(&file.name());
    render_current(state);

    let read_id = match read_id {
        Some(id) => id,
        None => return, // rejected extension, no read
    };

    console::log_1(&format!("Reading file: {}", file.name()).into());
    if let Err(error) = start_read(state, file, read_id) {
        console::error_1(&format!("Failed to start file read: {:?}", error).into());
        state.borrow_mut().read_failed(read_id);
        render_current(state);
    }
}

/// Start an asynchronous text read tagged with `read_id`. Progress lands via
/// the onprogress closure; the terminal callback is wrapped in a promise and
/// awaited on the event loop, as completions must not run re-entrantly.
fn start_read(state: &SharedSelection, file: web_sys::File, read_id: ReadId) -> Result<(), JsValue> {
    let reader = FileReader::new()?;

    let progress_state = Rc::clone(state);
    let onprogress = Closure::wrap(Box::new(move |event: ProgressEvent| {
        if event.length_computable() {
            progress_state
                .borrow_mut()
                .progress(read_id, event.loaded(), event.total());
            render_current(&progress_state);
        }
    }) as Box<dyn FnMut(_)>);
    reader.set_onprogress(Some(onprogress.as_ref().unchecked_ref()));
    onprogress.forget();

    let reader_for_promise = reader.clone();
    let promise = Promise::new(&mut |resolve, reject| {
        let reader_for_load = reader_for_promise.clone();
        let reject_for_load = reject.clone();
        let onload = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            match reader_for_load.result() {
                Ok(result) => {
                    let _ = resolve.call1(&JsValue::NULL, &result);
                }
                Err(error) => {
                    let _ = reject_for_load.call1(&JsValue::NULL, &error);
                }
            }
        }) as Box<dyn FnMut(_)>);
        reader_for_promise.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let onerror = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("file read error"));
        }) as Box<dyn FnMut(_)>);
        reader_for_promise.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    });

    let state = Rc::clone(state);
    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(content) => {
                let text = content.as_string().unwrap_or_default();
                state.borrow_mut().resolve(read_id, &text);
            }
            Err(error) => {
                console::error_1(&format!("File read failed: {:?}", error).into());
                state.borrow_mut().read_failed(read_id);
            }
        }
        render_current(&state);
    });

    reader.read_as_text(&file)?;
    Ok(())
}

fn render_current(state: &SharedSelection) {
    if let Some(document) = web_sys::window().and_then(|window| window.document()) {
        render(&document, &state.borrow());
    }
}

/// Project the selection state onto the three dynamic parts of the form.
fn render(document: &Document, selection: &Selection) {
    if let Some(slot) = document.get_element_by_id("upload-error") {
        slot.set_text_content(selection.error_message());
    }

    if let Some(slot) = document.get_element_by_id("upload-summary") {
        match (selection.show_summary(), selection.file_name()) {
            (true, Some(name)) => {
                slot.set_inner_html(&progress_bar::render(name, selection.progress_pct()));
            }
            _ => slot.set_inner_html(""),
        }
    }

    if let Some(button) = document
        .get_element_by_id("upload-btn")
        .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
    {
        button.set_disabled(!selection.submit_enabled());
    }
}
