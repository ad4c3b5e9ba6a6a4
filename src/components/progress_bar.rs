//! Stateless summary view: file name, remove control, progress bar.
//!
//! Pure function of its inputs; the parent decides whether it is shown at
//! all and owns the remove behavior (the button only carries the
//! `data-remove` marker the parent's click handler looks for).

const REMOVE_ICON: &str = r##"<svg width="10" height="10" viewBox="0 0 10 10" fill="none" xmlns="http://www.w3.org/2000/svg"><path fill-rule="evenodd" clip-rule="evenodd" d="M0.28 0.28a0.953 0.953 0 0 1 1.35 0l8.09 8.09a0.953 0.953 0 1 1-1.35 1.35L0.28 1.63a0.953 0.953 0 0 1 0-1.35Z" fill="currentColor"/><path fill-rule="evenodd" clip-rule="evenodd" d="M0.28 9.72a0.953 0.953 0 0 1 0-1.35L8.37 0.28a0.953 0.953 0 1 1 1.35 1.35L1.63 9.72a0.953 0.953 0 0 1-1.35 0Z" fill="currentColor"/></svg>"##;

/// Render the file summary with its fill width at `progress` percent.
pub fn render(file_name: &str, progress: u8) -> String {
    format!(
        r#"<div class="file-summary">
            <div class="file-summary-header">
                <span class="file-name">{name}</span>
                <button type="button" class="remove-btn" data-remove aria-label="Remove file">{icon}</button>
            </div>
            <div class="progress-track">
                <div class="progress-fill" style="width: {progress}%"></div>
            </div>
        </div>"#,
        name = escape(file_name),
        icon = REMOVE_ICON,
        progress = progress,
    )
}

// File names come straight from the picker and land in inner_html.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
