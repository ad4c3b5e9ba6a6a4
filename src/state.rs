use serde_json::Value;

use crate::geojson;

/// Lifecycle of the single active file selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Reading,
    Validated,
    Error,
}

/// The two failures a selection attempt can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    /// File suffix was neither `geojson` nor `json`; no read was attempted.
    Extension,
    /// The file could not be read, parsed, or did not have the
    /// FeatureCollection shape.
    Content,
}

impl UploadError {
    pub fn message(self) -> &'static str {
        match self {
            UploadError::Extension => "Please upload a valid GeoJSON file.",
            UploadError::Content => "Invalid GeoJSON file content.",
        }
    }
}

/// Token tying a `FileReader` operation to the selection that started it.
///
/// Completions carrying a token other than the live one are discarded, so a
/// read overtaken by a newer selection can never clobber its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadId(u64);

/// When the submit control is enabled.
///
/// `AnySelection` mirrors the source behavior: submit lights up as soon as a
/// selection exists, even if validation later fails. `ValidatedOnly` is the
/// stricter alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    #[default]
    AnySelection,
    ValidatedOnly,
}

/// State record for the intake controller.
///
/// All mutation goes through the transition methods below; the DOM layer only
/// reads the accessors when rendering.
#[derive(Debug)]
pub struct Selection {
    phase: Phase,
    file_name: Option<String>,
    document: Option<Value>,
    error: Option<UploadError>,
    progress: u8,
    has_selection: bool,
    policy: SubmitPolicy,
    // Never reset, so a recycled token can't match a stale closure.
    next_read: u64,
    live_read: Option<ReadId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::with_policy(SubmitPolicy::default())
    }

    pub fn with_policy(policy: SubmitPolicy) -> Self {
        Self {
            phase: Phase::Empty,
            file_name: None,
            document: None,
            error: None,
            progress: 0,
            has_selection: false,
            policy,
            next_read: 0,
            live_read: None,
        }
    }

    /// A file was chosen. Returns the token for the read to start, or `None`
    /// when the extension was rejected and no read should happen.
    pub fn begin(&mut self, file_name: &str) -> Option<ReadId> {
        if !has_accepted_extension(file_name) {
            self.phase = Phase::Error;
            self.file_name = None;
            self.document = None;
            self.error = Some(UploadError::Extension);
            self.live_read = None;
            return None;
        }

        self.phase = Phase::Reading;
        self.file_name = Some(file_name.to_string());
        self.document = None;
        self.error = None;
        self.progress = 0;
        self.has_selection = true;

        let id = ReadId(self.next_read);
        self.next_read += 1;
        self.live_read = Some(id);
        Some(id)
    }

    /// Progress notification from the reader. Ignored when the token is stale
    /// or the total size is unknown; never moves the percentage backwards.
    pub fn progress(&mut self, id: ReadId, loaded: f64, total: f64) {
        if self.live_read != Some(id) || !(total > 0.0) {
            return;
        }
        let pct = ((loaded / total) * 100.0).round().clamp(0.0, 100.0) as u8;
        if pct > self.progress {
            self.progress = pct;
        }
    }

    /// The read finished with `text` as the file's contents.
    pub fn resolve(&mut self, id: ReadId, text: &str) {
        if self.live_read != Some(id) {
            return;
        }
        self.live_read = None;
        match serde_json::from_str::<Value>(text) {
            Ok(value) if geojson::validate(&value) => {
                self.phase = Phase::Validated;
                self.document = Some(value);
                self.error = None;
                self.progress = 100;
            }
            _ => self.fail_content(),
        }
    }

    /// The read failed at the I/O level before producing any text.
    pub fn read_failed(&mut self, id: ReadId) {
        if self.live_read != Some(id) {
            return;
        }
        self.live_read = None;
        self.fail_content();
    }

    /// User removed the selection. Idempotent; valid in every phase.
    pub fn remove(&mut self) {
        self.phase = Phase::Empty;
        self.file_name = None;
        self.document = None;
        self.error = None;
        self.progress = 0;
        self.has_selection = false;
        self.live_read = None;
    }

    fn fail_content(&mut self) {
        self.phase = Phase::Error;
        self.document = None;
        self.error = Some(UploadError::Content);
        self.progress = 0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }

    pub fn error(&self) -> Option<UploadError> {
        self.error
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(UploadError::message)
    }

    pub fn progress_pct(&self) -> u8 {
        self.progress
    }

    pub fn submit_enabled(&self) -> bool {
        match self.policy {
            SubmitPolicy::AnySelection => self.has_selection,
            SubmitPolicy::ValidatedOnly => self.phase == Phase::Validated,
        }
    }

    /// The summary view is shown iff there is a file name and no error.
    pub fn show_summary(&self) -> bool {
        self.error.is_none() && self.file_name.is_some()
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

/// Suffix after the final `.` must be exactly `geojson` or `json`. A name
/// with no dot is compared whole, matching the picker's original behavior.
fn has_accepted_extension(name: &str) -> bool {
    let suffix = name.rsplit('.').next().unwrap_or(name);
    suffix == "geojson" || suffix == "json"
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_COLLECTION: &str =
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":null,"properties":{}}]}"#;

    #[test]
    fn test_rejects_wrong_extension_without_reading() {
        let mut selection = Selection::new();
        let id = selection.begin("area.txt");

        assert!(id.is_none());
        assert_eq!(selection.phase(), Phase::Error);
        assert_eq!(selection.error(), Some(UploadError::Extension));
        assert_eq!(
            selection.error_message(),
            Some("Please upload a valid GeoJSON file.")
        );
        assert_eq!(selection.file_name(), None);
        assert!(selection.document().is_none());
        assert_eq!(selection.progress_pct(), 0);
        assert!(!selection.submit_enabled());
    }

    #[test]
    fn test_name_without_dot_is_rejected() {
        let mut selection = Selection::new();
        assert!(selection.begin("README").is_none());
        assert_eq!(selection.error(), Some(UploadError::Extension));
    }

    #[test]
    fn test_only_final_suffix_counts() {
        let mut selection = Selection::new();
        assert!(selection.begin("areas.geojson.txt").is_none());
        assert!(selection.begin("archive.tar.json").is_some());
    }

    #[test]
    fn test_valid_feature_collection_is_validated() {
        let mut selection = Selection::new();
        let id = selection.begin("area.geojson").unwrap();
        assert_eq!(selection.phase(), Phase::Reading);
        assert_eq!(selection.file_name(), Some("area.geojson"));

        selection.resolve(id, VALID_COLLECTION);

        assert_eq!(selection.phase(), Phase::Validated);
        assert!(selection.error().is_none());
        assert_eq!(selection.progress_pct(), 100);
        assert_eq!(selection.file_name(), Some("area.geojson"));
        let document = selection.document().unwrap();
        assert_eq!(document["features"].as_array().unwrap().len(), 1);
        assert!(selection.submit_enabled());
    }

    #[test]
    fn test_empty_features_list_is_valid() {
        let mut selection = Selection::new();
        let id = selection.begin("empty.json").unwrap();
        selection.resolve(id, r#"{"type":"FeatureCollection","features":[]}"#);
        assert_eq!(selection.phase(), Phase::Validated);
        assert_eq!(selection.progress_pct(), 100);
    }

    #[test]
    fn test_wrong_shape_is_content_error() {
        let mut selection = Selection::new();
        let id = selection.begin("bad.geojson").unwrap();
        selection.progress(id, 50.0, 100.0);

        selection.resolve(id, r#"{"type":"Polygon"}"#);

        assert_eq!(selection.phase(), Phase::Error);
        assert_eq!(selection.error(), Some(UploadError::Content));
        assert_eq!(
            selection.error_message(),
            Some("Invalid GeoJSON file content.")
        );
        assert!(selection.document().is_none());
        assert_eq!(selection.progress_pct(), 0);
    }

    #[test]
    fn test_malformed_json_is_content_error() {
        let mut selection = Selection::new();
        let id = selection.begin("broken.json").unwrap();
        selection.resolve(id, "{not json at all");
        assert_eq!(selection.error(), Some(UploadError::Content));
        assert!(selection.document().is_none());
        assert_eq!(selection.progress_pct(), 0);
    }

    #[test]
    fn test_read_failure_is_content_error() {
        let mut selection = Selection::new();
        let id = selection.begin("area.geojson").unwrap();
        selection.read_failed(id);
        assert_eq!(selection.phase(), Phase::Error);
        assert_eq!(selection.error(), Some(UploadError::Content));
        assert_eq!(selection.progress_pct(), 0);
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let mut selection = Selection::new();
        let id = selection.begin("area.geojson").unwrap();

        selection.progress(id, 25.0, 100.0);
        assert_eq!(selection.progress_pct(), 25);

        // A regressing notification never moves the bar backwards.
        selection.progress(id, 10.0, 100.0);
        assert_eq!(selection.progress_pct(), 25);

        // Unknown total is ignored.
        selection.progress(id, 90.0, 0.0);
        assert_eq!(selection.progress_pct(), 25);

        selection.progress(id, 100.0, 100.0);
        assert_eq!(selection.progress_pct(), 100);
    }

    #[test]
    fn test_new_selection_resets_progress() {
        let mut selection = Selection::new();
        let first = selection.begin("one.json").unwrap();
        selection.progress(first, 80.0, 100.0);
        assert_eq!(selection.progress_pct(), 80);

        selection.begin("two.json").unwrap();
        assert_eq!(selection.progress_pct(), 0);
    }

    #[test]
    fn test_stale_read_completions_are_discarded() {
        let mut selection = Selection::new();
        let first = selection.begin("slow.json").unwrap();
        let second = selection.begin("fast.json").unwrap();

        // The superseded read finishes late; nothing it reports may land.
        selection.progress(first, 100.0, 100.0);
        assert_eq!(selection.progress_pct(), 0);
        selection.resolve(first, r#"{"type":"Polygon"}"#);
        assert_eq!(selection.phase(), Phase::Reading);
        assert!(selection.error().is_none());

        selection.resolve(second, VALID_COLLECTION);
        assert_eq!(selection.phase(), Phase::Validated);
        assert_eq!(selection.file_name(), Some("fast.json"));
    }

    #[test]
    fn test_stale_read_failure_is_discarded() {
        let mut selection = Selection::new();
        let first = selection.begin("slow.json").unwrap();
        let second = selection.begin("fast.json").unwrap();

        selection.read_failed(first);
        assert_eq!(selection.phase(), Phase::Reading);

        selection.resolve(second, VALID_COLLECTION);
        assert_eq!(selection.phase(), Phase::Validated);
    }

    #[test]
    fn test_completion_after_remove_is_discarded() {
        let mut selection = Selection::new();
        let id = selection.begin("area.geojson").unwrap();
        selection.remove();

        selection.resolve(id, VALID_COLLECTION);
        assert_eq!(selection.phase(), Phase::Empty);
        assert!(selection.document().is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut selection = Selection::new();
        let id = selection.begin("area.geojson").unwrap();
        selection.resolve(id, VALID_COLLECTION);

        selection.remove();
        let after_once = format!("{:?}", selection);
        selection.remove();
        let after_twice = format!("{:?}", selection);

        assert_eq!(after_once, after_twice);
        assert_eq!(selection.phase(), Phase::Empty);
        assert_eq!(selection.file_name(), None);
        assert!(selection.document().is_none());
        assert!(selection.error().is_none());
        assert_eq!(selection.progress_pct(), 0);
        assert!(!selection.submit_enabled());
    }

    #[test]
    fn test_submit_stays_enabled_after_content_error() {
        // Source behavior: submit mirrors "a selection exists", not
        // "validation passed".
        let mut selection = Selection::new();
        let id = selection.begin("bad.geojson").unwrap();
        selection.resolve(id, r#"{"type":"Polygon"}"#);
        assert_eq!(selection.error(), Some(UploadError::Content));
        assert!(selection.submit_enabled());
    }

    #[test]
    fn test_validated_only_policy_gates_submit() {
        let mut selection = Selection::with_policy(SubmitPolicy::ValidatedOnly);
        let id = selection.begin("bad.geojson").unwrap();
        assert!(!selection.submit_enabled());
        selection.resolve(id, r#"{"type":"Polygon"}"#);
        assert!(!selection.submit_enabled());

        let id = selection.begin("good.geojson").unwrap();
        selection.resolve(id, VALID_COLLECTION);
        assert!(selection.submit_enabled());
    }

    #[test]
    fn test_summary_hidden_while_error_present() {
        let mut selection = Selection::new();
        let id = selection.begin("bad.geojson").unwrap();
        assert!(selection.show_summary());
        selection.resolve(id, "nonsense");
        assert!(!selection.show_summary());
    }
}
