/// Toolbar Collector Module
///
/// A collector gathers data for one section of the debug toolbar. What a
/// collector can show is fixed per collector type by its `CollectorFlags`;
/// the default methods return "no data" so a collector only overrides what it
/// actually produces.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Capability flags and title of a collector type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorFlags {
    /// Used to name things in the toolbar
    pub title: &'static str,
    pub has_timeline: bool,
    pub has_tab_content: bool,
    pub has_label: bool,
    pub has_var_data: bool,
}

impl CollectorFlags {
    /// A collector with the given title and no capabilities.
    pub const fn new(title: &'static str) -> Self {
        CollectorFlags {
            title,
            has_timeline: false,
            has_tab_content: false,
            has_label: false,
            has_var_data: false,
        }
    }

    pub const fn with_timeline(mut self) -> Self {
        self.has_timeline = true;
        self
    }

    pub const fn with_tab_content(mut self) -> Self {
        self.has_tab_content = true;
        self
    }

    pub const fn with_label(mut self) -> Self {
        self.has_label = true;
        self
    }

    pub const fn with_var_data(mut self) -> Self {
        self.has_var_data = true;
        self
    }
}

/// One bar of the timeline, times in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub name: String,
    pub component: String,
    pub start: f64,
    pub duration: f64,
}

/// Sections of the Vars tab, each a list of key/value pairs.
pub type VarData = Vec<(String, Vec<(String, String)>)>;

/// Everything the toolbar reads from a collector, in one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorSnapshot {
    pub title: String,
    pub title_safe: String,
    pub title_details: String,
    pub display: Value,
    pub badge_value: Option<Value>,
    pub is_empty: bool,
    pub has_tab_content: bool,
    pub has_label: bool,
    pub icon: String,
    pub has_timeline_data: bool,
    pub timeline_data: Vec<TimelineEntry>,
}

/// A data source for the debug toolbar.
pub trait Collector {
    fn flags(&self) -> &CollectorFlags;

    fn title(&self) -> String {
        self.flags().title.to_string()
    }

    /// Title lowercased with spaces replaced by dashes, for use in ids.
    fn safe_title(&self) -> String {
        self.flags().title.to_lowercase().replace(' ', "-")
    }

    /// Information shown next to the title.
    fn title_details(&self) -> String {
        String::new()
    }

    fn has_tab_content(&self) -> bool {
        self.flags().has_tab_content
    }

    fn has_label(&self) -> bool {
        self.flags().has_label
    }

    fn has_timeline_data(&self) -> bool {
        self.flags().has_timeline
    }

    fn has_var_data(&self) -> bool {
        self.flags().has_var_data
    }

    /// Timeline entries, or nothing when the collector has no timeline.
    fn timeline_data(&self) -> Vec<TimelineEntry> {
        if !self.has_timeline_data() {
            return Vec::new();
        }
        self.format_timeline_data()
    }

    /// Timeline entries produced by the concrete collector.
    fn format_timeline_data(&self) -> Vec<TimelineEntry> {
        Vec::new()
    }

    fn var_data(&self) -> Option<VarData> {
        None
    }

    /// Data rendered in the collector's tab.
    fn display(&self) -> Value {
        Value::Array(Vec::new())
    }

    fn badge_value(&self) -> Option<Value> {
        None
    }

    /// When true the toolbar hides this collector's button.
    fn is_empty(&self) -> bool {
        false
    }

    /// SVG or base64 image for the toolbar button.
    fn icon(&self) -> String {
        String::new()
    }

    /// Shortens `file` relative to the current working directory.
    fn clean_path(&self, file: &str) -> String {
        let path = Path::new(file);
        std::env::current_dir()
            .ok()
            .and_then(|root| path.strip_prefix(root).ok().map(|rel| rel.display().to_string()))
            .map(|rel| format!("ROOTPATH/{rel}"))
            .unwrap_or_else(|| file.to_string())
    }

    /// Reads every accessor once.
    fn snapshot(&self) -> CollectorSnapshot {
        CollectorSnapshot {
            title: self.title(),
            title_safe: self.safe_title(),
            title_details: self.title_details(),
            display: self.display(),
            badge_value: self.badge_value(),
            is_empty: self.is_empty(),
            has_tab_content: self.has_tab_content(),
            has_label: self.has_label(),
            icon: self.icon(),
            has_timeline_data: self.has_timeline_data(),
            timeline_data: self.timeline_data(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Plain;

    const PLAIN: CollectorFlags = CollectorFlags::new("Request Timing");

    impl Collector for Plain {
        fn flags(&self) -> &CollectorFlags {
            &PLAIN
        }

        // ignored without the timeline flag
        fn format_timeline_data(&self) -> Vec<TimelineEntry> {
            vec![TimelineEntry {
                name: "never".into(),
                component: "Plain".into(),
                start: 0.0,
                duration: 1.0,
            }]
        }
    }

    struct Labelled;

    const LABELLED: CollectorFlags = CollectorFlags::new("Vars").with_label().with_var_data();

    impl Collector for Labelled {
        fn flags(&self) -> &CollectorFlags {
            &LABELLED
        }

        fn var_data(&self) -> Option<VarData> {
            Some(vec![(
                "section 1".into(),
                vec![("foo".into(), "bar".into())],
            )])
        }
    }

    #[test]
    fn test_defaults() {
        let plain = Plain;
        assert_eq!(plain.title(), "Request Timing");
        assert_eq!(plain.safe_title(), "request-timing");
        assert_eq!(plain.title_details(), "");
        assert!(!plain.has_tab_content());
        assert!(!plain.has_label());
        assert!(!plain.has_var_data());
        assert!(!plain.has_timeline_data());
        assert!(plain.timeline_data().is_empty());
        assert!(plain.var_data().is_none());
        assert!(plain.badge_value().is_none());
        assert!(!plain.is_empty());
        assert_eq!(plain.icon(), "");
    }

    #[test]
    fn test_flags_builders() {
        assert!(Labelled.has_label());
        assert!(Labelled.has_var_data());
        assert!(!Labelled.has_tab_content());
        assert_eq!(Labelled.var_data().unwrap()[0].1[0].1, "bar");
    }

    #[test]
    fn test_snapshot_shape() {
        let snapshot = serde_json::to_value(Plain.snapshot()).unwrap();
        assert_eq!(
            snapshot,
            json!({
                "title": "Request Timing",
                "titleSafe": "request-timing",
                "titleDetails": "",
                "display": [],
                "badgeValue": null,
                "isEmpty": false,
                "hasTabContent": false,
                "hasLabel": false,
                "icon": "",
                "hasTimelineData": false,
                "timelineData": []
            })
        );
    }

    #[test]
    fn test_clean_path() {
        let root = std::env::current_dir().unwrap();
        let file = root.join("src").join("lib.rs");
        let cleaned = Plain.clean_path(&file.display().to_string());
        assert!(cleaned.starts_with("ROOTPATH/"));
        assert!(cleaned.ends_with("lib.rs"));
        assert_eq!(Plain.clean_path("/elsewhere/file.rs"), "/elsewhere/file.rs");
    }
}
