//! The work being edited before it is committed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use folio_core::defaults::DESIGN_TYPES;
use folio_core::{ContentDescriptor, Metadata, NewWork, WorkType};

/// Editable draft of a work.
///
/// Text fields use the empty string for "not filled in", mirroring a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDraft {
    pub title: String,
    pub description: String,
    pub source_url: String,
    pub thumbnail_url: Option<String>,
    pub work_type: WorkType,
    pub design_type: Option<String>,
    pub tools_used: BTreeSet<String>,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl WorkDraft {
    pub fn new(work_type: WorkType) -> Self {
        Self {
            work_type,
            ..Default::default()
        }
    }

    /// Fill empty fields from extracted metadata.
    ///
    /// Values already present in the draft are never overwritten. Returns
    /// whether any field changed.
    pub fn merge_metadata(&mut self, metadata: &Metadata) -> bool {
        let mut changed = false;

        if is_blank(&self.title) && !is_blank(&metadata.title) {
            self.title = metadata.title.clone();
            changed = true;
        }

        if is_blank(&self.description) {
            if let Some(description) = metadata.description.as_deref().filter(|d| !is_blank(d)) {
                self.description = description.to_string();
                changed = true;
            }
        }

        let thumbnail_empty = self.thumbnail_url.as_deref().map_or(true, is_blank);
        if thumbnail_empty {
            if let Some(thumbnail) = metadata.thumbnail_url.as_deref().filter(|t| !is_blank(t)) {
                self.thumbnail_url = Some(thumbnail.to_string());
                changed = true;
            }
        }

        changed
    }

    /// What the analyzer sees: title, description and URL of the draft.
    pub fn descriptor(&self) -> ContentDescriptor {
        ContentDescriptor {
            title: self.title.clone(),
            description: (!is_blank(&self.description)).then(|| self.description.clone()),
            source_url: (!is_blank(&self.source_url)).then(|| self.source_url.clone()),
        }
    }

    pub fn has_title(&self) -> bool {
        !is_blank(&self.title)
    }

    /// The design type of a design work when it is not one of
    /// [`DESIGN_TYPES`]. Writing works never report one.
    pub fn unknown_design_type(&self) -> Option<&str> {
        if self.work_type != WorkType::Design {
            return None;
        }
        self.design_type
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && !DESIGN_TYPES.contains(d))
    }

    /// Convert into an insertable work owned by `user_id`.
    pub fn to_new_work(&self, user_id: Uuid) -> NewWork {
        NewWork {
            user_id,
            title: self.title.trim().to_string(),
            description: (!is_blank(&self.description)).then(|| self.description.clone()),
            source_url: (!is_blank(&self.source_url)).then(|| self.source_url.trim().to_string()),
            thumbnail_url: self.thumbnail_url.clone().filter(|t| !is_blank(t)),
            work_type: self.work_type,
            design_type: match self.work_type {
                WorkType::Design => self
                    .design_type
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(String::from),
                WorkType::Writing => None,
            },
            tools_used: self.tools_used.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        Metadata {
            title: "Future of AI".into(),
            description: Some("An article about AI".into()),
            thumbnail_url: Some("https://x/img.png".into()),
            error: None,
        }
    }

    #[test]
    fn test_merge_into_empty_draft() {
        let mut draft = WorkDraft::default();
        assert!(draft.merge_metadata(&metadata()));
        assert_eq!(draft.title, "Future of AI");
        assert_eq!(draft.description, "An article about AI");
        assert_eq!(draft.thumbnail_url.as_deref(), Some("https://x/img.png"));
    }

    #[test]
    fn test_merge_keeps_user_values() {
        let mut draft = WorkDraft {
            title: "My own title".into(),
            description: "".into(),
            thumbnail_url: Some("https://mine/pic.jpg".into()),
            ..Default::default()
        };
        assert!(draft.merge_metadata(&metadata()));
        assert_eq!(draft.title, "My own title");
        assert_eq!(draft.description, "An article about AI");
        assert_eq!(draft.thumbnail_url.as_deref(), Some("https://mine/pic.jpg"));
    }

    #[test]
    fn test_merge_with_nothing_new() {
        let mut draft = WorkDraft::default();
        assert!(!draft.merge_metadata(&Metadata::default()));
        assert_eq!(draft, WorkDraft::default());
    }

    #[test]
    fn test_descriptor_omits_blank_fields() {
        let draft = WorkDraft {
            title: "t".into(),
            description: "   ".into(),
            ..Default::default()
        };
        let descriptor = draft.descriptor();
        assert_eq!(descriptor.title, "t");
        assert!(descriptor.description.is_none());
        assert!(descriptor.source_url.is_none());
    }

    #[test]
    fn test_writing_work_drops_design_type() {
        let draft = WorkDraft {
            title: " Essay ".into(),
            design_type: Some("ロゴ".into()),
            ..WorkDraft::new(WorkType::Writing)
        };
        let new_work = draft.to_new_work(Uuid::nil());
        assert_eq!(new_work.title, "Essay");
        assert!(new_work.design_type.is_none());
    }

    #[test]
    fn test_design_type_catalogue() {
        let mut draft = WorkDraft {
            design_type: Some(" ロゴ ".into()),
            ..WorkDraft::new(WorkType::Design)
        };
        assert_eq!(draft.unknown_design_type(), None);
        assert_eq!(draft.to_new_work(Uuid::nil()).design_type.as_deref(), Some("ロゴ"));

        draft.design_type = Some("ポスター".into());
        assert_eq!(draft.unknown_design_type(), Some("ポスター"));

        draft.work_type = WorkType::Writing;
        assert_eq!(draft.unknown_design_type(), None);
    }
}
