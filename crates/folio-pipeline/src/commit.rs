//! Persisting a finished draft.

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use folio_core::{AnalysisResult, Error, Result, Work, WorkAnalysis, WorkRepository};

use crate::draft::WorkDraft;

/// Shown when a draft is committed without a title.
pub const TITLE_REQUIRED_MESSAGE: &str = "タイトルは必須です";

/// A work and its analysis as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommittedWork {
    pub work: Work,
    pub analysis: Option<WorkAnalysis>,
}

/// Insert the draft as a new work, then link the analysis to it.
///
/// The title is required. Storage errors are returned as-is; if the
/// analysis insert fails the work row has already been written.
#[instrument(skip(repo, draft, analysis), fields(subsystem = "pipeline", component = "commit", op = "commit_work", user_id = %user_id, has_analysis = analysis.is_some()))]
pub async fn commit_work(
    repo: &dyn WorkRepository,
    user_id: Uuid,
    draft: &WorkDraft,
    analysis: Option<&AnalysisResult>,
) -> Result<CommittedWork> {
    if !draft.has_title() {
        return Err(Error::InvalidInput(TITLE_REQUIRED_MESSAGE.to_string()));
    }
    if let Some(design_type) = draft.unknown_design_type() {
        return Err(Error::InvalidInput(format!(
            "Unknown design type: {}",
            design_type
        )));
    }

    let work = repo.insert_work(draft.to_new_work(user_id)).await?;

    let analysis = match analysis {
        Some(result) => Some(repo.insert_analysis(work.id, result.clone()).await?),
        None => None,
    };

    info!(work_id = %work.id, "Work committed");
    Ok(CommittedWork { work, analysis })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::fallback_analysis;
    use crate::store::InMemoryWorkRepository;
    use async_trait::async_trait;
    use folio_core::{NewWork, WorkType};

    fn titled(title: &str) -> WorkDraft {
        WorkDraft {
            title: title.to_string(),
            description: "body".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_commit_requires_title() {
        let repo = InMemoryWorkRepository::new();
        let err = commit_work(&repo, Uuid::nil(), &titled("   "), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m == TITLE_REQUIRED_MESSAGE));
        assert!(repo.list_works(Uuid::nil()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_with_analysis() {
        let repo = InMemoryWorkRepository::new();
        let user = Uuid::new_v4();
        let analysis = fallback_analysis();

        let committed = commit_work(&repo, user, &titled("Essay"), Some(&analysis))
            .await
            .unwrap();
        assert_eq!(committed.work.title, "Essay");
        assert_eq!(committed.work.user_id, user);

        let stored = repo.fetch_analysis(committed.work.id).await.unwrap().unwrap();
        assert_eq!(stored.analysis, analysis);
        assert_eq!(committed.analysis.unwrap().work_id, committed.work.id);
    }

    #[tokio::test]
    async fn test_commit_without_analysis() {
        let repo = InMemoryWorkRepository::new();
        let committed = commit_work(&repo, Uuid::nil(), &titled("Essay"), None)
            .await
            .unwrap();
        assert!(committed.analysis.is_none());
        assert!(repo.fetch_analysis(committed.work.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_rejects_unknown_design_type() {
        let repo = InMemoryWorkRepository::new();
        let draft = WorkDraft {
            design_type: Some("ポスター".into()),
            work_type: WorkType::Design,
            ..titled("Poster")
        };
        let err = commit_work(&repo, Uuid::nil(), &draft, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("ポスター")));
        assert!(repo.is_empty().await);
    }

    struct BrokenRepository;

    #[async_trait]
    impl WorkRepository for BrokenRepository {
        async fn insert_work(&self, _work: NewWork) -> Result<Work> {
            Err(Error::Storage("connection reset".into()))
        }

        async fn insert_analysis(
            &self,
            work_id: Uuid,
            _analysis: AnalysisResult,
        ) -> Result<WorkAnalysis> {
            Err(Error::WorkNotFound(work_id))
        }

        async fn list_works(&self, _user_id: Uuid) -> Result<Vec<Work>> {
            Ok(vec![])
        }

        async fn fetch_analysis(&self, _work_id: Uuid) -> Result<Option<WorkAnalysis>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_storage_error_is_surfaced() {
        let err = commit_work(&BrokenRepository, Uuid::nil(), &titled("Essay"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}
