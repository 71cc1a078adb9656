//! In-memory [`WorkRepository`] for tests and embedded callers.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::{AnalysisResult, Error, NewWork, Result, Work, WorkAnalysis, WorkRepository};

#[derive(Default)]
pub struct InMemoryWorkRepository {
    works: RwLock<Vec<Work>>,
    analyses: RwLock<HashMap<Uuid, WorkAnalysis>>,
}

impl InMemoryWorkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully-formed work as-is, keeping its id and timestamp.
    pub async fn seed(&self, work: Work) {
        self.works.write().await.push(work);
    }

    pub async fn len(&self) -> usize {
        self.works.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.works.read().await.is_empty()
    }
}

#[async_trait]
impl WorkRepository for InMemoryWorkRepository {
    async fn insert_work(&self, work: NewWork) -> Result<Work> {
        let work = Work {
            id: Uuid::now_v7(),
            user_id: work.user_id,
            title: work.title,
            description: work.description,
            source_url: work.source_url,
            thumbnail_url: work.thumbnail_url,
            work_type: work.work_type,
            design_type: work.design_type,
            tools_used: work.tools_used,
            created_at: Utc::now(),
        };
        self.works.write().await.push(work.clone());
        Ok(work)
    }

    async fn insert_analysis(
        &self,
        work_id: Uuid,
        analysis: AnalysisResult,
    ) -> Result<WorkAnalysis> {
        if !self.works.read().await.iter().any(|w| w.id == work_id) {
            return Err(Error::WorkNotFound(work_id));
        }

        let mut analyses = self.analyses.write().await;
        if analyses.contains_key(&work_id) {
            return Err(Error::Storage(format!(
                "Work {} already has an analysis",
                work_id
            )));
        }

        let record = WorkAnalysis {
            work_id,
            analysis,
            created_at: Utc::now(),
        };
        analyses.insert(work_id, record.clone());
        Ok(record)
    }

    async fn list_works(&self, user_id: Uuid) -> Result<Vec<Work>> {
        let mut works: Vec<Work> = self
            .works
            .read()
            .await
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort: equal timestamps stay latest-inserted first.
        works.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(works)
    }

    async fn fetch_analysis(&self, work_id: Uuid) -> Result<Option<WorkAnalysis>> {
        Ok(self.analyses.read().await.get(&work_id).cloned())
    }
}
