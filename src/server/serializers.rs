use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::DbPool;
use crate::db::models::{Clause, Document};
use crate::service::llm::ClauseExtractor;

pub struct AppState {
    pub pool: DbPool,
    pub extractor: Arc<dyn ClauseExtractor>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    /// Applies defaults (offset 0, limit 100) and bounds (offset >= 0,
    /// 1 <= limit <= 1000) before anything hits the store.
    pub fn resolve(&self) -> Result<(i64, i64), String> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(100);

        if offset < 0 {
            return Err(format!("offset must be >= 0, got {}", offset));
        }
        if !(1..=1000).contains(&limit) {
            return Err(format!("limit must be between 1 and 1000, got {}", limit));
        }

        Ok((offset, limit))
    }
}

#[derive(Debug, Serialize)]
pub struct ClauseResponse {
    pub id: i32,
    pub document_id: i32,
    pub clause_number: Option<String>,
    pub heading: Option<String>,
    pub clause_type: Option<String>,
    pub start_page: Option<i32>,
    pub end_page: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<Clause> for ClauseResponse {
    fn from(clause: Clause) -> Self {
        Self {
            id: clause.id,
            document_id: clause.document_id,
            clause_number: clause.clause_number,
            heading: clause.heading,
            clause_type: clause.clause_type,
            start_page: clause.start_page,
            end_page: clause.end_page,
            created_at: clause.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: i32,
    pub title: Option<String>,
    pub document_type: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub clauses: Vec<ClauseResponse>,
}

impl From<(Document, Vec<Clause>)> for DocumentResponse {
    fn from((document, clauses): (Document, Vec<Clause>)) -> Self {
        Self {
            id: document.id,
            title: document.title,
            document_type: document.document_type,
            effective_date: document.effective_date,
            file_name: document.file_name,
            created_at: document.created_at,
            clauses: clauses.into_iter().map(ClauseResponse::from).collect(),
        }
    }
}
