use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::schema;
use schema::{clauses, documents};

#[derive(Debug, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    pub id: i32,
    pub title: Option<String>,
    pub document_type: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocument {
    pub title: Option<String>,
    pub document_type: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub file_name: Option<String>,
}

#[derive(Debug, Queryable, Serialize, Identifiable, Associations, Selectable)]
#[diesel(belongs_to(Document))]
#[diesel(table_name = clauses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Clause {
    pub id: i32,
    pub document_id: i32,
    pub clause_number: Option<String>,
    pub heading: Option<String>,
    pub clause_type: Option<String>,
    pub start_page: Option<i32>,
    pub end_page: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clauses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewClause {
    pub document_id: i32,
    pub clause_number: Option<String>,
    pub heading: Option<String>,
    pub clause_type: Option<String>,
    pub start_page: Option<i32>,
    pub end_page: Option<i32>,
}

/// Clause fields known before the owning document row exists. The
/// transactional insert fills in `document_id` once the document id is
/// assigned.
#[derive(Debug, Clone)]
pub struct ClauseDraft {
    pub clause_number: Option<String>,
    pub heading: Option<String>,
    pub clause_type: Option<String>,
    pub start_page: Option<i32>,
    pub end_page: Option<i32>,
}
