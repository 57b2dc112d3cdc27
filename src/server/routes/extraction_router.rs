use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::io::Write;
use std::sync::Arc;

use crate::db::get_connection_from_pool;
use crate::db::models::{ClauseDraft, Document, NewDocument};
use crate::pdf::{PdfData, extract_pdf_text};
use crate::server::errors::AppError;
use crate::server::serializers::{AppState, DocumentResponse, Pagination};
use crate::service::normalize::{ExtractionRecord, parse_date};

/// Upload a PDF, extract its structure with the LLM, and persist the result.
/// The uploaded bytes live in a named temp file that is deleted on every
/// exit path when it drops.
pub async fn extract_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::FileUploadError(format!("Failed to process form: {}", e)))?
    {
        let file_name = field
            .file_name()
            .ok_or(AppError::FileUploadError(
                "File name not provided".to_string(),
            ))?
            .to_string();

        require_pdf_filename(&file_name)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::FileUploadError(format!("Failed to read file data: {}", e)))?;

        let mut tmp_file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| AppError::FileUploadError(format!("Failed to create temp file: {}", e)))?;

        tmp_file
            .write_all(&data)
            .map_err(|e| AppError::FileUploadError(format!("Failed to write temp file: {}", e)))?;

        let pdf_data = extract_pdf_text(tmp_file.path()).map_err(|e| {
            tracing::error!("PDF parsing failed for {}: {}", file_name, e);
            AppError::PdfParseError(
                "Unable to parse PDF. File may be corrupted or password-protected.".to_string(),
            )
        })?;

        tracing::info!("Extracted {} pages from {}", pdf_data.page_count, file_name);

        let record = state.extractor.extract(&pdf_data.full_text).await.map_err(|e| {
            tracing::error!("LLM extraction failed for {}: {}", file_name, e);
            AppError::ExtractionError(
                "Failed to extract document. Please try again or contact support if the issue persists."
                    .to_string(),
            )
        })?;

        let (new_document, drafts) = map_record(record, &pdf_data, file_name);

        let mut conn = get_connection_from_pool(&state.pool)
            .map_err(|e| AppError::DatabaseError(format!("Could not connect to database: {}", e)))?;

        let (document, clauses) = Document::create_with_clauses(&mut conn, new_document, drafts)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to persist extraction: {}", e))
            })?;

        return Ok((
            StatusCode::OK,
            Json(DocumentResponse::from((document, clauses))),
        ));
    }

    Err(AppError::FileUploadError("No file provided".to_string()))
}

/// Suffix check only, no content sniffing; rejected uploads never reach the
/// extractor or the store.
fn require_pdf_filename(file_name: &str) -> Result<(), AppError> {
    if file_name.ends_with(".pdf") {
        return Ok(());
    }

    Err(AppError::BadRequest(format!(
        "Invalid file type. Only PDF files are accepted. Received: {}",
        file_name
    )))
}

/// Maps a normalized extraction record to insertable rows. `file_name`
/// prefers the PDF's own metadata title when non-empty, else the uploaded
/// filename; unparseable effective dates silently become null.
fn map_record(
    record: ExtractionRecord,
    pdf_data: &PdfData,
    uploaded_name: String,
) -> (NewDocument, Vec<ClauseDraft>) {
    let new_document = NewDocument {
        title: record.document.title,
        document_type: record.document.document_type,
        effective_date: parse_date(record.document.effective_date.as_deref()),
        file_name: pdf_data
            .metadata
            .get("title")
            .filter(|title| !title.is_empty())
            .cloned()
            .or(Some(uploaded_name)),
    };

    let drafts = record
        .clauses
        .into_iter()
        .map(|clause| ClauseDraft {
            clause_number: clause.clause_number,
            heading: clause.heading,
            clause_type: clause.clause_type,
            start_page: clause.start_page,
            end_page: clause.end_page,
        })
        .collect();

    (new_document, drafts)
}

pub async fn get_extraction(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if document_id < 1 {
        return Err(AppError::BadRequest(format!(
            "Document ID must be >= 1, got {}",
            document_id
        )));
    }

    let mut conn = get_connection_from_pool(&state.pool)
        .map_err(|e| AppError::DatabaseError(format!("Could not connect to database: {}", e)))?;

    let result = Document::find_with_clauses(&mut conn, document_id).map_err(|e| match e {
        diesel::result::Error::NotFound => AppError::NotFoundError(format!(
            "Document with ID {} not found. Use GET /api/extractions to see available documents.",
            document_id
        )),
        other => AppError::DatabaseError(format!("Failed to load document: {}", other)),
    })?;

    Ok((StatusCode::OK, Json(DocumentResponse::from(result))))
}

pub async fn list_extractions(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let (offset, limit) = pagination.resolve().map_err(AppError::BadRequest)?;

    let mut conn = get_connection_from_pool(&state.pool)
        .map_err(|e| AppError::DatabaseError(format!("Could not connect to database: {}", e)))?;

    let results = Document::list_with_clauses(&mut conn, offset, limit)
        .map_err(|e| AppError::DatabaseError(format!("Failed to list documents: {}", e)))?;

    let response: Vec<DocumentResponse> =
        results.into_iter().map(DocumentResponse::from).collect();

    Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::llm::{ClauseExtractor, ExtractionError};
    use crate::service::normalize::normalize;
    use async_trait::async_trait;
    use serde_json::json;

    struct StubExtractor {
        response: serde_json::Value,
    }

    #[async_trait]
    impl ClauseExtractor for StubExtractor {
        async fn extract(&self, _pdf_text: &str) -> Result<ExtractionRecord, ExtractionError> {
            Ok(normalize(&self.response))
        }
    }

    #[tokio::test]
    async fn stub_with_title_only_maps_to_bare_document() {
        let stub = StubExtractor {
            response: json!({ "document": { "title": "X" }, "clauses": [] }),
        };

        let record = stub.extract("--- PAGE 1 ---\n\nno clauses here").await.unwrap();
        let pdf_data = PdfData::default();
        let (new_document, drafts) = map_record(record, &pdf_data, "contract.pdf".to_string());

        assert_eq!(new_document.title.as_deref(), Some("X"));
        assert_eq!(new_document.document_type, None);
        assert_eq!(new_document.effective_date, None);
        assert_eq!(new_document.file_name.as_deref(), Some("contract.pdf"));
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn clause_rows_match_object_shaped_entries() {
        let stub = StubExtractor {
            response: json!({
                "document": { "title": "MSA", "effective_date": "2024-06-30" },
                "clauses": [
                    { "clause_number": "1", "heading": "Definitions", "start_page": 1, "end_page": 2 },
                    "not an object",
                    { "clause_number": "2", "heading": "Payment", "start_page": "2", "end_page": 3.7 }
                ]
            }),
        };

        let record = stub.extract("text").await.unwrap();
        let pdf_data = PdfData::default();
        let (new_document, drafts) = map_record(record, &pdf_data, "msa.pdf".to_string());

        assert_eq!(
            new_document.effective_date,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 30)
        );
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].start_page, Some(2));
        assert_eq!(drafts[1].end_page, Some(3));
    }

    #[test]
    fn metadata_title_wins_over_uploaded_name() {
        let mut pdf_data = PdfData::default();
        pdf_data
            .metadata
            .insert("title".to_string(), "Master Agreement".to_string());

        let (new_document, _) =
            map_record(ExtractionRecord::default(), &pdf_data, "upload.pdf".to_string());
        assert_eq!(new_document.file_name.as_deref(), Some("Master Agreement"));
    }

    #[test]
    fn empty_metadata_title_falls_back_to_uploaded_name() {
        let mut pdf_data = PdfData::default();
        pdf_data.metadata.insert("title".to_string(), String::new());

        let (new_document, _) =
            map_record(ExtractionRecord::default(), &pdf_data, "upload.pdf".to_string());
        assert_eq!(new_document.file_name.as_deref(), Some("upload.pdf"));
    }

    #[test]
    fn pdf_filename_suffix_is_required() {
        assert!(require_pdf_filename("contract.pdf").is_ok());
        assert!(require_pdf_filename("nested.name.pdf").is_ok());

        let rejected = ["contract.txt", "contract.PDF", "contract.pdf.exe", "pdf", ""];
        for name in rejected {
            let result = require_pdf_filename(name);
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn unparseable_effective_date_becomes_null() {
        let record = normalize(&json!({
            "document": { "title": "T", "effective_date": "June 30th, 2024" },
            "clauses": []
        }));

        let (new_document, _) = map_record(record, &PdfData::default(), "t.pdf".to_string());
        assert_eq!(new_document.effective_date, None);
    }
}
