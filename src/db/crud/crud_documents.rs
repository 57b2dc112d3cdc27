use diesel::prelude::*;

use crate::db::models::{Clause, ClauseDraft, Document, NewClause, NewDocument};
use crate::db::schema::{clauses, documents};

impl Document {
    /// Inserts a document and all of its clauses in one transaction. If any
    /// insert fails, nothing is persisted.
    pub fn create_with_clauses(
        conn: &mut PgConnection,
        new_document: NewDocument,
        drafts: Vec<ClauseDraft>,
    ) -> Result<(Document, Vec<Clause>), diesel::result::Error> {
        conn.transaction(|conn| {
            let document: Document = diesel::insert_into(documents::table)
                .values(&new_document)
                .get_result(conn)?;

            let new_clauses: Vec<NewClause> = drafts
                .into_iter()
                .map(|draft| NewClause {
                    document_id: document.id,
                    clause_number: draft.clause_number,
                    heading: draft.heading,
                    clause_type: draft.clause_type,
                    start_page: draft.start_page,
                    end_page: draft.end_page,
                })
                .collect();

            let inserted: Vec<Clause> = diesel::insert_into(clauses::table)
                .values(&new_clauses)
                .get_results(conn)?;

            Ok((document, inserted))
        })
    }

    pub fn find_with_clauses(
        conn: &mut PgConnection,
        document_id: i32,
    ) -> Result<(Document, Vec<Clause>), diesel::result::Error> {
        let document: Document = documents::table.find(document_id).first(conn)?;

        let clause_rows: Vec<Clause> = Clause::belonging_to(&document)
            .order(clauses::id.asc())
            .load(conn)?;

        Ok((document, clause_rows))
    }

    pub fn list_with_clauses(
        conn: &mut PgConnection,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<(Document, Vec<Clause>)>, diesel::result::Error> {
        let docs: Vec<Document> = documents::table
            .order(documents::id.asc())
            .offset(offset)
            .limit(limit)
            .load(conn)?;

        let clause_rows: Vec<Vec<Clause>> = Clause::belonging_to(&docs)
            .order(clauses::id.asc())
            .load::<Clause>(conn)?
            .grouped_by(&docs);

        Ok(docs.into_iter().zip(clause_rows).collect())
    }
}
