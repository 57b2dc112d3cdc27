diesel::table! {
    clauses (id) {
        id -> Int4,
        document_id -> Int4,
        #[max_length = 50]
        clause_number -> Nullable<Varchar>,
        heading -> Nullable<Text>,
        #[max_length = 100]
        clause_type -> Nullable<Varchar>,
        start_page -> Nullable<Int4>,
        end_page -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    documents (id) {
        id -> Int4,
        title -> Nullable<Text>,
        #[max_length = 100]
        document_type -> Nullable<Varchar>,
        effective_date -> Nullable<Date>,
        file_name -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(clauses -> documents (document_id));

diesel::allow_tables_to_appear_in_same_query!(clauses, documents,);
