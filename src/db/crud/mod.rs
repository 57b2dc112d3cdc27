pub mod crud_documents;
