pub mod pdf_extractor;

pub use pdf_extractor::{PdfData, extract_pdf_text};
