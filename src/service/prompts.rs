pub const SYSTEM_PROMPT: &str = "You are an expert legal document analyzer. Extract document metadata and identify all clauses in the provided document. Return valid JSON only.";

const EXTRACTION_PROMPT_TEMPLATE: &str = r#"
Analyze the following document and extract:

1. Document metadata:
   - title: The document title
   - document_type: Type of document (e.g., "Contract", "Agreement", "Policy", "Terms of Service")
   - effective_date: The effective date in YYYY-MM-DD format (if mentioned)

2. All clauses/sections with:
   - clause_number: The clause or section number (e.g., "1", "2.1", "3(a)")
   - heading: The clause title/heading
   - clause_type: Type of clause (e.g., "confidentiality", "payment", "termination", "liability", "definitions", "general")
   - start_page: Page number where clause starts
   - end_page: Page number where clause ends

DOCUMENT TEXT:
{pdf_text}

Return ONLY valid JSON in this exact format:
{
    "document": {
        "title": "Document Title",
        "document_type": "Contract",
        "effective_date": "2025-01-01"
    },
    "clauses": [
        {
            "clause_number": "1",
            "heading": "Definitions",
            "clause_type": "definitions",
            "start_page": 1,
            "end_page": 2
        },
        {
            "clause_number": "2",
            "heading": "Payment Terms",
            "clause_type": "payment",
            "start_page": 2,
            "end_page": 3
        }
    ]
}

If any field cannot be determined, use null. Ensure all page numbers are integers.
"#;

/// Renders the user prompt with the full extracted text embedded verbatim.
/// Oversized input is passed through as-is; no truncation or chunking.
pub fn extraction_prompt(pdf_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE.replace("{pdf_text}", pdf_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_document_text_verbatim() {
        let prompt = extraction_prompt("--- PAGE 1 ---\n\nSome clause text");

        assert!(prompt.contains("--- PAGE 1 ---\n\nSome clause text"));
        assert!(!prompt.contains("{pdf_text}"));
    }

    #[test]
    fn prompt_instructs_nulls_and_integer_pages() {
        let prompt = extraction_prompt("text");

        assert!(prompt.contains("use null"));
        assert!(prompt.contains("page numbers are integers"));
        assert!(prompt.contains("Return ONLY valid JSON"));
    }
}
