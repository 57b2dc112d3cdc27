use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};
use std::path::Path;

use lopdf::Document;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Everything pulled out of a PDF in one pass: the concatenated page text,
/// the page count, and the Info-dictionary properties.
#[derive(Debug, Clone, Default)]
pub struct PdfData {
    pub full_text: String,
    pub page_count: i32,
    pub metadata: BTreeMap<String, String>,
}

/// Extracts the full text of a PDF with page markers, plus page count and
/// document metadata. Fails as a whole if the file cannot be opened, is
/// encrypted, or any page fails to extract; callers never see a partial
/// result.
pub fn extract_pdf_text<P: AsRef<Path>>(path: P) -> Result<PdfData, Error> {
    let doc = Document::load(path.as_ref())
        .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;

    if doc.is_encrypted() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "PDF is password-protected",
        ));
    }

    let pages = doc.get_pages();
    let page_count = pages.len() as i32;

    let extracted: Result<BTreeMap<u32, String>, Error> = pages
        .into_par_iter()
        .map(|(page_num, page_id)| {
            let text = doc.extract_text(&[page_num]).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidData,
                    format!("Failed to extract text from page {page_num} id={page_id:?}: {e}"),
                )
            })?;
            Ok((page_num, text))
        })
        .collect();

    Ok(PdfData {
        full_text: assemble_full_text(&extracted?),
        page_count,
        metadata: read_metadata(&doc),
    })
}

/// Concatenates page text in page order, each page preceded by a marker line
/// so the downstream consumer can tell which page a span of text came from.
fn assemble_full_text(pages: &BTreeMap<u32, String>) -> String {
    let mut full_text = String::new();
    for (page_num, text) in pages {
        full_text.push_str(&format!("\n\n--- PAGE {page_num} ---\n\n"));
        full_text.push_str(text);
    }
    full_text
}

/// Reads the trailer Info dictionary into string key/values. Keys get a
/// lowercased initial (`Title` -> `title`); non-string or non-UTF-8 entries
/// are skipped.
fn read_metadata(doc: &Document) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    let Ok(info_ref) = doc.trailer.get(b"Info") else {
        return metadata;
    };

    let object = match info_ref.as_reference() {
        Ok(reference) => match doc.get_object(reference) {
            Ok(object) => object,
            Err(_) => return metadata,
        },
        Err(_) => info_ref,
    };

    let Ok(dict) = object.as_dict() else {
        return metadata;
    };

    for (key, value) in dict.iter() {
        let Ok(name) = std::str::from_utf8(key) else {
            continue;
        };
        let Ok(bytes) = value.as_str() else {
            continue;
        };
        let Ok(text) = std::str::from_utf8(bytes) else {
            continue;
        };

        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        let key_name: String = first.to_lowercase().chain(chars).collect();

        metadata.insert(key_name, text.to_string());
    }

    metadata
}
