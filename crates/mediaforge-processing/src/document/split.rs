//! PDF splitting.
//!
//! Splits a document into two parts after a given page by deleting the
//! unwanted page range from a copy of the page tree and pruning the objects
//! that become unreachable.

use lopdf::Document;

use mediaforge_core::error::DocumentError;

/// Number of pages in a PDF.
pub fn page_count(bytes: &[u8]) -> Result<u32, DocumentError> {
    let doc = load(bytes)?;
    Ok(doc.get_pages().len() as u32)
}

/// Split a PDF after `page` (1-indexed): part one holds pages `1..=page`,
/// part two holds the rest. `page` must leave at least one page on each
/// side.
pub fn split_at(bytes: &[u8], page: u32) -> Result<(Vec<u8>, Vec<u8>), DocumentError> {
    let doc = load(bytes)?;
    let total = doc.get_pages().len() as u32;

    if page < 1 || page >= total {
        return Err(DocumentError::PageOutOfRange(format!(
            "cannot split after page {} (document has {} pages)",
            page, total
        )));
    }

    let part1 = extract_range(&doc, 1, page)?;
    let part2 = extract_range(&doc, page + 1, total)?;
    Ok((part1, part2))
}

fn load(bytes: &[u8]) -> Result<Document, DocumentError> {
    Document::load_mem(bytes).map_err(|e| DocumentError::Malformed(e.to_string()))
}

/// Copy of the document reduced to pages `from..=to`.
fn extract_range(doc: &Document, from: u32, to: u32) -> Result<Vec<u8>, DocumentError> {
    let mut out = doc.clone();
    let total = out.get_pages().len() as u32;

    // Delete in reverse so remaining page numbers stay stable.
    for page in (1..=total).rev() {
        if page < from || page > to {
            out.delete_pages(&[page]);
        }
    }

    out.prune_objects();
    out.compress();

    let mut buffer = Vec::new();
    out.save_to(&mut buffer)
        .map_err(|e| DocumentError::Malformed(format!("failed to save part: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::test_support::build_pdf;

    #[test]
    fn test_page_count() {
        let pdf = build_pdf(5);
        assert_eq!(page_count(&pdf).unwrap(), 5);
    }

    #[test]
    fn test_split_in_two() {
        let pdf = build_pdf(5);
        let (part1, part2) = split_at(&pdf, 2).unwrap();

        let doc1 = Document::load_mem(&part1).unwrap();
        let doc2 = Document::load_mem(&part2).unwrap();
        assert_eq!(doc1.get_pages().len(), 2);
        assert_eq!(doc2.get_pages().len(), 3);
    }

    #[test]
    fn test_split_at_last_possible_page() {
        let pdf = build_pdf(3);
        let (part1, part2) = split_at(&pdf, 2).unwrap();
        assert_eq!(Document::load_mem(&part1).unwrap().get_pages().len(), 2);
        assert_eq!(Document::load_mem(&part2).unwrap().get_pages().len(), 1);
    }

    #[test]
    fn test_split_page_zero_is_out_of_range() {
        let pdf = build_pdf(3);
        assert!(matches!(
            split_at(&pdf, 0),
            Err(DocumentError::PageOutOfRange(_))
        ));
    }

    #[test]
    fn test_split_past_end_is_out_of_range() {
        let pdf = build_pdf(3);
        // Splitting after the final page would leave an empty second part.
        assert!(matches!(
            split_at(&pdf, 3),
            Err(DocumentError::PageOutOfRange(_))
        ));
    }

    #[test]
    fn test_single_page_document_cannot_split() {
        let pdf = build_pdf(1);
        assert!(matches!(
            split_at(&pdf, 1),
            Err(DocumentError::PageOutOfRange(_))
        ));
    }

    #[test]
    fn test_garbage_input_is_malformed() {
        assert!(matches!(
            split_at(b"not a pdf", 1),
            Err(DocumentError::Malformed(_))
        ));
    }
}
