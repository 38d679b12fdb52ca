//! PDF merging.
//!
//! Appends the pages of each document to the first one. Object IDs from
//! later documents are shifted past the destination's current maximum so
//! references stay unambiguous, then the destination page tree is rebuilt
//! with the combined page list.

use lopdf::{Document, Object, ObjectId};

use mediaforge_core::error::DocumentError;

/// Merge two or more PDFs, in input order.
pub fn merge(documents: &[Vec<u8>]) -> Result<Vec<u8>, DocumentError> {
    if documents.len() < 2 {
        return Err(DocumentError::Malformed(
            "merge requires at least two documents".to_string(),
        ));
    }

    let mut dest = load(&documents[0], 1)?;
    let mut page_refs: Vec<ObjectId> = dest.get_pages().values().copied().collect();
    let mut next_id = dest.max_id;

    for (idx, bytes) in documents.iter().enumerate().skip(1) {
        let source = load(bytes, idx + 1)?;
        let source_max = source.max_id;
        let source_pages: Vec<ObjectId> = source.get_pages().values().copied().collect();
        let offset = next_id;

        for (id, object) in source.objects.into_iter() {
            dest.objects
                .insert((id.0 + offset, id.1), shift_refs(object, offset));
        }
        page_refs.extend(source_pages.into_iter().map(|id| (id.0 + offset, id.1)));

        next_id = next_id.max(source_max + offset);
    }

    rebuild_page_tree(&mut dest, &page_refs)?;
    dest.max_id = next_id;
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| DocumentError::Malformed(format!("failed to save merged PDF: {}", e)))?;
    Ok(buffer)
}

fn load(bytes: &[u8], ordinal: usize) -> Result<Document, DocumentError> {
    Document::load_mem(bytes)
        .map_err(|e| DocumentError::Malformed(format!("failed to load document {}: {}", ordinal, e)))
}

/// Shift every object reference inside `obj` by `offset`.
fn shift_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(items) => {
            Object::Array(items.into_iter().map(|o| shift_refs(o, offset)).collect())
        }
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination catalog's page tree at the combined page list.
fn rebuild_page_tree(doc: &mut Document, page_refs: &[ObjectId]) -> Result<(), DocumentError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .ok_or_else(|| DocumentError::Malformed("document has no catalog".to_string()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|catalog| catalog.get(b"Pages").ok())
        .and_then(|obj| obj.as_reference().ok())
        .ok_or_else(|| DocumentError::Malformed("catalog has no page tree".to_string()))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages)) => {
            pages.set(
                "Kids",
                Object::Array(page_refs.iter().map(|&id| Object::Reference(id)).collect()),
            );
            pages.set("Count", Object::Integer(page_refs.len() as i64));
            Ok(())
        }
        _ => Err(DocumentError::Malformed(
            "page tree root is not a dictionary".to_string(),
        )),
    }
}
