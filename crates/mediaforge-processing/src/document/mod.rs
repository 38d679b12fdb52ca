//! PDF processing: compression, split, merge.

pub mod compressor;
pub mod merge;
pub mod split;

pub use compressor::PdfCompressor;

use std::path::{Path, PathBuf};

use mediaforge_core::error::DocumentError;
use mediaforge_core::models::Artifact;
use mediaforge_core::naming::unique_output_name;

use crate::exec::remove_partial_output;

/// File-level PDF page operations. The pure document surgery lives in
/// `split`/`merge`; this wrapper owns reading inputs, running the CPU-bound
/// work off the async runtime, and writing uniquely named artifacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfOps;

impl PdfOps {
    /// Split `input` into two parts. Without an explicit page the document
    /// is split at its midpoint.
    pub async fn split_file(
        &self,
        input: &Path,
        at_page: Option<u32>,
        output_dir: &Path,
    ) -> Result<Vec<Artifact>, DocumentError> {
        let bytes = tokio::fs::read(input).await?;

        let (at, (part1, part2)) = tokio::task::spawn_blocking(
            move || -> Result<(u32, (Vec<u8>, Vec<u8>)), DocumentError> {
                let total = split::page_count(&bytes)?;
                let at = at_page.unwrap_or_else(|| (total / 2).max(1));
                Ok((at, split::split_at(&bytes, at)?))
            },
        )
        .await
        .map_err(|e| DocumentError::Malformed(format!("split task failed: {}", e)))??;

        tracing::info!(input = %input.display(), at_page = at, "PDF split");

        let stem = file_stem(input);
        let mut artifacts: Vec<Artifact> = Vec::new();
        for (suffix, data) in [("part1", part1), ("part2", part2)] {
            let file_name = unique_output_name(&format!("{}_{}.pdf", stem, suffix), Some("pdf"));
            let path = output_dir.join(&file_name);
            if let Err(e) = tokio::fs::write(&path, &data).await {
                // Roll back the part already written so a failed split
                // leaves nothing discoverable.
                for artifact in &artifacts {
                    remove_partial_output(&output_dir.join(&artifact.file_name)).await;
                }
                return Err(e.into());
            }
            artifacts.push(Artifact {
                file_name,
                size_bytes: data.len() as u64,
            });
        }

        Ok(artifacts)
    }

    /// Merge `inputs` (in order) into a single document named after the
    /// first input.
    pub async fn merge_files(
        &self,
        inputs: &[PathBuf],
        output_dir: &Path,
    ) -> Result<Artifact, DocumentError> {
        let mut documents = Vec::with_capacity(inputs.len());
        for input in inputs {
            documents.push(tokio::fs::read(input).await?);
        }

        let merged = tokio::task::spawn_blocking(move || merge::merge(&documents))
            .await
            .map_err(|e| DocumentError::Malformed(format!("merge task failed: {}", e)))??;

        let stem = inputs.first().map(|p| file_stem(p)).unwrap_or("merged");
        let file_name = unique_output_name(&format!("{}_merged.pdf", stem), Some("pdf"));
        tokio::fs::write(output_dir.join(&file_name), &merged).await?;

        tracing::info!(count = inputs.len(), artifact = %file_name, "PDFs merged");

        Ok(Artifact {
            file_name,
            size_bytes: merged.len() as u64,
        })
    }
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("file")
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};

    /// Build a minimal valid PDF with `num_pages` pages of plain text.
    pub(crate) fn build_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for page in 0..num_pages {
            let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", page + 1);
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

            let page_id = doc.add_object(dictionary! {
                "Type" => Object::Name(b"Page".to_vec()),
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
                "Contents" => Object::Reference(content_id),
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Count" => Object::Integer(num_pages as i64),
                "Kids" => Object::Array(kids),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::build_pdf;
    use super::*;

    #[tokio::test]
    async fn test_split_file_produces_two_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.pdf");
        tokio::fs::write(&input, build_pdf(4)).await.unwrap();

        let artifacts = PdfOps.split_file(&input, Some(1), dir.path()).await.unwrap();
        assert_eq!(artifacts.len(), 2);
        for artifact in &artifacts {
            let path = dir.path().join(&artifact.file_name);
            assert!(path.exists());
            assert_eq!(
                tokio::fs::metadata(&path).await.unwrap().len(),
                artifact.size_bytes
            );
        }
        assert!(artifacts[0].file_name.starts_with("report_part1_"));
        assert!(artifacts[1].file_name.starts_with("report_part2_"));
    }

    #[tokio::test]
    async fn test_split_file_default_is_midpoint() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.pdf");
        tokio::fs::write(&input, build_pdf(4)).await.unwrap();

        let artifacts = PdfOps.split_file(&input, None, dir.path()).await.unwrap();
        let part1 = tokio::fs::read(dir.path().join(&artifacts[0].file_name))
            .await
            .unwrap();
        let doc = lopdf::Document::load_mem(&part1).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[tokio::test]
    async fn test_merge_files_combines_pages() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        tokio::fs::write(&a, build_pdf(2)).await.unwrap();
        tokio::fs::write(&b, build_pdf(3)).await.unwrap();

        let artifact = PdfOps
            .merge_files(&[a, b], dir.path())
            .await
            .unwrap();
        assert!(artifact.file_name.starts_with("a_merged_"));

        let merged = tokio::fs::read(dir.path().join(&artifact.file_name))
            .await
            .unwrap();
        let doc = lopdf::Document::load_mem(&merged).unwrap();
        assert_eq!(doc.get_pages().len(), 5);
    }

    #[tokio::test]
    async fn test_split_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfOps
            .split_file(Path::new("/nonexistent/x.pdf"), None, dir.path())
            .await;
        assert!(matches!(result, Err(DocumentError::Io(_))));
    }
}
