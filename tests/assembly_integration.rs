//! Integration tests for the assembly pipeline using test doubles in place
//! of the external binaries.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bookdl::assemble::{
    AssemblyError, AssemblyPipeline, Concatenator, PageConverter, Toolchain,
};
use bookdl::filename::AsciiSlug;
use tempfile::TempDir;

/// Byte-appends every input into the output, in order.
struct CatConcatenator;

#[async_trait]
impl Concatenator for CatConcatenator {
    async fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        let mut merged = Vec::new();
        for input in inputs {
            let bytes = tokio::fs::read(input)
                .await
                .map_err(|e| AssemblyError::io(input, e))?;
            merged.extend_from_slice(&bytes);
        }
        tokio::fs::write(output, merged)
            .await
            .map_err(|e| AssemblyError::io(output, e))
    }

    fn name(&self) -> &'static str {
        "cat"
    }
}

/// Copies the source file to the destination unchanged.
struct CopyConverter;

#[async_trait]
impl PageConverter for CopyConverter {
    async fn convert(&self, src: &Path, dest: &Path) -> Result<(), AssemblyError> {
        tokio::fs::copy(src, dest)
            .await
            .map(|_| ())
            .map_err(|e| AssemblyError::io(dest, e))
    }
}

/// Always reports a failed tool exit.
struct FailingConverter;

#[async_trait]
impl PageConverter for FailingConverter {
    async fn convert(&self, _src: &Path, _dest: &Path) -> Result<(), AssemblyError> {
        Err(AssemblyError::ToolFailed {
            tool: "convert",
            status: Some(1),
        })
    }
}

fn toolchain(concatenator: Option<Box<dyn Concatenator>>) -> Toolchain {
    Toolchain::with_parts(Box::new(CopyConverter), concatenator, Box::new(AsciiSlug))
}

#[tokio::test]
async fn test_assemble_concatenates_parts_in_order() {
    let dir = TempDir::new().expect("temp dir");
    let parts: Vec<PathBuf> = ["cover.pdf", "0.pdf", "1.pdf", "2.pdf"]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();
    for (i, part) in parts.iter().enumerate() {
        tokio::fs::write(part, format!("part-{i};"))
            .await
            .expect("write part");
    }
    let output = dir.path().join("book.pdf");

    let tools = toolchain(Some(Box::new(CatConcatenator)));
    let pipeline = AssemblyPipeline::new(&tools);
    pipeline.assemble(&parts, &output).await.expect("assembly succeeds");

    let merged = tokio::fs::read(&output).await.expect("read output");
    assert_eq!(merged, b"part-0;part-1;part-2;part-3;");
}

#[tokio::test]
async fn test_assemble_single_part_moves_without_tool() {
    let dir = TempDir::new().expect("temp dir");
    let part = dir.path().join("0.pdf");
    tokio::fs::write(&part, b"%PDF only chapter")
        .await
        .expect("write part");
    let output = dir.path().join("book.pdf");

    // No concatenator configured: a single part must still produce output.
    let tools = toolchain(None);
    let pipeline = AssemblyPipeline::new(&tools);
    pipeline
        .assemble(std::slice::from_ref(&part), &output)
        .await
        .expect("single-part assembly succeeds");

    assert!(!part.exists(), "source part must be moved, not copied");
    assert_eq!(
        tokio::fs::read(&output).await.expect("read output"),
        b"%PDF only chapter"
    );
}

#[tokio::test]
async fn test_assemble_multiple_parts_without_tool_fails() {
    let dir = TempDir::new().expect("temp dir");
    let parts: Vec<PathBuf> = ["0.pdf", "1.pdf"]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();
    for part in &parts {
        tokio::fs::write(part, b"x").await.expect("write part");
    }

    let tools = toolchain(None);
    let pipeline = AssemblyPipeline::new(&tools);
    let result = pipeline.assemble(&parts, &dir.path().join("book.pdf")).await;

    assert!(matches!(result, Err(AssemblyError::NoConcatenator)));
}

#[tokio::test]
async fn test_assemble_no_parts_fails() {
    let dir = TempDir::new().expect("temp dir");
    let tools = toolchain(Some(Box::new(CatConcatenator)));
    let pipeline = AssemblyPipeline::new(&tools);

    let result = pipeline.assemble(&[], &dir.path().join("book.pdf")).await;
    assert!(matches!(result, Err(AssemblyError::Io { .. })));
}

#[tokio::test]
async fn test_prepare_cover_returns_converted_path() {
    let dir = TempDir::new().expect("temp dir");
    let src = dir.path().join("frontcover.gif");
    let dest = dir.path().join("frontcover.pdf");
    tokio::fs::write(&src, b"GIF89a").await.expect("write cover");

    let tools = toolchain(None);
    let pipeline = AssemblyPipeline::new(&tools);

    let prepared = pipeline.prepare_cover(&src, &dest).await;
    assert_eq!(prepared, Some(dest.clone()));
    assert!(dest.exists());
}

#[tokio::test]
async fn test_prepare_cover_failure_omits_cover() {
    let dir = TempDir::new().expect("temp dir");
    let src = dir.path().join("frontcover.gif");
    let dest = dir.path().join("frontcover.pdf");
    tokio::fs::write(&src, b"GIF89a").await.expect("write cover");

    let tools = Toolchain::with_parts(Box::new(FailingConverter), None, Box::new(AsciiSlug));
    let pipeline = AssemblyPipeline::new(&tools);

    let prepared = pipeline.prepare_cover(&src, &dest).await;
    assert_eq!(prepared, None);
    assert!(!dest.exists());
}
