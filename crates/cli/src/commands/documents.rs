//! Documents command handler.
//!
//! Manages the indexed documents directly on the persisted store, without a
//! running server.

use super::open_store;
use clap::{Args, Subcommand};
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::{ingest_documents, ingest_pdf_batch, IngestReport, NewDocument, PdfUpload};
use std::path::{Path, PathBuf};

/// Add, list and delete indexed documents
#[derive(Args, Debug)]
pub struct DocumentsCommand {
    #[command(subcommand)]
    pub action: DocumentsAction,
}

#[derive(Subcommand, Debug)]
pub enum DocumentsAction {
    /// Index one text document
    Add(DocumentsAddCommand),
    /// Index PDF files, one document per file
    AddPdf(DocumentsAddPdfCommand),
    /// List indexed documents
    List(DocumentsListCommand),
    /// Delete a document and its chunks
    Delete(DocumentsDeleteCommand),
}

impl DocumentsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            DocumentsAction::Add(cmd) => cmd.execute(config).await,
            DocumentsAction::AddPdf(cmd) => cmd.execute(config).await,
            DocumentsAction::List(cmd) => cmd.execute(config).await,
            DocumentsAction::Delete(cmd) => cmd.execute(config).await,
        }
    }
}

/// Index one text document
#[derive(Args, Debug)]
pub struct DocumentsAddCommand {
    /// Document text
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub content: Option<String>,

    /// Read the document text from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Document title (defaults to the file name when reading a file)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Document id (defaults to a generated UUID)
    #[arg(long)]
    pub id: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocumentsAddCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let (content, default_title) = match (&self.content, &self.file) {
            (Some(content), _) => (content.clone(), None),
            (None, Some(path)) => {
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    AppError::Validation(format!("Failed to read {}: {}", path.display(), e))
                })?;
                (content, file_title(path))
            }
            (None, None) => {
                return Err(AppError::Validation(
                    "Provide --content or --file".to_string(),
                ))
            }
        };

        let document = NewDocument {
            id: self.id.clone(),
            title: self.title.clone().or(default_title),
            content,
        };

        let store = open_store(config)?;
        let reports = ingest_documents(&store, vec![document]).await?;
        print_reports(&reports, self.json)
    }
}

/// Index PDF files, one document per file
#[derive(Args, Debug)]
pub struct DocumentsAddPdfCommand {
    /// PDF files to index
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocumentsAddPdfCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut files = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                AppError::Validation(format!("Failed to read {}: {}", path.display(), e))
            })?;
            files.push(PdfUpload {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                content_type: None,
                bytes,
            });
        }

        let store = open_store(config)?;
        let report = ingest_pdf_batch(&store, files).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        print_reports(&report.documents, false)?;
        for name in &report.skipped {
            println!("Skipped {} (no extractable text)", name);
        }
        Ok(())
    }
}

/// List indexed documents
#[derive(Args, Debug)]
pub struct DocumentsListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocumentsListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = open_store(config)?;
        let documents = store.list_documents().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        } else if documents.is_empty() {
            println!("No documents indexed");
        } else {
            for doc in &documents {
                println!("{}  {}", doc.document_id, doc.title);
            }
        }

        Ok(())
    }
}

/// Delete a document
#[derive(Args, Debug)]
pub struct DocumentsDeleteCommand {
    /// Id of the document to delete
    pub id: String,
}

impl DocumentsDeleteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = open_store(config)?;
        if !store.delete_document(&self.id).await? {
            return Err(AppError::NotFound(format!("Document '{}'", self.id)));
        }

        println!("Document {} deleted", self.id);
        Ok(())
    }
}

fn file_title(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

fn print_reports(reports: &[IngestReport], json: bool) -> AppResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!(
            "Indexed {} ({}) in {} chunk(s)",
            report.title, report.document_id, report.chunks
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_title_uses_stem() {
        assert_eq!(
            file_title(Path::new("/docs/rust-guide.txt")).as_deref(),
            Some("rust-guide")
        );
    }
}
