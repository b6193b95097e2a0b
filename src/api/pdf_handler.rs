//! # PDF Handler API Module
//!
//! Compiles Typst markup, rendered from the report templates, into PDF
//! documents. Only the embedded `typst_assets` fonts are available and the
//! markup can not import other files.

use anyhow::{Result, bail};
use typst::{
    Library, World,
    diag::{FileError, FileResult},
    foundations::{Bytes, Datetime},
    layout::PagedDocument,
    syntax::{FileId, Source},
    text::{Font, FontBook},
    utils::LazyHash,
};
use typst_pdf::PdfOptions;

/// Single source document compiled against the embedded fonts.
struct ReportWorld {
    library: LazyHash<Library>,
    book: LazyHash<FontBook>,
    /// Every face of the embedded font files, indexed like `book`
    fonts: Vec<Font>,
    source: Source,
}

impl ReportWorld {
    /// # Errors
    /// Returns an error if no embedded font could be loaded.
    fn new(markup: &str) -> Result<Self> {
        let fonts = typst_assets::fonts()
            .flat_map(|data| Font::iter(Bytes::new(data)))
            .collect::<Vec<_>>();

        if fonts.is_empty() {
            bail!("typst_assets fonts couldnt be loaded")
        }

        Ok(Self {
            library: LazyHash::new(Library::default()),
            book: LazyHash::new(FontBook::from_fonts(&fonts)),
            fonts,
            source: Source::detached(markup),
        })
    }
}

impl World for ReportWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.source.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.source.id() {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    /// Reports embed no images nor data files
    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    /// Templates receive their dates already formatted
    fn today(&self, _: Option<i64>) -> Option<Datetime> {
        None
    }
}

/// Creates PDF bytes from Typst markup content.
///
/// # Errors
/// Returns an error if the fonts can not be loaded, the markup does not
/// compile or the PDF export fails. Compiler diagnostics are logged.
pub fn create_pdf_bytes_from_str(content: &str) -> Result<Vec<u8>> {
    let world = ReportWorld::new(content)?;

    let document: PagedDocument = match typst::compile(&world).output {
        Ok(document) => document,
        Err(diagnostics) => {
            for diagnostic in diagnostics.iter() {
                tracing::error!(message = %diagnostic.message, "typst compile error");
            }
            bail!("typst content couldnt be compiled")
        }
    };

    match typst_pdf::pdf(&document, &PdfOptions::default()) {
        Ok(buffer) => Ok(buffer),
        Err(diagnostics) => {
            for diagnostic in diagnostics.iter() {
                tracing::error!(message = %diagnostic.message, "typst pdf export error");
            }
            bail!("typst document couldnt be exported to pdf")
        }
    }
}
