use crate::error::ExtractError;
use lopdf::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Page separator emitted by common PDF-to-text tools.
const FORM_FEED: char = '\x0c';

/// Something that can hand back the text of a document page by page.
/// Pages with no extractable text come back as `None`.
pub trait PageSource {
    fn pages(&self) -> Result<Vec<Option<String>>, ExtractError>;

    fn describe(&self) -> String;
}

pub struct PdfSource {
    path: PathBuf,
}

impl PdfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for PdfSource {
    fn pages(&self) -> Result<Vec<Option<String>>, ExtractError> {
        let doc = Document::load(&self.path).map_err(|e| ExtractError::PdfLoad {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        if page_numbers.is_empty() {
            return Err(ExtractError::NoPages(self.path.clone()));
        }
        debug!(pages = page_numbers.len(), path = %self.path.display(), "loaded PDF");

        let pages = page_numbers
            .into_iter()
            .map(|page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => non_blank(text),
                Err(e) => {
                    warn!(page = page_num, error = %e, "no extractable text on page");
                    None
                }
            })
            .collect();

        Ok(pages)
    }

    fn describe(&self) -> String {
        format!("PDF {}", self.path.display())
    }
}

/// Text that was already extracted upstream, one page per form-feed block.
pub struct TextSource {
    path: PathBuf,
}

impl TextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageSource for TextSource {
    fn pages(&self) -> Result<Vec<Option<String>>, ExtractError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ExtractError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(split_pages(&content))
    }

    fn describe(&self) -> String {
        format!("text file {}", self.path.display())
    }
}

pub fn split_pages(content: &str) -> Vec<Option<String>> {
    content
        .split(FORM_FEED)
        .map(|page| non_blank(page.to_string()))
        .collect()
}

/// Pick a source from the file extension: `.pdf` is loaded as a PDF,
/// anything else is read as plain text.
pub fn open_source(path: &Path) -> Box<dyn PageSource> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        Box::new(PdfSource::new(path))
    } else {
        Box::new(TextSource::new(path))
    }
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn form_feed_splits_pages() {
        let pages = split_pages("1 A SS Gulu\n\x0c\x0c2 B SS Lira 42\n");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].as_deref(), Some("1 A SS Gulu\n"));
        assert_eq!(pages[1], None);
        assert_eq!(pages[2].as_deref(), Some("2 B SS Lira 42\n"));
    }

    #[test]
    fn text_source_reads_fixture() {
        let source = TextSource::new("tests/fixtures/listing.txt");
        let pages = source.pages().unwrap();
        assert!(pages.len() >= 2);
        assert!(pages.iter().any(Option::is_none));
    }

    #[test]
    fn missing_text_file_is_fatal() {
        let source = TextSource::new("tests/fixtures/does-not-exist.txt");
        assert!(matches!(source.pages(), Err(ExtractError::Io { .. })));
    }

    #[test]
    fn invalid_pdf_is_fatal() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"this is not a pdf").unwrap();

        let source = open_source(file.path());
        assert!(source.describe().starts_with("PDF"));
        assert!(matches!(source.pages(), Err(ExtractError::PdfLoad { .. })));
    }

    #[test]
    fn extension_picks_source() {
        assert!(open_source(Path::new("list.PDF")).describe().starts_with("PDF"));
        assert!(open_source(Path::new("list.txt"))
            .describe()
            .starts_with("text file"));
        assert!(open_source(Path::new("list")).describe().starts_with("text file"));
    }
}
