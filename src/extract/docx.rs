//! DOCX text extraction
//!
//! Reads `word/document.xml` from the package. Body paragraphs come first, then
//! the rows of top-level tables with each row's non-empty cells joined by spaces.

use std::path::Path;

/// Extracts paragraph and table text from a DOCX file
///
/// Returns an empty string (logged) when the file is missing or is not a valid
/// DOCX package.
#[cfg(feature = "docx")]
pub fn extract_docx_text(path: &Path) -> String {
    match read_document_xml(path).and_then(|xml| parse_document_xml(&xml)) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed extracting text from {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(not(feature = "docx"))]
pub fn extract_docx_text(path: &Path) -> String {
    tracing::warn!(
        "Built without the `docx` feature; skipping {}",
        path.display()
    );
    String::new()
}

#[cfg(feature = "docx")]
fn read_document_xml(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::Read;

    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut entry = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Walks WordprocessingML and returns the document text
#[cfg(feature = "docx")]
fn parse_document_xml(xml: &str) -> Result<String, Box<dyn std::error::Error>> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut rows: Vec<String> = Vec::new();

    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut paragraph = String::new();
    // Paragraphs of the current top-level cell
    let mut cell: Vec<String> = Vec::new();
    let mut row_cells: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" | b"cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => paragraph.push_str(&e.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let text = std::mem::take(&mut paragraph);
                    if table_depth == 0 {
                        let text = text.trim();
                        if !text.is_empty() {
                            paragraphs.push(text.to_string());
                        }
                    } else if table_depth == 1 {
                        cell.push(text);
                    }
                }
                b"tc" if table_depth == 1 => {
                    let text = cell.join("\n");
                    cell.clear();
                    let text = text.trim();
                    if !text.is_empty() {
                        row_cells.push(text.to_string());
                    }
                }
                b"tr" if table_depth == 1 => {
                    if !row_cells.is_empty() {
                        rows.push(row_cells.join(" "));
                    }
                    row_cells.clear();
                }
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    paragraphs.extend(rows);
    Ok(paragraphs.join(" "))
}
