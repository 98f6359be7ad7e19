use std::io::Write;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const PHOTOSYNTHESIS_TEXT: &str = "Photosynthesis is the process by which green plants \
use sunlight to synthesize food from carbon dioxide and water.";

pub const TEXT_MIME: &str = "text/plain";
pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Minimal DOCX package with one paragraph per entry in `paragraphs`
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", FileOptions::default())
        .expect("start docx entry");
    writer
        .write_all(document.as_bytes())
        .expect("write docx entry");
    writer.finish().expect("finish docx").into_inner()
}

/// Bytes that carry a PDF header but no parseable document
pub fn corrupt_pdf() -> Vec<u8> {
    b"%PDF-1.4\n%garbage that is not a pdf object graph\n".to_vec()
}
