//! Office Open XML (`.docx`) text extraction.
//!
//! Only the main document part is read. Text runs are concatenated in document order,
//! paragraphs end with a newline, and `<w:tab/>` / `<w:br/>` inside a run become `\t` /
//! `\n`. Of each `mc:AlternateContent` block only the `mc:Choice` branch is read; the
//! `mc:Fallback` copy of the same content is skipped.

use super::ExtractionError;
use crate::validator::DocumentKind;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

pub(super) async fn extract_text(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || {
        let xml = read_document_part(&bytes)?;
        document_text(&xml)
    })
    .await
    .map_err(|e| ExtractionError::TaskFailed(e.to_string()))?
}

fn read_document_part(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| malformed(format!("not a valid archive: {}", e)))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| malformed(format!("missing {}: {}", DOCUMENT_PART, e)))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| malformed(format!("unreadable {}: {}", DOCUMENT_PART, e)))?;

    Ok(xml)
}

fn document_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(invalid_xml)?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Fallback" => {
                    reader.read_to_end(e.name()).map_err(invalid_xml)?;
                }
                b"r" => run_depth += 1,
                b"t" if run_depth > 0 => in_text = true,
                _ => {}
            },
            // Tab stops and breaks outside a run are layout properties, not content
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" if run_depth > 0 => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let run = e.unescape().map_err(invalid_xml)?;
                text.push_str(&run);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    text.truncate(text.trim_end_matches('\n').len());
    Ok(text)
}

fn invalid_xml(err: quick_xml::Error) -> ExtractionError {
    malformed(format!("invalid {}: {}", DOCUMENT_PART, err))
}

fn malformed(reason: String) -> ExtractionError {
    ExtractionError::Malformed {
        kind: DocumentKind::Docx,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_docx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
            let options = zip::write::FileOptions::default();
            for (name, content) in parts {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    fn body(inner: &str) -> String {
        format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><w:body>{}</w:body></w:document>"#,
            inner
        )
    }

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>Photosynthesis</w:t></w:r><w:r><w:t xml:space="preserve"> converts light</w:t></w:r></w:p>
<w:p><w:r><w:t>Chlorophyll &amp; light</w:t><w:tab/><w:t>&#x2192; glucose</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:body>
</w:document>"#;

    #[tokio::test]
    async fn test_extracts_paragraphs_in_order() {
        let docx = build_docx(&[
            ("[Content_Types].xml", "<Types/>"),
            (DOCUMENT_PART, DOCUMENT_XML),
        ]);

        let text = extract_text(docx).await.unwrap();
        assert_eq!(
            text,
            "Photosynthesis converts light\nChlorophyll & light\t\u{2192} glucose\ncell"
        );
    }

    #[tokio::test]
    async fn test_missing_document_part_is_malformed() {
        let docx = build_docx(&[("word/styles.xml", "<w:styles/>")]);

        let err = extract_text(docx).await.unwrap_err();
        match err {
            ExtractionError::Malformed { kind, reason } => {
                assert_eq!(kind, DocumentKind::Docx);
                assert!(reason.contains(DOCUMENT_PART));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_alternate_content_is_read_once() {
        let xml = body(
            r#"<w:p><w:r><mc:AlternateContent>
<mc:Choice Requires="wps"><w:drawing><w:txbxContent><w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent></w:drawing></mc:Choice>
<mc:Fallback><w:pict><w:txbxContent><w:p><w:r><w:t>Boxed</w:t></w:r></w:p></w:txbxContent></w:pict></mc:Fallback>
</mc:AlternateContent></w:r></w:p><w:p><w:r><w:t>After</w:t></w:r></w:p>"#,
        );

        let text = document_text(&xml).unwrap();
        assert_eq!(text.matches("Boxed").count(), 1);
        assert!(text.ends_with("After"));
    }

    #[test]
    fn test_tab_stops_in_paragraph_properties_are_ignored() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Term</w:t><w:tab/><w:t>Definition</w:t><w:br/><w:t>Next line</w:t></w:r></w:p>"#,
        );

        assert_eq!(document_text(&xml).unwrap(), "Term\tDefinition\nNext line");
    }

    #[test]
    fn test_entities_and_character_references_are_decoded() {
        let xml = body(
            r#"<w:p><w:r><w:t>a &lt;b&gt; &quot;c&quot; &#65;&#x42;</w:t></w:r></w:p>"#,
        );

        assert_eq!(document_text(&xml).unwrap(), "a <b> \"c\" AB");
    }

    #[test]
    fn test_empty_paragraphs_keep_line_breaks() {
        let xml = body(r#"<w:p><w:r><w:t>One</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>Two</w:t></w:r></w:p>"#);

        assert_eq!(document_text(&xml).unwrap(), "One\n\nTwo");
    }

    #[test]
    fn test_empty_document_yields_empty_text() {
        assert_eq!(
            document_text("<w:document><w:body/></w:document>").unwrap(),
            ""
        );
    }

    #[test]
    fn test_mismatched_tags_are_malformed() {
        let err = document_text("<w:document><w:body></w:document>").unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Malformed {
                kind: DocumentKind::Docx,
                ..
            }
        ));
    }
}
