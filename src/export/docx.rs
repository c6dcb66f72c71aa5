use std::io::{Seek, Write};

use anyhow::{Context, Result};
use html_escape::encode_text;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::Block;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_CLOSE: &str = "<w:sectPr/></w:body></w:document>";

// half-points
const TITLE_SIZE: u32 = 32;
const HEADING_SIZE: u32 = 24;
const BODY_SIZE: u32 = 22;

#[derive(Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    size: u32,
}

#[derive(Default)]
struct ParagraphStyle {
    centered: bool,
    indent_twips: Option<u32>,
}

/// Writes a minimal WordprocessingML package and hands the writer back.
pub fn write<W: Write + Seek>(writer: W, blocks: &[Block]) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    zip.write_all(document_xml(blocks).as_bytes())?;

    zip.finish().context("failed to finish docx archive")
}

pub fn document_xml(blocks: &[Block]) -> String {
    let mut xml = String::from(DOCUMENT_OPEN);

    for block in blocks {
        match block {
            Block::Title(text) => push_paragraph(
                &mut xml,
                text,
                ParagraphStyle {
                    centered: true,
                    ..Default::default()
                },
                RunStyle {
                    bold: true,
                    size: TITLE_SIZE,
                    ..Default::default()
                },
            ),
            Block::Heading(text) => push_paragraph(
                &mut xml,
                text,
                ParagraphStyle::default(),
                RunStyle {
                    bold: true,
                    size: HEADING_SIZE,
                    ..Default::default()
                },
            ),
            Block::Note(text) => push_paragraph(
                &mut xml,
                text,
                ParagraphStyle::default(),
                RunStyle {
                    italic: true,
                    size: BODY_SIZE,
                    ..Default::default()
                },
            ),
            Block::Paragraph(text) => {
                for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
                    push_paragraph(
                        &mut xml,
                        paragraph.trim(),
                        ParagraphStyle::default(),
                        RunStyle {
                            size: BODY_SIZE,
                            ..Default::default()
                        },
                    );
                }
            }
            Block::Question(text) => push_paragraph(
                &mut xml,
                text,
                ParagraphStyle::default(),
                RunStyle {
                    bold: true,
                    size: BODY_SIZE,
                    ..Default::default()
                },
            ),
            Block::Choice { text, correct } => {
                let text = if *correct {
                    format!("{text} ✓")
                } else {
                    text.clone()
                };
                push_paragraph(
                    &mut xml,
                    &text,
                    ParagraphStyle {
                        indent_twips: Some(720),
                        ..Default::default()
                    },
                    RunStyle {
                        bold: *correct,
                        size: BODY_SIZE,
                        ..Default::default()
                    },
                );
            }
        }
    }

    xml.push_str(DOCUMENT_CLOSE);
    xml
}

fn push_paragraph(xml: &mut String, text: &str, paragraph: ParagraphStyle, run: RunStyle) {
    xml.push_str("<w:p>");
    if paragraph.centered || paragraph.indent_twips.is_some() {
        xml.push_str("<w:pPr>");
        if paragraph.centered {
            xml.push_str(r#"<w:jc w:val="center"/>"#);
        }
        if let Some(indent) = paragraph.indent_twips {
            xml.push_str(&format!(r#"<w:ind w:left="{indent}"/>"#));
        }
        xml.push_str("</w:pPr>");
    }

    xml.push_str("<w:r><w:rPr>");
    if run.bold {
        xml.push_str("<w:b/>");
    }
    if run.italic {
        xml.push_str("<w:i/>");
    }
    xml.push_str(&format!(r#"<w:sz w:val="{}"/>"#, run.size));
    xml.push_str("</w:rPr>");
    xml.push_str(&format!(
        r#"<w:t xml:space="preserve">{}</w:t>"#,
        encode_text(text)
    ));
    xml.push_str("</w:r></w:p>");
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use zip::ZipArchive;

    use super::*;
    use crate::export::blocks;
    use crate::export::tests::sample_result;

    #[test]
    fn archive_contains_the_word_parts() {
        let blocks = blocks("Rivers & streams flow.", &sample_result(), "2026-10-19");
        let cursor = write(Cursor::new(Vec::new()), &blocks).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert!(archive.by_name("[Content_Types].xml").is_ok());
        assert!(archive.by_name("_rels/.rels").is_ok());

        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();

        assert!(document.contains("Rivers &amp; streams flow."));
        assert!(document.contains(r#"<w:jc w:val="center"/>"#));
        assert!(document.contains("B. valleys ✓"));
        assert!(!document.contains("A. mountains ✓"));
        assert!(document.ends_with(DOCUMENT_CLOSE));
    }

    #[test]
    fn correct_choice_is_bold_and_indented() {
        let xml = document_xml(&[Block::Choice {
            text: "B. valleys".to_string(),
            correct: true,
        }]);
        assert!(xml.contains(r#"<w:ind w:left="720"/>"#));
        assert!(xml.contains("<w:b/>"));
    }
}
