use std::io::{BufWriter, Write};

use anyhow::{Result, anyhow};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::{Block, DOCUMENT_TITLE};

// A4, in millimetres
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CHOICE_INDENT: f32 = 8.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;

const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.4;
/// Helvetica averages a little over half an em per glyph.
const AVERAGE_GLYPH_EM: f32 = 0.52;

const CORRECT_SUFFIX: &str = " (correct)";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageCursor<'_> {
    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        let height = line_height(size);
        if self.y - height < MARGIN {
            self.next_page();
        }
        self.y -= height;
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn wrapped(&mut self, text: &str, size: f32, indent: f32, font: &IndirectFontRef) {
        let width = PAGE_WIDTH - 2.0 * MARGIN - indent;
        for line in wrap(&latin1(text), chars_per_line(size, width)) {
            self.line(&line, size, MARGIN + indent, font);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn next_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }
}

/// Lays the blocks out on A4 pages with the built-in Helvetica faces.
pub fn write<W: Write>(writer: &mut BufWriter<W>, blocks: &[Block]) -> Result<()> {
    let (doc, page, layer) =
        PdfDocument::new(DOCUMENT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
    let fonts = Fonts {
        regular: builtin_font(&doc, BuiltinFont::Helvetica)?,
        bold: builtin_font(&doc, BuiltinFont::HelveticaBold)?,
        italic: builtin_font(&doc, BuiltinFont::HelveticaOblique)?,
    };

    {
        let mut cursor = PageCursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN,
            pages: 1,
        };
        render(&mut cursor, &fonts, blocks);
    }

    doc.save(writer)
        .map_err(|err| anyhow!("failed to encode PDF: {err}"))?;
    writer.flush()?;
    Ok(())
}

fn render(cursor: &mut PageCursor<'_>, fonts: &Fonts, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Title(text) => {
                let text = latin1(text);
                let width = text.chars().count() as f32 * glyph_width(TITLE_SIZE);
                let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
                cursor.line(&text, TITLE_SIZE, x, &fonts.bold);
                cursor.gap(2.0);
            }
            Block::Note(text) => {
                cursor.wrapped(text, BODY_SIZE, 0.0, &fonts.italic);
                cursor.gap(2.0);
            }
            Block::Heading(text) => {
                cursor.gap(3.0);
                cursor.wrapped(text, HEADING_SIZE, 0.0, &fonts.bold);
                cursor.gap(1.0);
            }
            Block::Paragraph(text) => {
                for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
                    cursor.wrapped(paragraph.trim(), BODY_SIZE, 0.0, &fonts.regular);
                    cursor.gap(2.0);
                }
            }
            Block::Question(text) => {
                cursor.gap(1.0);
                cursor.wrapped(text, BODY_SIZE, 0.0, &fonts.bold);
            }
            Block::Choice { text, correct: true } => cursor.wrapped(
                &format!("{text}{CORRECT_SUFFIX}"),
                BODY_SIZE,
                CHOICE_INDENT,
                &fonts.bold,
            ),
            Block::Choice { text, correct: false } => {
                cursor.wrapped(text, BODY_SIZE, CHOICE_INDENT, &fonts.regular)
            }
        }
    }
}

fn builtin_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font)
        .map_err(|err| anyhow!("failed to add built-in font: {err}"))
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * LINE_SPACING
}

fn glyph_width(size: f32) -> f32 {
    size * PT_TO_MM * AVERAGE_GLYPH_EM
}

fn chars_per_line(size: f32, width: f32) -> usize {
    ((width / glyph_width(size)) as usize).max(1)
}

/// The built-in fonts only cover Latin-1; typographic punctuation is folded
/// to ASCII and anything else becomes `?`.
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            '\n' | '\t' => ' ',
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap. Words longer than a line are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::blocks;
    use crate::export::tests::sample_result;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap("abcdefghijkl xy", 5), vec!["abcde", "fghij", "kl xy"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn folds_text_outside_latin1() {
        assert_eq!(latin1("it\u{2019}s \u{2014} caf\u{e9} \u{2713}"), "it's - caf\u{e9} ?");
    }

    #[test]
    fn writes_a_pdf_document() {
        let mut writer = BufWriter::new(Vec::new());
        write(&mut writer, &blocks("Rivers flow.", &sample_result(), "2026-10-19")).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_documents_spill_onto_more_pages() {
        let text = "Sediment settles where the current slows down. ".repeat(400);
        let mut writer = BufWriter::new(Vec::new());
        write(&mut writer, &blocks(&text, &sample_result(), "2026-10-19")).unwrap();
        assert!(writer.into_inner().unwrap().starts_with(b"%PDF"));
    }
}
