use html_escape::encode_text;

use super::{Block, DOCUMENT_TITLE};

const STYLE: &str = "body{font-family:Georgia,serif;max-width:42rem;margin:2rem auto;line-height:1.5}\
h1{text-align:center}ol.choices{list-style:none;padding-left:1.5rem}\
li.correct{font-weight:bold}.note{color:#555;font-style:italic}\
@media print{body{margin:0}}";

/// A standalone page meant for reading or printing from a browser.
pub fn render(blocks: &[Block]) -> String {
    let mut body = String::new();
    let mut in_choices = false;

    for block in blocks {
        let is_choice = matches!(block, Block::Choice { .. });
        if is_choice && !in_choices {
            body.push_str("<ol class=\"choices\">\n");
        } else if !is_choice && in_choices {
            body.push_str("</ol>\n");
        }
        in_choices = is_choice;

        match block {
            Block::Title(text) => body.push_str(&format!("<h1>{}</h1>\n", encode_text(text))),
            Block::Note(text) => {
                body.push_str(&format!("<p class=\"note\">{}</p>\n", encode_text(text)))
            }
            Block::Heading(text) => body.push_str(&format!("<h2>{}</h2>\n", encode_text(text))),
            Block::Paragraph(text) => {
                for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
                    body.push_str(&format!("<p>{}</p>\n", encode_text(paragraph.trim())));
                }
            }
            Block::Question(text) => {
                body.push_str(&format!("<p><strong>{}</strong></p>\n", encode_text(text)))
            }
            Block::Choice { text, correct: true } => body.push_str(&format!(
                "<li class=\"correct\">{} &#10003;</li>\n",
                encode_text(text)
            )),
            Block::Choice { text, correct: false } => {
                body.push_str(&format!("<li>{}</li>\n", encode_text(text)))
            }
        }
    }
    if in_choices {
        body.push_str("</ol>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        DOCUMENT_TITLE, STYLE, body
    )
}
