use super::Block;

pub fn render(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut in_choices = false;

    for block in blocks {
        let is_choice = matches!(block, Block::Choice { .. });
        if in_choices && !is_choice {
            out.push('\n');
        }
        in_choices = is_choice;

        match block {
            Block::Title(text) => out.push_str(&format!("# {text}\n\n")),
            Block::Note(text) => out.push_str(&format!("_{text}_\n\n")),
            Block::Heading(text) => out.push_str(&format!("## {text}\n\n")),
            Block::Paragraph(text) => out.push_str(&format!("{text}\n\n")),
            Block::Question(text) => out.push_str(&format!("**{text}**\n\n")),
            Block::Choice { text, correct } => {
                if *correct {
                    out.push_str(&format!("- **{text} ✓**\n"));
                } else {
                    out.push_str(&format!("- {text}\n"));
                }
            }
        }
    }
    if in_choices {
        out.push('\n');
    }

    // single trailing newline
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::blocks;
    use crate::export::tests::sample_result;

    #[test]
    fn renders_sections_in_order() {
        let markdown = render(&blocks("Rivers flow.", &sample_result(), "2026-10-19"));
        let expected = "\
# Generated Doc

_Generated on 2026-10-19_

## Original Article

Rivers flow.

## Summary

Rivers shape valleys.

## Multiple Choice Questions

**1. Rivers carve _____ over time**

- A. mountains
- **B. valleys ✓**
- C. glaciers

## Fill in the Blanks

Erosion moves _____ downstream

_Answers: 1. sediment_
";
        assert_eq!(markdown, expected);
    }
}
