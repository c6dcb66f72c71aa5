use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;

/// Marker that replaces a removed word in questions and drills.
pub const BLANK_MARKER: &str = "_____";

/// A word character: alphanumeric or underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Drops every non-word character from a token, e.g. `"dog,"` -> `"dog"`.
pub fn strip_non_word(token: &str) -> String {
    token.chars().filter(|c| is_word_char(*c)).collect()
}

/// Trims leading and trailing non-word characters, keeping inner ones.
pub fn trim_non_word(token: &str) -> &str {
    token.trim_matches(|c: char| !is_word_char(c))
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn word_count(text: &str) -> usize {
    text.split(' ').filter(|w| !w.trim().is_empty()).count()
}

pub fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

pub fn trim_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

pub fn strip_controls_and_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // ANSI escape sequence (ESC … letter)
            '\x1b' => {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.trim().to_string()
}

/// Reads the text to study from a `.txt` file, or from stdin when no path
/// (or `-`) is given.
pub fn read_input_text(path: Option<&Path>) -> Result<String> {
    match path {
        None => read_stdin(),
        Some(path) if path.as_os_str() == "-" => read_stdin(),
        Some(path) => {
            if !is_plain_text(path) {
                bail!("Input must be a plain text (.txt) file: {}", path.display());
            }
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {} as UTF-8 text", path.display()))
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    Ok(buffer)
}

pub fn get_data_dir() -> Result<std::path::PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "studyaid")
        .ok_or_else(|| anyhow!("Could not determine project directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_strip_controls_and_escapes() {
        let input = "\x1b[1msk-test\x1b[0m\n";
        assert_eq!(strip_controls_and_escapes(input), "sk-test");
    }

    #[test]
    fn test_strip_and_trim_non_word() {
        assert_eq!(strip_non_word("dog,"), "dog");
        assert_eq!(strip_non_word("don't"), "dont");
        assert_eq!(strip_non_word("—"), "");
        assert_eq!(trim_non_word("\"don't!\""), "don't");
        assert_eq!(trim_non_word("snake_case."), "snake_case");
    }

    #[test]
    fn test_is_plain_text() {
        assert!(is_plain_text(Path::new("notes.txt")));
        assert!(is_plain_text(Path::new("NOTES.TXT")));
        assert!(!is_plain_text(Path::new("notes.md")));
        assert!(!is_plain_text(Path::new("notes")));
    }

    #[test]
    fn test_word_count_ignores_repeated_spaces() {
        assert_eq!(word_count("one  two three "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("question", 1), "1 question");
        assert_eq!(pluralize("question", 0), "0 questions");
        assert_eq!(pluralize("blank", 4), "4 blanks");
    }

    #[test]
    fn read_input_text_rejects_non_txt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "hello").unwrap();
        assert!(read_input_text(Some(&path)).is_err());
    }

    #[test]
    fn read_input_text_reads_txt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Photosynthesis converts light.").unwrap();
        let text = read_input_text(Some(&path)).unwrap();
        assert_eq!(text, "Photosynthesis converts light.");
    }
}
