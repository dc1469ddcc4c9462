//! Markdown codec for recipe documents.
//!
//! A stored document looks like:
//!
//! ```text
//! # 豚の角煮
//!
//! ![豚の角煮](../images/20260101120000.jpg)
//!
//! ## 材料
//! * 豚バラ 500g
//!
//! ## 手順
//! 1. 下茹でする
//!
//! ## メモ
//! 前日に作ると味が染みる
//! ```
//!
//! [`encode`] is total and deterministic. [`decode`] is best effort: it
//! tokenizes the text by heading level and dispatches level-2 sections on a
//! closed set of labels, ignoring everything it does not recognize.
//!
//! `decode(encode(r))` gives back `r` (category aside) when the title is
//! trimmed, ingredient and step lines are trimmed, non-blank and free of list
//! markers, and the memo has no `"  \n"` sequences and no line that is a
//! level-2 heading (`## ...`). Such a memo line closes the memo section on
//! the way back: the rest of the memo is read as another section and is
//! usually dropped.
//!
//! # Examples
//!
//! ```
//! use recipe_core::{decode, encode, RecipeRecord};
//!
//! let mut record = RecipeRecord::new("Braised Pork", "main/meat");
//! record.ingredients = vec!["pork 200g".into(), "onion 1".into()];
//! record.steps = vec!["cut".into(), "simmer".into()];
//!
//! let text = encode(&record);
//! assert!(text.starts_with("# Braised Pork\n\n## 材料\n* pork 200g\n"));
//!
//! let decoded = decode(&text).with_category("main/meat");
//! assert_eq!(decoded, record);
//! ```

use crate::types::RecipeRecord;

/// Heading label of the ingredients section.
pub const INGREDIENTS_LABEL: &str = "材料";

/// Heading label of the steps section.
pub const STEPS_LABEL: &str = "手順";

/// Heading label of the memo section.
pub const MEMO_LABEL: &str = "メモ";

/// Markdown hard line break: two trailing spaces before the newline.
const HARD_BREAK: &str = "  \n";

/// Serializes a record into its canonical Markdown document.
///
/// Blank and whitespace-only ingredient/step lines are dropped; steps are
/// numbered by their position among the retained lines. The category is not
/// written, it is implied by the document's location.
pub fn encode(record: &RecipeRecord) -> String {
    let title = record.title.trim();
    let mut out = String::new();

    out.push_str("# ");
    out.push_str(title);
    out.push_str("\n\n");

    let image = record.image_reference.trim();
    if !image.is_empty() {
        out.push_str(&format!("![{}]({})\n\n", title, image));
    }

    out.push_str("## ");
    out.push_str(INGREDIENTS_LABEL);
    out.push('\n');
    let ingredients: Vec<String> = retained_lines(&record.ingredients)
        .map(|line| format!("* {}", line))
        .collect();
    out.push_str(&ingredients.join("\n"));
    out.push_str("\n\n");

    out.push_str("## ");
    out.push_str(STEPS_LABEL);
    out.push('\n');
    let steps: Vec<String> = retained_lines(&record.steps)
        .enumerate()
        .map(|(i, line)| format!("{}. {}", i + 1, line))
        .collect();
    out.push_str(&steps.join("\n"));
    out.push_str("\n\n");

    if !record.memo.is_empty() {
        out.push_str("## ");
        out.push_str(MEMO_LABEL);
        out.push('\n');
        out.push_str(&record.memo.replace("\r\n", "\n").replace('\n', HARD_BREAK));
        out.push('\n');
    }

    out
}

/// Parses a document back into a record.
///
/// Never fails. Missing parts come back empty, including `category`, which
/// the caller supplies from the document's location.
pub fn decode(text: &str) -> RecipeRecord {
    let text = text.replace("\r\n", "\n");
    let mut record = RecipeRecord::default();

    for block in tokenize(&text) {
        match block {
            Block::Heading { level: 1, text } if record.title.is_empty() => {
                record.title = text.to_string();
            }
            Block::Heading { .. } => {}
            Block::Section { kind, body } => match kind {
                SectionKind::Ingredients => {
                    record
                        .ingredients
                        .extend(body.iter().filter_map(|line| strip_bullet(line)));
                }
                SectionKind::Steps => {
                    record
                        .steps
                        .extend(body.iter().filter_map(|line| strip_ordinal(line)));
                }
                SectionKind::Memo => {
                    if !record.memo.is_empty() {
                        record.memo.push('\n');
                    }
                    record.memo.push_str(&memo_text(&body));
                }
                SectionKind::Unknown => {}
            },
        }
    }

    record.image_reference = first_image(&text).unwrap_or_default().to_string();
    record
}

/// Ingredient/step lines that survive encoding.
fn retained_lines(items: &[String]) -> impl Iterator<Item = &str> {
    items
        .iter()
        .flat_map(|item| item.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

/// Recognized level-2 section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Ingredients,
    Steps,
    Memo,
    Unknown,
}

impl SectionKind {
    fn from_heading(text: &str) -> Self {
        if text.starts_with(INGREDIENTS_LABEL) {
            Self::Ingredients
        } else if text.starts_with(STEPS_LABEL) {
            Self::Steps
        } else if text.starts_with(MEMO_LABEL) {
            Self::Memo
        } else {
            Self::Unknown
        }
    }
}

/// Structural unit of a document.
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    /// A heading that does not open a section (any level but 2).
    Heading { level: usize, text: &'a str },
    /// A level-2 heading and the raw lines (newlines kept) up to the next one.
    Section {
        kind: SectionKind,
        body: Vec<&'a str>,
    },
}

/// Splits a document into headings and level-2 sections.
///
/// Lines before the first level-2 heading that are not headings themselves
/// are dropped; inside a section only another level-2 heading ends it.
fn tokenize(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<(SectionKind, Vec<&str>)> = None;

    for line in text.split_inclusive('\n') {
        match heading(line) {
            Some((2, heading_text)) => {
                if let Some((kind, body)) = current.take() {
                    blocks.push(Block::Section { kind, body });
                }
                current = Some((SectionKind::from_heading(heading_text), Vec::new()));
            }
            Some((level, heading_text)) if current.is_none() => {
                blocks.push(Block::Heading {
                    level,
                    text: heading_text,
                });
            }
            _ => {
                if let Some((_, body)) = current.as_mut() {
                    body.push(line);
                }
            }
        }
    }

    if let Some((kind, body)) = current {
        blocks.push(Block::Section { kind, body });
    }

    blocks
}

/// Parses an ATX heading line into (level, trimmed text).
fn heading(line: &str) -> Option<(usize, &str)> {
    let line = line.trim_end_matches(&['\n', '\r'][..]);
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() {
        return Some((level, ""));
    }
    if !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    Some((level, rest.trim()))
}

/// Strips a leading `* ` or bare `*` list marker.
fn strip_bullet(line: &str) -> Option<String> {
    let line = line.trim();
    let item = line
        .strip_prefix("* ")
        .or_else(|| line.strip_prefix('*'))
        .unwrap_or(line)
        .trim();
    (!item.is_empty()).then(|| item.to_string())
}

/// Strips a leading `<digits>.` marker and at most one following space.
fn strip_ordinal(line: &str) -> Option<String> {
    let line = line.trim();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let item = if digits > 0 {
        match line[digits..].strip_prefix('.') {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => line,
        }
    } else {
        line
    };
    let item = item.trim();
    (!item.is_empty()).then(|| item.to_string())
}

/// Reassembles a memo section: hard breaks become plain newlines and the
/// newline the encoder appends after the memo is dropped.
fn memo_text(body: &[&str]) -> String {
    let joined = body.concat().replace(HARD_BREAK, "\n");
    match joined.strip_suffix('\n') {
        Some(memo) => memo.to_string(),
        None => joined,
    }
}

/// Finds the target of the first `![alt](target)` in the text.
fn first_image(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find("![") {
        let start = search_from + offset;
        search_from = start + 2;

        let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
        let line = &text[start..line_end];

        let Some(alt_end) = line.find("](") else {
            continue;
        };
        let target_start = alt_end + 2;
        let Some(target_len) = line[target_start..].find(')') else {
            continue;
        };

        let target = line[target_start..target_start + target_len].trim();
        // `![alt](path "title")`
        let target = match target.find(" \"") {
            Some(i) => target[..i].trim_end(),
            None => target,
        };
        if !target.is_empty() {
            return Some(target);
        }
    }
    None
}
