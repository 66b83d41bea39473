/// Markdown snippets the editor can wrap around or insert at the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Link,
    BulletList,
    OrderedList,
    Quote,
    CodeBlock(Option<String>),
    Table,
    TaskList,
}

const TABLE_TEMPLATE: &str = "
| Header 1 | Header 2 |
|----------|----------|
| Cell 1   | Cell 2   |
| Cell 3   | Cell 4   |
";

const TASK_LIST_TEMPLATE: &str = "
- [ ] Task 1
- [ ] Task 2
- [x] Completed task
";

impl Format {
    pub fn delimiters(&self) -> (String, String) {
        let (prefix, suffix) = match self {
            Format::Bold => ("**", "**"),
            Format::Italic => ("*", "*"),
            Format::Link => ("[", "](url)"),
            Format::BulletList => ("- ", ""),
            Format::OrderedList => ("1. ", ""),
            Format::Quote => ("> ", ""),
            Format::CodeBlock(language) => {
                let language = language.as_deref().unwrap_or("");
                return (format!("```{language}\n"), "\n```".to_string());
            }
            Format::Table => (TABLE_TEMPLATE, ""),
            Format::TaskList => (TASK_LIST_TEMPLATE, ""),
        };
        (prefix.to_string(), suffix.to_string())
    }
}

/// Result of wrapping a selection: the new text and the selection that
/// covers the originally selected text inside the delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapped {
    pub text: String,
    pub selection: (usize, usize),
}

/// Wrap `text[start..end]` in `prefix`/`suffix`. Offsets must be char
/// boundaries with `start <= end <= text.len()`.
pub fn wrap_selection(text: &str, start: usize, end: usize, prefix: &str, suffix: &str) -> Wrapped {
    let mut result = String::with_capacity(text.len() + prefix.len() + suffix.len());
    result.push_str(&text[..start]);
    result.push_str(prefix);
    result.push_str(&text[start..end]);
    result.push_str(suffix);
    result.push_str(&text[end..]);

    Wrapped {
        text: result,
        selection: (start + prefix.len(), end + prefix.len()),
    }
}
