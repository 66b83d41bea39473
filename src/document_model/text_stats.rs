use unicode_width::UnicodeWidthStr;

/// 1-based cursor location for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
    pub display_column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub bytes: usize,
    pub words: usize,
    pub characters: usize,
}

/// Largest char boundary in `text` not after `offset`
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

pub fn cursor_position(text: &str, offset: usize) -> CursorPosition {
    let offset = floor_char_boundary(text, offset);
    let before = &text[..offset];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let current_line = &before[line_start..];

    CursorPosition {
        line: before.matches('\n').count() + 1,
        column: current_line.chars().count() + 1,
        display_column: current_line.width() + 1,
    }
}

pub fn document_stats(text: &str) -> DocumentStats {
    DocumentStats {
        bytes: text.len(),
        words: text.split_whitespace().count(),
        characters: text.chars().count(),
    }
}
