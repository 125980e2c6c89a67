//! Source text with a line index
//!
//! Every offset handled here is a byte offset into the original text.

/// Immutable file contents plus the byte offset of every line start
#[derive(Debug)]
pub struct SourceFile<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceFile<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 1-indexed line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// 1-indexed (line, column); columns count characters, not bytes
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = self.line_of(offset);
        let start = self.line_starts[line - 1];
        let column = self
            .text
            .get(start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0)
            + 1;
        (line, column)
    }

    /// Offset of the first byte of the line containing `offset`
    pub fn line_start(&self, offset: usize) -> usize {
        self.line_starts[self.line_of(offset) - 1]
    }

    /// Offset of the line terminator (`\r\n` or `\n`) ending the line containing `offset`,
    /// or the end of the text for the last line
    pub fn line_end(&self, offset: usize) -> usize {
        let offset = offset.min(self.text.len());
        match self.text[offset..].find('\n') {
            Some(rel) => {
                let newline = offset + rel;
                if newline > offset && self.text.as_bytes()[newline - 1] == b'\r' {
                    newline - 1
                } else {
                    newline
                }
            }
            None => self.text.len(),
        }
    }

    /// Offset just past the line terminator of the line containing `offset`
    pub fn next_line_start(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// Leading whitespace of the line containing `offset`
    pub fn indentation(&self, offset: usize) -> &'a str {
        let start = self.line_start(offset);
        let line = &self.text[start..self.line_end(offset)];
        let width = line.len() - line.trim_start_matches([' ', '\t']).len();
        &line[..width]
    }

    /// True when nothing but indentation precedes `offset` on its line
    pub fn starts_line(&self, offset: usize) -> bool {
        self.text[self.line_start(offset)..offset]
            .chars()
            .all(|c| c == ' ' || c == '\t' || c == '\x0c')
    }

    /// True when only whitespace or a comment follows `offset` on its line
    pub fn ends_line(&self, offset: usize) -> bool {
        let rest = self.text[offset..self.line_end(offset)].trim_start();
        rest.is_empty() || rest.starts_with('#')
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        self.text.get(start..end).unwrap_or_default()
    }

    /// Newline sequence used by the file, defaulting to `\n`
    pub fn newline(&self) -> &'static str {
        match self.text.find('\n') {
            Some(idx) if idx > 0 && self.text.as_bytes()[idx - 1] == b'\r' => "\r\n",
            _ => "\n",
        }
    }
}
