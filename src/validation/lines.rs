//! Source line lookup for YAML keys.
//!
//! `serde_yaml` values carry no positions, so entries are located by scanning the source text
//! with block-style YAML indentation rules. Flow-style collections are not followed; lookups
//! inside them resolve to the closest enclosing block key.

/// One step of a path into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Mapping key
    Key(&'a str),
    /// Sequence index
    Index(usize),
}

#[derive(Debug)]
struct Line<'a> {
    /// Column of a leading `- `, if the line starts a sequence item
    dash: Option<usize>,
    /// Column where the line's content starts (after any dash)
    col: usize,
    content: &'a str,
}

/// Maps document paths to one-based line numbers.
#[derive(Debug)]
pub(crate) struct LineLocator<'a> {
    lines: Vec<Option<Line<'a>>>,
}

impl<'a> LineLocator<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let lines = source.lines().map(parse_line).collect();
        Self {
            lines,
        }
    }

    /// Line of the node at `path`, or of its deepest locatable ancestor.
    pub(crate) fn locate(&self, path: &[Segment<'_>]) -> usize {
        let mut start = 0;
        let mut end = self.lines.len();
        let mut parent_col: Option<usize> = None;
        let mut found = 1;

        for segment in path {
            let hit = match segment {
                Segment::Key(key) => self.find_key(start, end, parent_col, key),
                Segment::Index(index) => self.find_item(start, end, parent_col, *index),
            };
            let Some((line, next_start, next_end, col)) = hit else {
                break;
            };
            found = line + 1;
            start = next_start;
            end = next_end;
            parent_col = Some(col);
        }

        found
    }

    fn content_lines(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, &Line<'a>)> {
        self.lines[start..end]
            .iter()
            .enumerate()
            .filter_map(move |(offset, line)| line.as_ref().map(|l| (start + offset, l)))
    }

    fn find_key(
        &self,
        start: usize,
        end: usize,
        parent_col: Option<usize>,
        key: &str,
    ) -> Option<(usize, usize, usize, usize)> {
        let is_child = |line: &Line<'_>| parent_col.is_none_or(|p| line.col > p);
        let child_col = self.content_lines(start, end).find(|(_, l)| is_child(l))?.1.col;

        let (index, line) = self
            .content_lines(start, end)
            .find(|(_, l)| l.col == child_col && starts_with_key(l.content, key))?;

        let block_end = self
            .content_lines(index + 1, end)
            .find(|(_, l)| match l.dash {
                Some(dash) => dash < line.col,
                None => l.col <= line.col,
            })
            .map_or(end, |(i, _)| i);

        Some((index, index + 1, block_end, line.col))
    }

    fn find_item(
        &self,
        start: usize,
        end: usize,
        parent_col: Option<usize>,
        wanted: usize,
    ) -> Option<(usize, usize, usize, usize)> {
        let item_col = self
            .content_lines(start, end)
            .find_map(|(_, l)| l.dash.filter(|d| parent_col.is_none_or(|p| *d >= p)))?;

        let mut items = self
            .content_lines(start, end)
            .filter(|(_, l)| l.dash == Some(item_col))
            .map(|(i, _)| i);
        let index = items.nth(wanted)?;

        let item_end = self
            .content_lines(index + 1, end)
            .find(|(_, l)| match l.dash {
                Some(dash) => dash <= item_col,
                None => l.col <= item_col,
            })
            .map_or(end, |(i, _)| i);

        Some((index, index, item_end, item_col))
    }
}

fn parse_line(raw: &str) -> Option<Line<'_>> {
    let trimmed = raw.trim_start_matches(' ');
    let indent = raw.len() - trimmed.len();
    if trimmed.trim().is_empty() || trimmed.starts_with('#') {
        return None;
    }

    if trimmed == "-" || trimmed.starts_with("- ") {
        let rest = trimmed[1..].trim_start_matches(' ');
        let col = indent + (trimmed.len() - rest.len());
        return Some(Line {
            dash: Some(indent),
            col,
            content: rest,
        });
    }

    Some(Line {
        dash: None,
        col: indent,
        content: trimmed,
    })
}

fn starts_with_key(content: &str, key: &str) -> bool {
    let rest = if let Some(rest) = content.strip_prefix('"') {
        rest.strip_prefix(key).and_then(|r| r.strip_prefix('"'))
    } else if let Some(rest) = content.strip_prefix('\'') {
        rest.strip_prefix(key).and_then(|r| r.strip_prefix('\''))
    } else {
        content.strip_prefix(key)
    };

    match rest.and_then(|r| r.trim_start_matches(' ').strip_prefix(':')) {
        Some(after) => after.is_empty() || after.starts_with([' ', '\t']),
        None => false,
    }
}
