//! Fenced code block scanning.
//!
//! A line-oriented scanner that splits markdown into plain text runs and
//! fenced blocks. Every byte of the input belongs to exactly one segment, so
//! concatenating the segments' raw text reproduces the document.

/// A piece of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any fenced block, copied through verbatim.
    Text(&'a str),
    /// A fenced code block.
    Block(FencedBlock<'a>),
}

impl<'a> Segment<'a> {
    /// The exact input text this segment covers.
    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Text(text) => text,
            Segment::Block(block) => block.raw,
        }
    }
}

/// One fenced code block and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// First word of the info string (`graphviz` in ```` ```graphviz {.x} ````).
    pub tag: &'a str,
    /// Whole info string, trimmed.
    pub info: &'a str,
    /// Lines between the fences, without the final line break.
    pub source: &'a str,
    /// Opening fence through closing fence, including the trailing newline.
    pub raw: &'a str,
    /// 1-based line number of the opening fence.
    pub line: usize,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

/// Split markdown into text and fenced blocks, in document order.
///
/// A block opens on a line of three or more backticks or tildes indented by
/// at most three spaces, and closes on a line of the same character at least
/// as long with nothing else on it. An unclosed block runs to end of input.
pub fn split_fenced_blocks(markdown: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut offset = 0;
    let mut lines = markdown.split_inclusive('\n').enumerate();

    while let Some((index, line)) = lines.next() {
        let line_start = offset;
        offset += line.len();

        let Some((fence, info)) = opening_fence(line) else {
            continue;
        };

        if line_start > text_start {
            segments.push(Segment::Text(&markdown[text_start..line_start]));
        }

        let body_start = offset;
        let mut body_end = markdown.len();
        for (_, inner) in lines.by_ref() {
            let inner_start = offset;
            offset += inner.len();
            if is_closing_fence(inner, fence) {
                body_end = inner_start;
                break;
            }
        }

        let source = trim_line_break(&markdown[body_start..body_end]);
        segments.push(Segment::Block(FencedBlock {
            tag: info.split_whitespace().next().unwrap_or(""),
            info,
            source,
            raw: &markdown[line_start..offset],
            line: index + 1,
        }));
        text_start = offset;
    }

    if text_start < markdown.len() {
        segments.push(Segment::Text(&markdown[text_start..]));
    }

    segments
}

/// Recognise an opening fence, returning it with its trimmed info string.
fn opening_fence(line: &str) -> Option<(Fence, &str)> {
    let content = strip_indent(trim_line_break(line))?;
    let marker = content.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = content.chars().take_while(|&c| c == marker).count();
    if len < 3 {
        return None;
    }

    let info = content[len..].trim();
    // A backtick fence's info string may not contain backticks (inline code).
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some((Fence { marker, len }, info))
}

fn is_closing_fence(line: &str, fence: Fence) -> bool {
    let Some(content) = strip_indent(trim_line_break(line)) else {
        return false;
    };
    let len = content.chars().take_while(|&c| c == fence.marker).count();
    len >= fence.len && content[len..].trim().is_empty()
}

/// Strip up to three spaces of indentation; four or more is an indented line.
fn strip_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    (indent <= 3).then(|| &line[indent..])
}

fn trim_line_break(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks<'a>(segments: &'a [Segment<'a>]) -> Vec<&'a FencedBlock<'a>> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::Block(b) => Some(b),
                Segment::Text(_) => None,
            })
            .collect()
    }

    fn rejoin(segments: &[Segment<'_>]) -> String {
        segments.iter().map(Segment::raw).collect()
    }

    #[test]
    fn test_single_block() {
        let md = "# Title\n\n```graphviz\ndigraph G {A->B}\n```\nafter\n";
        let segments = split_fenced_blocks(md);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Text("# Title\n\n"));
        let block = blocks(&segments)[0];
        assert_eq!(block.tag, "graphviz");
        assert_eq!(block.source, "digraph G {A->B}");
        assert_eq!(block.raw, "```graphviz\ndigraph G {A->B}\n```\n");
        assert_eq!(block.line, 3);
        assert_eq!(segments[2], Segment::Text("after\n"));
        assert_eq!(rejoin(&segments), md);
    }

    #[test]
    fn test_multiline_source_keeps_inner_newlines() {
        let md = "```ditaa\n+--+\n|  |\n+--+\n```";
        let segments = split_fenced_blocks(md);
        let block = blocks(&segments)[0];
        assert_eq!(block.source, "+--+\n|  |\n+--+");
        assert_eq!(block.raw, md);
    }

    #[test]
    fn test_tag_is_first_word_of_info() {
        let md = "~~~  plantuml title=\"x\"\nA -> B\n~~~\n";
        let segments = split_fenced_blocks(md);
        let block = blocks(&segments)[0];
        assert_eq!(block.tag, "plantuml");
        assert_eq!(block.info, "plantuml title=\"x\"");
    }

    #[test]
    fn test_closing_fence_must_match_marker_and_length() {
        let md = "````erd\n```\n~~~~\n````\ntail";
        let segments = split_fenced_blocks(md);
        let block = blocks(&segments)[0];
        assert_eq!(block.source, "```\n~~~~");
        assert_eq!(segments.last(), Some(&Segment::Text("tail")));
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let md = "intro\n```nomnoml\n[A]->[B]\n";
        let segments = split_fenced_blocks(md);
        assert_eq!(segments.len(), 2);
        let block = blocks(&segments)[0];
        assert_eq!(block.source, "[A]->[B]");
        assert_eq!(rejoin(&segments), md);
    }

    #[test]
    fn test_fences_inside_block_are_not_reopened() {
        let md = "```\n```graphviz\n```\n";
        let segments = split_fenced_blocks(md);
        let found = blocks(&segments);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, "");
        assert_eq!(found[0].source, "```graphviz");
    }

    #[test]
    fn test_not_a_fence() {
        for md in ["``graphviz\nx\n``\n", "    ```graphviz\nx\n", "```a`b\nx\n"] {
            assert!(blocks(&split_fenced_blocks(md)).is_empty(), "{md:?}");
        }
    }

    #[test]
    fn test_crlf_line_endings() {
        let md = "```svgbob\r\n-->\r\n```\r\nend\r\n";
        let segments = split_fenced_blocks(md);
        let block = blocks(&segments)[0];
        assert_eq!(block.tag, "svgbob");
        assert_eq!(block.source, "-->");
        assert_eq!(rejoin(&segments), md);
    }

    #[test]
    fn test_empty_block_and_empty_document() {
        assert!(split_fenced_blocks("").is_empty());
        let segments = split_fenced_blocks("```wavedrom\n```\n");
        assert_eq!(blocks(&segments)[0].source, "");
    }
}
