//! Comment enumeration for the regions between statements
//!
//! Regions handed out by the splitter contain only whitespace, comments and
//! stray terminators, so no string handling is needed here.

/// A comment within a region, offsets relative to the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSpan {
    pub start: usize,
    pub end: usize,
    pub block: bool,
}

impl CommentSpan {
    pub fn text<'a>(&self, region: &'a str) -> &'a str {
        &region[self.start..self.end]
    }
}

/// All `--` and `/* */` comments in a region, in order
pub fn comments_in(region: &str) -> Vec<CommentSpan> {
    let bytes = region.as_bytes();
    let mut comments = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let next = bytes.get(pos + 1).copied();
        match bytes[pos] {
            b'-' if next == Some(b'-') => {
                let end = region[pos..]
                    .find('\n')
                    .map(|p| pos + p)
                    .unwrap_or(region.len());
                comments.push(CommentSpan {
                    start: pos,
                    end,
                    block: false,
                });
                pos = end;
            }
            b'/' if next == Some(b'*') => {
                let end = region[pos + 2..]
                    .find("*/")
                    .map(|p| pos + 2 + p + 2)
                    .unwrap_or(region.len());
                comments.push(CommentSpan {
                    start: pos,
                    end,
                    block: true,
                });
                pos = end;
            }
            _ => pos += 1,
        }
    }

    comments
}
