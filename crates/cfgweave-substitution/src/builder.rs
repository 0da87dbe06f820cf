//! Recursive-descent parser for substitution regions.

use crate::node::SubstitutionNode;
use cfgweave_model::{GResult, ValidationError};

/// Default token opening a substitution region.
pub const DEFAULT_OPENING_TOKEN: &str = "${";

/// Default token closing a substitution region.
pub const DEFAULT_CLOSING_TOKEN: &str = "}";

const ESCAPE_CHAR: u8 = b'\\';

/// Parses a raw leaf value into a tree of [`SubstitutionNode`]s.
#[derive(Debug, Clone)]
pub struct SubstitutionTreeBuilder {
    opening: String,
    closing: String,
    max_depth: usize,
}

impl Default for SubstitutionTreeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_OPENING_TOKEN, DEFAULT_CLOSING_TOKEN, 5)
    }
}

/// State of one parse.
struct Scan<'a> {
    path: &'a str,
    value: &'a str,
    base_depth: usize,
    errors: Vec<ValidationError>,
    aborted: bool,
}

impl SubstitutionTreeBuilder {
    pub fn new(opening: impl Into<String>, closing: impl Into<String>, max_depth: usize) -> Self {
        Self {
            opening: opening.into(),
            closing: closing.into(),
            max_depth,
        }
    }

    pub fn opening_token(&self) -> &str {
        &self.opening
    }

    pub fn closing_token(&self) -> &str {
        &self.closing
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// True if `value` contains the opening token, escaped or not.
    pub fn may_contain_substitution(&self, value: &str) -> bool {
        value.contains(self.opening.as_str())
    }

    /// Parse `value` into substitution nodes.
    ///
    /// The returned nodes are the top-level sequence of text and transform
    /// nodes. Any error (unexpected closing token, unclosed region, depth
    /// exceeded) means no nodes are returned.
    pub fn build(&self, path: &str, value: &str) -> GResult<Vec<SubstitutionNode>> {
        self.build_at_depth(path, value, 0)
    }

    /// Parse `value` as if it were already nested `base_depth` levels deep.
    ///
    /// Used when the result of a transform is expanded again.
    pub fn build_at_depth(
        &self,
        path: &str,
        value: &str,
        base_depth: usize,
    ) -> GResult<Vec<SubstitutionNode>> {
        let mut scan = Scan {
            path,
            value,
            base_depth,
            errors: Vec::new(),
            aborted: false,
        };
        let (nodes, _) = self.parse_region(&mut scan, 0, 0);

        if scan.errors.is_empty() {
            GResult::ok(nodes)
        } else {
            GResult::fail(scan.errors)
        }
    }

    /// Parse from `start` until the region closes (depth > 0) or input ends.
    ///
    /// Returns the region's nodes and the byte offset just past it.
    fn parse_region(
        &self,
        scan: &mut Scan<'_>,
        start: usize,
        depth: usize,
    ) -> (Vec<SubstitutionNode>, usize) {
        let bytes = scan.value.as_bytes();
        let length = bytes.len();
        let mut nodes = Vec::new();
        let mut last = start;
        // Escaped openings seen in this region; each pairs with the next closing token.
        let mut escaped_open = 0usize;
        let mut i = start;

        while i < length {
            if self.token_at(bytes, i, &self.opening) {
                if i > last {
                    nodes.push(SubstitutionNode::Text(self.unescape(&scan.value[last..i])));
                }
                if scan.base_depth + depth + 1 > self.max_depth {
                    scan.errors.push(ValidationError::SubstitutionDepthExceeded {
                        path: scan.path.to_string(),
                        value: scan.value.to_string(),
                        max_depth: self.max_depth,
                    });
                    scan.aborted = true;
                    return (nodes, length);
                }

                let (inner, end) = self.parse_region(scan, i + self.opening.len(), depth + 1);
                if scan.aborted {
                    return (nodes, length);
                }
                nodes.push(SubstitutionNode::Transform(inner));
                i = end;
                last = end;
                continue;
            }

            if self.escaped_token_at(bytes, i, &self.opening) {
                escaped_open += 1;
                i += self.opening.len();
                continue;
            }

            if self.token_at(bytes, i, &self.closing) {
                if escaped_open > 0 {
                    escaped_open -= 1;
                } else if depth == 0 {
                    scan.errors.push(ValidationError::UnexpectedClosingTokenTransform {
                        path: scan.path.to_string(),
                        value: scan.value.to_string(),
                        token: self.closing.clone(),
                        index: i,
                    });
                } else {
                    if i > last {
                        nodes.push(SubstitutionNode::Text(self.unescape(&scan.value[last..i])));
                    }
                    return (nodes, i + self.closing.len());
                }
            }

            i += 1;
        }

        if depth > 0 {
            scan.errors.push(ValidationError::UnclosedSubstitutionTransform {
                path: scan.path.to_string(),
                value: scan.value.to_string(),
            });
        }

        // Always leave at least one text node for an empty top-level value.
        if last < length || (depth == 0 && length == start) {
            nodes.push(SubstitutionNode::Text(self.unescape(&scan.value[last..length])));
        }

        (nodes, length)
    }

    /// `token` starts at `i` and is not preceded by the escape character.
    fn token_at(&self, bytes: &[u8], i: usize, token: &str) -> bool {
        bytes[i..].starts_with(token.as_bytes()) && (i == 0 || bytes[i - 1] != ESCAPE_CHAR)
    }

    /// `token` starts at `i` and is preceded by the escape character.
    fn escaped_token_at(&self, bytes: &[u8], i: usize, token: &str) -> bool {
        i > 0 && bytes[i - 1] == ESCAPE_CHAR && bytes[i..].starts_with(token.as_bytes())
    }

    fn unescape(&self, text: &str) -> String {
        let escaped_open = format!("{}{}", ESCAPE_CHAR as char, self.opening);
        let escaped_close = format!("{}{}", ESCAPE_CHAR as char, self.closing);
        text.replace(&escaped_open, &self.opening)
            .replace(&escaped_close, &self.closing)
    }
}
