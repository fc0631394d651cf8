//! Image path patterns
//!
//! Glob patterns for `bigImageFilePaths`, compiled to anchored regular
//! expressions. Supported syntax:
//!
//! - `*` any run of characters within one path segment, `?` one such character
//! - `**` as a whole segment crosses directories (`**/x` also matches `x`)
//! - `[abc]`, `[a-z]`, `[!abc]` / `[^abc]` character classes
//! - `{a,b}` alternation
//! - extended groups `?(a|b)`, `*(a|b)`, `+(a|b)`, `@(a|b)` and `!(a|b)`
//!
//! `regex` has no lookaround, so a `!(…)` group is compiled twice: as a
//! segment wildcard in the main expression, and as its alternatives in a
//! separate exclusion expression. A path matches when the main expression
//! matches and no exclusion does.

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Empty pattern")]
    Empty,

    #[error("Unclosed character class in '{0}'")]
    UnclosedClass(String),

    #[error("Unclosed group in '{0}'")]
    UnclosedGroup(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type PatternResult<T> = Result<T, PatternError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
    ExactlyOne,
}

#[derive(Debug, Clone)]
enum Node {
    Literal(char),
    SegmentChars,
    SegmentChar,
    /// Trailing `**`
    Globstar,
    /// `**/`, zero or more directories
    GlobstarDir,
    Class(String),
    Group {
        repeat: Repeat,
        alternatives: Vec<Vec<Node>>,
    },
    Negation {
        id: usize,
        alternatives: Vec<Vec<Node>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Top,
    Extglob,
    Brace,
}

impl Context {
    fn terminates(self, c: char) -> bool {
        match self {
            Context::Top => false,
            Context::Extglob => c == '|' || c == ')',
            Context::Brace => c == ',' || c == '}',
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    negations: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
            negations: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn unclosed_group(&self) -> PatternError {
        PatternError::UnclosedGroup(self.source.to_string())
    }

    /// Parse until a terminator of `context`, returning the terminator found.
    fn sequence(&mut self, context: Context) -> PatternResult<(Vec<Node>, Option<char>)> {
        let mut nodes = Vec::new();

        while let Some(c) = self.peek() {
            self.pos += 1;
            if context.terminates(c) {
                return Ok((nodes, Some(c)));
            }

            match c {
                '\\' => {
                    let escaped = self.peek().unwrap_or('\\');
                    self.pos += 1;
                    nodes.push(Node::Literal(escaped));
                }
                '?' | '*' | '+' | '@' | '!' if self.peek() == Some('(') => {
                    self.pos += 1;
                    nodes.push(self.extglob(c)?);
                }
                '*' => nodes.push(self.stars()),
                '?' => nodes.push(Node::SegmentChar),
                '[' => nodes.push(self.class()?),
                '{' => nodes.push(self.brace()),
                c => nodes.push(Node::Literal(c)),
            }
        }

        match context {
            Context::Top => Ok((nodes, None)),
            _ => Err(self.unclosed_group()),
        }
    }

    fn alternatives(&mut self, context: Context) -> PatternResult<Vec<Vec<Node>>> {
        let mut alternatives = Vec::new();
        loop {
            let (nodes, terminator) = self.sequence(context)?;
            alternatives.push(nodes);
            match terminator {
                Some('|') | Some(',') => continue,
                _ => return Ok(alternatives),
            }
        }
    }

    fn extglob(&mut self, marker: char) -> PatternResult<Node> {
        let id = if marker == '!' {
            self.negations += 1;
            Some(self.negations - 1)
        } else {
            None
        };
        let alternatives = self.alternatives(Context::Extglob)?;

        Ok(match (id, marker) {
            (Some(id), _) => Node::Negation { id, alternatives },
            (None, '?') => Node::Group {
                repeat: Repeat::ZeroOrOne,
                alternatives,
            },
            (None, '*') => Node::Group {
                repeat: Repeat::ZeroOrMore,
                alternatives,
            },
            (None, '+') => Node::Group {
                repeat: Repeat::OneOrMore,
                alternatives,
            },
            (None, _) => Node::Group {
                repeat: Repeat::ExactlyOne,
                alternatives,
            },
        })
    }

    fn stars(&mut self) -> Node {
        let start = self.pos - 1;
        while self.peek() == Some('*') {
            self.pos += 1;
        }
        let whole_segment = self.pos - start >= 2
            && (start == 0 || self.chars[start - 1] == '/')
            && matches!(self.peek(), None | Some('/'));

        if !whole_segment {
            return Node::SegmentChars;
        }
        if self.peek() == Some('/') {
            self.pos += 1;
            Node::GlobstarDir
        } else {
            Node::Globstar
        }
    }

    fn class(&mut self) -> PatternResult<Node> {
        let mut i = self.pos;
        let negated = matches!(self.chars.get(i), Some('!') | Some('^'));
        if negated {
            i += 1;
        }
        let first = i;
        loop {
            match self.chars.get(i) {
                None => return Err(PatternError::UnclosedClass(self.source.to_string())),
                Some(']') if i > first => break,
                _ => i += 1,
            }
        }

        let body = &self.chars[first..i];
        let mut class = String::from(if negated { "[^/" } else { "[" });
        for (idx, &ch) in body.iter().enumerate() {
            let is_range = ch == '-' && idx > 0 && idx + 1 < body.len();
            if !is_range && "\\[]^&~-".contains(ch) {
                class.push('\\');
            }
            class.push(ch);
        }
        class.push(']');

        self.pos = i + 1;
        Ok(Node::Class(class))
    }

    /// `{a,b}` alternation. Anything that is not a closed, multi-way brace is a
    /// literal `{`.
    fn brace(&mut self) -> Node {
        let (pos, negations) = (self.pos, self.negations);
        match self.alternatives(Context::Brace) {
            Ok(alternatives) if alternatives.len() > 1 => Node::Group {
                repeat: Repeat::ExactlyOne,
                alternatives,
            },
            _ => {
                self.pos = pos;
                self.negations = negations;
                Node::Literal('{')
            }
        }
    }
}

fn render(nodes: &[Node], excluded: Option<usize>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Literal(c) => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            Node::SegmentChars => out.push_str("[^/]*"),
            Node::SegmentChar => out.push_str("[^/]"),
            Node::Globstar => out.push_str(".*"),
            Node::GlobstarDir => out.push_str("(?:.*/)?"),
            Node::Class(class) => out.push_str(class),
            Node::Group {
                repeat,
                alternatives,
            } => {
                render_alternatives(alternatives, excluded, out);
                out.push_str(match repeat {
                    Repeat::ZeroOrOne => "?",
                    Repeat::ZeroOrMore => "*",
                    Repeat::OneOrMore => "+",
                    Repeat::ExactlyOne => "",
                });
            }
            Node::Negation { id, alternatives } => {
                if excluded == Some(*id) {
                    render_alternatives(alternatives, excluded, out);
                } else {
                    out.push_str("[^/]*");
                }
            }
        }
    }
}

fn render_alternatives(alternatives: &[Vec<Node>], excluded: Option<usize>, out: &mut String) {
    out.push_str("(?:");
    for (i, alternative) in alternatives.iter().enumerate() {
        if i > 0 {
            out.push('|');
        }
        render(alternative, excluded, out);
    }
    out.push(')');
}

/// One compiled image path pattern
#[derive(Debug, Clone)]
pub struct ImagePattern {
    matcher: Regex,
    exclusions: Vec<Regex>,
}

impl ImagePattern {
    pub fn parse(pattern: &str) -> PatternResult<Self> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut parser = Parser::new(pattern);
        let (nodes, _) = parser.sequence(Context::Top)?;

        let build = |excluded: Option<usize>| {
            let mut expression = String::from("^(?:");
            render(&nodes, excluded, &mut expression);
            expression.push_str(")$");
            Regex::new(&expression).map_err(|source| PatternError::Regex {
                pattern: pattern.to_string(),
                source,
            })
        };

        Ok(Self {
            matcher: build(None)?,
            exclusions: (0..parser.negations)
                .map(|id| build(Some(id)))
                .collect::<PatternResult<Vec<_>>>()?,
        })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path) && !self.exclusions.iter().any(|re| re.is_match(path))
    }
}

/// Patterns checked together; a path matches if any pattern does
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<ImagePattern>,
}

impl PatternSet {
    /// Compile every pattern, skipping the ones that fail with a warning.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| match ImagePattern::parse(pattern.as_ref()) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    tracing::warn!("Ignoring image pattern: {}", e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
