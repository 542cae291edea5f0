//! JSONPath-style scope selection.
//!
//! Supported grammar:
//!
//! - `$` (or `$.`) — the root; a leading `$` may be omitted
//! - `.name`, `['name']`, `["name"]` — object member
//! - `[n]`, `[-n]` — array element, negative indices count from the end
//! - `[i,j,...]` — several array elements
//! - `.*`, `[*]` — every member or element
//! - `..name`, `..*`, `..[n]` — recursive descent
//!
//! Matches are returned in document order with their normalized
//! [`FieldPath`].

use serde_json::Value;
use vouch_types::{FieldPath, Segment};

use crate::error::{DiffError, DiffResult};

#[derive(Clone, Debug, PartialEq)]
enum Selector {
    Key(String),
    Indices(Vec<i64>),
    Wildcard,
}

#[derive(Clone, Debug, PartialEq)]
enum Step {
    Child(Selector),
    Descendant(Selector),
}

/// A parsed path expression.
#[derive(Clone, Debug, PartialEq)]
pub struct PathQuery {
    expr: String,
    steps: Vec<Step>,
}

/// A node selected by a [`PathQuery`].
#[derive(Clone, Debug, PartialEq)]
pub struct Match<'a> {
    pub path: FieldPath,
    pub value: &'a Value,
}

impl PathQuery {
    /// Parse an expression.
    pub fn parse(expr: &str) -> DiffResult<Self> {
        let steps = Parser::new(expr).parse()?;
        Ok(Self {
            expr: expr.to_string(),
            steps,
        })
    }

    /// The expression as written.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Returns `true` if the expression selects the root itself.
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Every node of `tree` matched by this query, in document order.
    pub fn select<'a>(&self, tree: &'a Value) -> Vec<Match<'a>> {
        let mut current = vec![Match {
            path: FieldPath::root(),
            value: tree,
        }];
        for step in &self.steps {
            let mut next = Vec::new();
            for node in current {
                match step {
                    Step::Child(selector) => apply(selector, &node, &mut next),
                    Step::Descendant(selector) => {
                        for descendant in descendants(node) {
                            apply(selector, &descendant, &mut next);
                        }
                    }
                }
            }
            current = next;
        }
        current
    }

    /// The first node matched, if any.
    pub fn first<'a>(&self, tree: &'a Value) -> Option<Match<'a>> {
        self.select(tree).into_iter().next()
    }
}

/// Parse `expr` and select from `tree`.
pub fn select<'a>(tree: &'a Value, expr: &str) -> DiffResult<Vec<Match<'a>>> {
    Ok(PathQuery::parse(expr)?.select(tree))
}

fn apply<'a>(selector: &Selector, node: &Match<'a>, out: &mut Vec<Match<'a>>) {
    match (selector, node.value) {
        (Selector::Key(key), Value::Object(members)) => {
            if let Some((name, value)) = members.get_key_value(key) {
                out.push(Match {
                    path: node.path.join(Segment::Key(name.clone())),
                    value,
                });
            }
        }
        (Selector::Indices(indices), Value::Array(items)) => {
            for &index in indices {
                let resolved = if index < 0 {
                    items.len().checked_sub(index.unsigned_abs() as usize)
                } else {
                    Some(index as usize)
                };
                if let Some((i, value)) = resolved.and_then(|i| items.get(i).map(|v| (i, v))) {
                    out.push(Match {
                        path: node.path.join(Segment::Index(i)),
                        value,
                    });
                }
            }
        }
        (Selector::Wildcard, Value::Array(items)) => {
            for (i, value) in items.iter().enumerate() {
                out.push(Match {
                    path: node.path.join(Segment::Index(i)),
                    value,
                });
            }
        }
        (Selector::Wildcard, Value::Object(members)) => {
            for (name, value) in members {
                out.push(Match {
                    path: node.path.join(Segment::Key(name.clone())),
                    value,
                });
            }
        }
        _ => {}
    }
}

/// `node` followed by every node below it, pre-order.
fn descendants(node: Match<'_>) -> Vec<Match<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        match current.value {
            Value::Array(items) => {
                for (i, value) in items.iter().enumerate().rev() {
                    stack.push(Match {
                        path: current.path.join(Segment::Index(i)),
                        value,
                    });
                }
            }
            Value::Object(members) => {
                for (name, value) in members.iter().rev() {
                    stack.push(Match {
                        path: current.path.join(Segment::Key(name.clone())),
                        value,
                    });
                }
            }
            _ => {}
        }
        out.push(current);
    }
    out
}

struct Parser<'e> {
    expr: &'e str,
    chars: Vec<char>,
    pos: usize,
}

impl<'e> Parser<'e> {
    fn new(expr: &'e str) -> Self {
        Self {
            expr,
            chars: expr.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DiffError {
        DiffError::InvalidPath {
            path: self.expr.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        self.pos += 1;
        ch
    }

    fn parse(mut self) -> DiffResult<Vec<Step>> {
        if self.chars.is_empty() {
            return Err(self.error("expression is empty"));
        }

        let mut steps = Vec::new();
        match self.peek() {
            Some('$') => {
                self.pos += 1;
            }
            Some('[') | Some('.') => {}
            Some(_) => steps.push(Step::Child(self.member_name()?)),
            None => {}
        }

        while let Some(ch) = self.bump() {
            match ch {
                '.' if self.peek() == Some('.') => {
                    self.pos += 1;
                    let selector = match self.peek() {
                        Some('[') => {
                            self.pos += 1;
                            self.bracket()?
                        }
                        Some(_) => self.member_name()?,
                        None => return Err(self.error("recursive descent needs a selector")),
                    };
                    steps.push(Step::Descendant(selector));
                }
                // `$.` on its own names the root.
                '.' if self.peek().is_none() && steps.is_empty() => {}
                '.' => steps.push(Step::Child(self.member_name()?)),
                '[' => steps.push(Step::Child(self.bracket()?)),
                other => {
                    return Err(self.error(format!(
                        "unexpected character {other:?} at position {}",
                        self.pos - 1
                    )))
                }
            }
        }
        Ok(steps)
    }

    /// A dotted member: `*` or a name running up to the next `.` or `[`.
    fn member_name(&mut self) -> DiffResult<Selector> {
        if self.peek() == Some('*') {
            self.pos += 1;
            return Ok(Selector::Wildcard);
        }
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '.' || ch == '[' {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error(format!("empty member name at position {start}")));
        }
        Ok(Selector::Key(self.chars[start..self.pos].iter().collect()))
    }

    /// The inside of `[...]`, consuming the closing bracket.
    fn bracket(&mut self) -> DiffResult<Selector> {
        let start = self.pos;
        let selector = match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.pos += 1;
                let name_start = self.pos;
                while self.peek().is_some_and(|ch| ch != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("unterminated quoted member"));
                }
                let name: String = self.chars[name_start..self.pos].iter().collect();
                self.pos += 1;
                Selector::Key(name)
            }
            _ => {
                while self.peek().is_some_and(|ch| ch != ']') {
                    self.pos += 1;
                }
                let body: String = self.chars[start..self.pos].iter().collect();
                let body = body.trim();
                if body == "*" {
                    Selector::Wildcard
                } else {
                    let indices = body
                        .split(',')
                        .map(|part| part.trim().parse::<i64>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|_| self.error(format!("invalid index list [{body}]")))?;
                    Selector::Indices(indices)
                }
            }
        };
        match self.bump() {
            Some(']') => Ok(selector),
            _ => Err(self.error("missing closing ']'")),
        }
    }
}
