// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! JSONPath-style queries over [`Value`] documents.
//!
//! Supported syntax:
//!
//! - `$` or `@`: the scope the query is resolved against.
//! - `.name`, `['name']`, `["name"]`: object member.
//! - `.*`, `[*]`: every member or element.
//! - `[n]`: array element, negative indices count from the end.
//! - `[start:end:step]`: array slice.
//! - `[a,b]`: union of selectors.
//! - `..name`, `..*`, `..[selector]`: deep descent.

use crate::error::{Error, Result};
use crate::value::Value;

use core::fmt;
use core::iter::Peekable;
use core::str::CharIndices;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Name(Arc<str>),
    Wildcard,
    Index(i64),
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Child(Vec<Selector>),
    Descendant(Vec<Selector>),
}

/// A parsed path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    text: Arc<str>,
    segments: Vec<Segment>,
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Parse `query` and resolve it against `scope` using the collapse rule of
/// [`PathQuery::resolve`].
pub fn resolve(query: &str, scope: &Value) -> Result<Value> {
    Ok(PathQuery::parse(query)?.resolve(scope))
}

impl PathQuery {
    pub fn parse(query: &str) -> Result<PathQuery> {
        let segments = QueryParser::new(query).parse()?;
        Ok(PathQuery {
            text: query.into(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// All matching locations in document order.
    pub fn find<'v>(&self, scope: &'v Value) -> Vec<&'v Value> {
        let mut nodes = vec![scope];
        for segment in &self.segments {
            let mut matched = vec![];
            match segment {
                Segment::Child(selectors) => {
                    for &node in &nodes {
                        for selector in selectors {
                            select(selector, node, &mut matched);
                        }
                    }
                }
                Segment::Descendant(selectors) => {
                    for &node in &nodes {
                        let mut descendants = vec![];
                        collect_descendants(node, &mut descendants);
                        for d in descendants {
                            for selector in selectors {
                                select(selector, d, &mut matched);
                            }
                        }
                    }
                }
            }
            nodes = matched;
        }
        nodes
    }

    /// One match is returned unwrapped, several as an array in document
    /// order and none as [`Value::Undefined`].
    pub fn resolve(&self, scope: &Value) -> Value {
        let mut matches = self.find(scope);
        match matches.len() {
            0 => Value::Undefined,
            1 => matches.pop().cloned().unwrap_or(Value::Undefined),
            _ => Value::from(matches.into_iter().cloned().collect::<Vec<_>>()),
        }
    }
}

fn select<'v>(selector: &Selector, node: &'v Value, out: &mut Vec<&'v Value>) {
    match (selector, node) {
        (Selector::Name(name), Value::Object(fields)) => {
            if let Some(v) = fields.get(name.as_ref()) {
                out.push(v);
            }
        }
        (Selector::Wildcard, Value::Object(fields)) => out.extend(fields.values()),
        (Selector::Wildcard, Value::Array(items)) => out.extend(items.iter()),
        (Selector::Index(idx), Value::Array(items)) => {
            let len = items.len() as i64;
            let idx = if *idx < 0 { len + idx } else { *idx };
            if (0..len).contains(&idx) {
                out.push(&items[idx as usize]);
            }
        }
        (Selector::Slice { start, end, step }, Value::Array(items)) => {
            for idx in slice_indices(items.len() as i64, *start, *end, *step) {
                out.push(&items[idx]);
            }
        }
        _ => (),
    }
}

fn slice_indices(len: i64, start: Option<i64>, end: Option<i64>, step: i64) -> Vec<usize> {
    let normalize = |i: i64| if i >= 0 { i } else { len.saturating_add(i) };
    let mut indices = vec![];
    if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, len);
        let upper = normalize(end.unwrap_or(len)).clamp(0, len);
        let mut i = lower;
        while i < upper {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else {
        let upper = normalize(start.unwrap_or(len - 1)).clamp(-1, len - 1);
        let lower = match end {
            Some(e) => normalize(e).clamp(-1, len - 1),
            None => -1,
        };
        let mut i = upper;
        while lower < i {
            indices.push(i as usize);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    }
    indices
}

// Pre-order: a node precedes its children.
fn collect_descendants<'v>(node: &'v Value, out: &mut Vec<&'v Value>) {
    out.push(node);
    match node {
        Value::Object(fields) => {
            for v in fields.values() {
                collect_descendants(v, out);
            }
        }
        Value::Array(items) => {
            for v in items.iter() {
                collect_descendants(v, out);
            }
        }
        _ => (),
    }
}

struct QueryParser<'a> {
    query: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> QueryParser<'a> {
    fn new(query: &'a str) -> Self {
        Self {
            query,
            chars: query.char_indices().peekable(),
        }
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> Error {
        Error::PathResolution {
            query: self.query.to_string(),
            position,
            reason: reason.into(),
        }
    }

    fn position(&mut self) -> usize {
        match self.chars.peek() {
            Some((pos, _)) => *pos,
            None => self.query.len(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        let pos = self.position();
        match self.chars.next() {
            Some((_, ch)) if ch == expected => Ok(()),
            Some((_, ch)) => Err(self.error(pos, format!("expected `{expected}`, found `{ch}`"))),
            None => Err(self.error(pos, format!("expected `{expected}`"))),
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>> {
        match self.chars.next() {
            Some((_, '$')) | Some((_, '@')) => (),
            _ => return Err(self.error(0, "query must start with `$` or `@`")),
        }

        let mut segments = vec![];
        while let Some(ch) = self.peek() {
            let pos = self.position();
            match ch {
                '.' => {
                    self.chars.next();
                    if self.peek() == Some('.') {
                        self.chars.next();
                        let selectors = match self.peek() {
                            Some('[') => self.bracket()?,
                            Some('*') => {
                                self.chars.next();
                                vec![Selector::Wildcard]
                            }
                            _ => vec![Selector::Name(self.name()?)],
                        };
                        segments.push(Segment::Descendant(selectors));
                    } else if self.peek() == Some('*') {
                        self.chars.next();
                        segments.push(Segment::Child(vec![Selector::Wildcard]));
                    } else {
                        segments.push(Segment::Child(vec![Selector::Name(self.name()?)]));
                    }
                }
                '[' => segments.push(Segment::Child(self.bracket()?)),
                _ => return Err(self.error(pos, format!("unexpected character `{ch}`"))),
            }
        }
        Ok(segments)
    }

    fn name(&mut self) -> Result<Arc<str>> {
        let start = self.position();
        while matches!(self.peek(), Some(ch) if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '$')
        {
            self.chars.next();
        }
        let end = self.position();
        if start == end {
            return Err(self.error(start, "expected a member name"));
        }
        Ok(self.query[start..end].into())
    }

    fn bracket(&mut self) -> Result<Vec<Selector>> {
        self.expect('[')?;
        let mut selectors = vec![];
        loop {
            self.skip_ws();
            selectors.push(self.selector()?);
            self.skip_ws();
            let pos = self.position();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, ']')) => break,
                Some((_, ch)) => {
                    return Err(self.error(pos, format!("expected `,` or `]`, found `{ch}`")))
                }
                None => return Err(self.error(pos, "unterminated `[`")),
            }
        }
        Ok(selectors)
    }

    fn selector(&mut self) -> Result<Selector> {
        let pos = self.position();
        match self.peek() {
            Some(quote @ ('\'' | '"')) => Ok(Selector::Name(self.quoted(quote)?)),
            Some('*') => {
                self.chars.next();
                Ok(Selector::Wildcard)
            }
            Some('?') => Err(self.error(pos, "filter expressions are not supported")),
            Some(ch) if ch == '-' || ch == ':' || ch.is_ascii_digit() => self.index_or_slice(),
            Some(ch) => Err(self.error(pos, format!("unexpected character `{ch}`"))),
            None => Err(self.error(pos, "unterminated `[`")),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<Arc<str>> {
        let start = self.position();
        self.chars.next();
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, ch)) => text.push(ch),
                    None => break,
                },
                Some((_, ch)) if ch == quote => return Ok(text.into()),
                Some((_, ch)) => text.push(ch),
                None => break,
            }
        }
        Err(self.error(start, "unterminated string"))
    }

    fn integer(&mut self) -> Result<Option<i64>> {
        let start = self.position();
        if self.peek() == Some('-') {
            self.chars.next();
        }
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.chars.next();
        }
        let end = self.position();
        match &self.query[start..end] {
            "" => Ok(None),
            text => match text.parse::<i64>() {
                Ok(n) => Ok(Some(n)),
                Err(_) => Err(self.error(start, format!("invalid integer `{text}`"))),
            },
        }
    }

    fn index_or_slice(&mut self) -> Result<Selector> {
        let pos = self.position();
        let start = self.integer()?;
        if self.peek() != Some(':') {
            return match start {
                Some(idx) => Ok(Selector::Index(idx)),
                None => Err(self.error(pos, "expected an index")),
            };
        }
        self.chars.next();
        self.skip_ws();
        let end = self.integer()?;
        self.skip_ws();
        let mut step = 1;
        if self.peek() == Some(':') {
            self.chars.next();
            self.skip_ws();
            let step_pos = self.position();
            step = self.integer()?.unwrap_or(1);
            if step == 0 {
                return Err(self.error(step_pos, "slice step cannot be zero"));
            }
        }
        Ok(Selector::Slice { start, end, step })
    }
}
