//! Parenthesised tree rendering and its inverse.
//!
//! Format: `(left,value,right)`, an absent subtree renders as the empty string.
//! A single leaf `v` is `(,v,)`.

use crate::domain::entities::Node;
use crate::domain::error::DomainError;

/// Deepest nesting `parse_tree` accepts. Deeper input is rejected before the
/// recursive descent can exhaust the stack.
pub const MAX_NESTING: usize = 1024;

/// Render an optional tree.
pub fn render(node: Option<&Node>) -> String {
    let mut out = String::new();
    if let Some(node) = node {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    out.push('(');
    if let Some(left) = &node.left {
        write_node(left, out);
    }
    out.push(',');
    out.push_str(&node.value.to_string());
    out.push(',');
    if let Some(right) = &node.right {
        write_node(right, out);
    }
    out.push(')');
}

/// Parse a rendered tree. The empty string is the absent tree.
pub fn parse_tree(input: &str) -> Result<Option<Node>, DomainError> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
        nesting: 0,
    };
    let node = parser.subtree()?;
    if parser.pos != parser.bytes.len() {
        return Err(DomainError::TrailingInput(parser.pos));
    }
    Ok(node)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    nesting: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), DomainError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(DomainError::MalformedTree {
                position: self.pos,
                message: format!("expected '{}', found '{}'", byte as char, b as char),
            }),
            None => Err(DomainError::MalformedTree {
                position: self.pos,
                message: format!("expected '{}', found end of input", byte as char),
            }),
        }
    }

    fn subtree(&mut self) -> Result<Option<Node>, DomainError> {
        if self.peek() != Some(b'(') {
            return Ok(None);
        }
        if self.nesting == MAX_NESTING {
            return Err(DomainError::MalformedTree {
                position: self.pos,
                message: format!("nesting deeper than {MAX_NESTING}"),
            });
        }
        self.expect(b'(')?;
        self.nesting += 1;
        let left = self.subtree()?;
        self.expect(b',')?;
        let value = self.value()?;
        self.expect(b',')?;
        let right = self.subtree()?;
        self.expect(b')')?;
        self.nesting -= 1;
        Ok(Some(Node::with_children(value, left, right)))
    }

    fn value(&mut self) -> Result<i64, DomainError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b',' || b == b'(' || b == b')' {
                break;
            }
            self.pos += 1;
        }
        // Only ASCII delimiters end the slice, so it lies on char boundaries.
        let text = String::from_utf8_lossy(&self.bytes[start..self.pos]);
        text.parse::<i64>().map_err(|_| DomainError::InvalidValue {
            position: start,
            value: text.into_owned(),
        })
    }
}
