//! DOT reader.
//!
//! Reads the first graph of a DOT document into a [`Graph`]. Ports are accepted and ignored;
//! subgraphs only scope `node`/`edge` defaults and group edge operands.

mod lexer;

use crate::attr::AttrKind;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use indexmap::IndexMap;
use lexer::{LexError, Lexer, Tok};

type Spanned = (usize, Tok, usize);
type AttrList = Vec<(String, String)>;

/// Parses DOT source text into a graph.
pub fn parse(input: &str) -> Result<Graph> {
    let tokens = Lexer::new(input)
        .collect::<std::result::Result<Vec<_>, LexError>>()
        .map_err(|e| error_at(input, e.offset, e.message))?;
    let mut parser = Parser {
        input,
        tokens,
        pos: 0,
        graph: None,
        scopes: Vec::new(),
    };
    parser.parse_graph()
}

#[derive(Debug, Clone, Default)]
struct Scope {
    node: IndexMap<String, String>,
    edge: IndexMap<String, String>,
    /// Nodes mentioned in this scope, in first-mention order.
    members: Vec<NodeId>,
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    graph: Option<Graph>,
    scopes: Vec<Scope>,
}

fn error_at(input: &str, offset: usize, message: impl Into<String>) -> Error {
    let offset = offset.min(input.len());
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |i| before[i + 1..].chars().count())
        + 1;
    Error::Parse {
        line,
        column,
        message: message.into(),
    }
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(_, t, _)| t)
    }

    fn peek_at(&self, n: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + n).map(|(_, t, _)| t)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|(_, t, _)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.input.len(), |(start, _, _)| *start);
        error_at(self.input, offset, message)
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(t) => self.error(format!("expected {expected}, found {}", t.describe())),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<()> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(self.unexpected(&tok.describe()))
        }
    }

    fn graph_mut(&mut self) -> &mut Graph {
        self.graph
            .get_or_insert_with(|| Graph::open(String::new()))
    }

    fn is_id(tok: Option<&Tok>) -> bool {
        matches!(tok, Some(Tok::Id(_) | Tok::Str(_) | Tok::Html(_)))
    }

    /// Reads an ID, joining `"a" + "b"` concatenations.
    fn id(&mut self) -> Result<String> {
        if !Self::is_id(self.peek()) {
            return Err(self.unexpected("identifier"));
        }
        match self.bump() {
            Some(Tok::Id(s)) | Some(Tok::Html(s)) => Ok(s),
            Some(Tok::Str(mut s)) => {
                while self.eat(&Tok::Plus) {
                    let Some(Tok::Str(more)) = self.peek().cloned() else {
                        return Err(self.unexpected("quoted string after '+'"));
                    };
                    self.pos += 1;
                    s.push_str(&more);
                }
                Ok(s)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn parse_graph(&mut self) -> Result<Graph> {
        let strict = self.eat(&Tok::Strict);
        let directed = match self.peek() {
            Some(Tok::Digraph) => true,
            Some(Tok::Graph) => false,
            _ => return Err(self.unexpected("'graph' or 'digraph'")),
        };
        self.pos += 1;
        let name = if Self::is_id(self.peek()) {
            self.id()?
        } else {
            String::new()
        };
        self.graph = Some(Graph::with_kind(name, directed, strict));
        self.expect(Tok::LBrace)?;
        self.scopes.push(Scope::default());
        self.stmt_list()?;
        self.expect(Tok::RBrace)?;
        self.scopes.pop();

        let graph = self.graph.take().unwrap_or_else(|| Graph::open(String::new()));
        tracing::debug!(
            graph = graph.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "parsed DOT graph"
        );
        Ok(graph)
    }

    fn stmt_list(&mut self) -> Result<()> {
        while !matches!(self.peek(), Some(Tok::RBrace) | None) {
            self.stmt()?;
            self.eat(&Tok::Semi);
        }
        Ok(())
    }

    fn stmt(&mut self) -> Result<()> {
        match self.peek() {
            Some(Tok::Graph) => {
                self.pos += 1;
                let attrs = self.attr_lists()?;
                self.graph_attrs(attrs)
            }
            Some(Tok::Node) => {
                self.pos += 1;
                let attrs = self.attr_lists()?;
                self.scope_defaults(AttrKind::Node, attrs);
                Ok(())
            }
            Some(Tok::Edge) => {
                self.pos += 1;
                let attrs = self.attr_lists()?;
                self.scope_defaults(AttrKind::Edge, attrs);
                Ok(())
            }
            t if Self::is_id(t) && self.peek_at(1) == Some(&Tok::Equal) => {
                let name = self.id()?;
                self.expect(Tok::Equal)?;
                let value = self.id()?;
                self.graph_attrs(vec![(name, value)])
            }
            Some(Tok::Subgraph) | Some(Tok::LBrace) => {
                let members = self.subgraph()?;
                self.edge_rhs(members)
            }
            t if Self::is_id(t) => {
                let node = self.node_id()?;
                if matches!(self.peek(), Some(Tok::EdgeOp(_))) {
                    self.edge_rhs(vec![node])
                } else {
                    let attrs = self.attr_lists()?;
                    self.apply_node_attrs(node, &attrs)
                }
            }
            _ => Err(self.unexpected("statement")),
        }
    }

    /// `[a=b, c=d][e=f]`; a bare name means `name=true`. Absent lists are allowed.
    fn attr_lists(&mut self) -> Result<AttrList> {
        let mut out = AttrList::new();
        while self.eat(&Tok::LBracket) {
            while !self.eat(&Tok::RBracket) {
                let name = self.id()?;
                let value = if self.eat(&Tok::Equal) {
                    self.id()?
                } else {
                    "true".to_string()
                };
                out.push((name, value));
                if !self.eat(&Tok::Comma) {
                    self.eat(&Tok::Semi);
                }
            }
        }
        Ok(out)
    }

    fn graph_attrs(&mut self, attrs: AttrList) -> Result<()> {
        if self.scopes.len() > 1 {
            tracing::debug!(count = attrs.len(), "ignoring subgraph attributes");
            return Ok(());
        }
        for (name, value) in attrs {
            self.graph_mut().set_graph_attr(&name, &value)?;
        }
        Ok(())
    }

    fn scope_defaults(&mut self, kind: AttrKind, attrs: AttrList) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        let table = match kind {
            AttrKind::Node => &mut scope.node,
            _ => &mut scope.edge,
        };
        for (name, value) in attrs {
            table.insert(name, value);
        }
    }

    fn mention(&mut self, node: NodeId) {
        for scope in &mut self.scopes {
            if !scope.members.contains(&node) {
                scope.members.push(node);
            }
        }
    }

    /// `ID [':' ID [':' ID]]`; creates the node on first mention with the scoped defaults.
    fn node_id(&mut self) -> Result<NodeId> {
        let name = self.id()?;
        if self.eat(&Tok::Colon) {
            self.id()?;
            if self.eat(&Tok::Colon) {
                self.id()?;
            }
        }

        let existing = self.graph_mut().find_node(&name);
        let node = match existing {
            Some(node) => node,
            None => {
                let node = self.graph_mut().add_node(&name);
                let defaults = self
                    .scopes
                    .last()
                    .map(|s| s.node.clone())
                    .unwrap_or_default();
                for (k, v) in &defaults {
                    self.graph_mut().set_node_attr(node, k, v)?;
                }
                node
            }
        };
        self.mention(node);
        Ok(node)
    }

    fn apply_node_attrs(&mut self, node: NodeId, attrs: &AttrList) -> Result<()> {
        for (k, v) in attrs {
            self.graph_mut().set_node_attr(node, k, v)?;
        }
        Ok(())
    }

    /// `[subgraph [ID]] '{' stmt_list '}'`; returns the nodes mentioned inside.
    fn subgraph(&mut self) -> Result<Vec<NodeId>> {
        if self.eat(&Tok::Subgraph) && Self::is_id(self.peek()) {
            self.id()?;
        }
        self.expect(Tok::LBrace)?;
        let inherited = self.scopes.last().cloned().unwrap_or_default();
        self.scopes.push(Scope {
            members: Vec::new(),
            ..inherited
        });
        self.stmt_list()?;
        self.expect(Tok::RBrace)?;
        let scope = self.scopes.pop().unwrap_or_default();
        Ok(scope.members)
    }

    fn edge_operand(&mut self) -> Result<Vec<NodeId>> {
        match self.peek() {
            Some(Tok::Subgraph) | Some(Tok::LBrace) => self.subgraph(),
            _ => Ok(vec![self.node_id()?]),
        }
    }

    /// Reads `(edgeop operand)* [attrs]` after the first operand and creates every edge.
    fn edge_rhs(&mut self, first: Vec<NodeId>) -> Result<()> {
        let directed = self.graph.as_ref().is_none_or(Graph::is_directed);
        let mut chain = vec![first];
        while let Some(Tok::EdgeOp(arrow)) = self.peek().cloned() {
            if arrow != directed {
                return Err(self.error(if directed {
                    "'--' in a directed graph"
                } else {
                    "'->' in an undirected graph"
                }));
            }
            self.pos += 1;
            chain.push(self.edge_operand()?);
        }
        if chain.len() == 1 {
            let attrs = self.attr_lists()?;
            for node in chain.remove(0) {
                self.apply_node_attrs(node, &attrs)?;
            }
            return Ok(());
        }

        let attrs = self.attr_lists()?;
        let mut merged = self
            .scopes
            .last()
            .map(|s| s.edge.clone())
            .unwrap_or_default();
        for (k, v) in attrs {
            merged.insert(k, v);
        }
        let key = merged.get("key").cloned();

        for pair in chain.windows(2) {
            for &tail in &pair[0] {
                for &head in &pair[1] {
                    let graph = self.graph_mut();
                    let edge = graph.add_edge(tail, head, key.as_deref());
                    for (k, v) in &merged {
                        graph.set_edge_attr(edge, k, v)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_line_and_column() {
        let err = parse("digraph {\n  a -> ;\n}").unwrap_err();
        match err {
            Error::Parse { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_mixed_edge_operators() {
        assert!(parse("digraph { a -- b }").is_err());
        assert!(parse("graph { a -> b }").is_err());
        assert!(parse("graph { a -- b }").is_ok());
    }

    #[test]
    fn bare_attribute_names_mean_true() {
        let g = parse("digraph { a [fixedsize] }").unwrap();
        let a = g.find_node("a").unwrap();
        assert_eq!(g.node_attr(a, "fixedsize"), Some("true"));
    }
}
