//! Recursive-descent parser building `cpg_core::Graph` values

use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use cpg_core::{AttributedGraph, Graph, NodeId};
use std::collections::{HashMap, HashSet};

type Attrs = Vec<(String, String)>;

/// Defaults and members of an open subgraph.
#[derive(Default, Clone)]
struct Scope {
    node_defaults: Attrs,
    edge_defaults: Attrs,
    members: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl Scope {
    fn add_member(&mut self, node: NodeId) {
        if self.seen.insert(node) {
            self.members.push(node);
        }
    }
}

fn upsert(attrs: &mut Attrs, key: String, value: String) {
    match attrs.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => attrs.push((key, value)),
    }
}

/// Graph under construction. Subgraphs are flattened into the root graph;
/// only their attribute defaults and membership are tracked.
struct GraphState {
    graph: Graph,
    /// Open subgraphs, innermost last. Empty at root level.
    scopes: Vec<Scope>,
    subgraphs: HashMap<String, Vec<NodeId>>,
}

impl GraphState {
    fn new(graph: Graph) -> Self {
        GraphState {
            graph,
            scopes: Vec::new(),
            subgraphs: HashMap::new(),
        }
    }

    fn ensure_node(&mut self, name: &str) -> NodeId {
        let existing = self.graph.find_node(name);
        let node = self.graph.create_node(name);
        if let Some(scope) = self.scopes.last_mut() {
            if existing.is_none() {
                for (key, value) in &scope.node_defaults {
                    self.graph.set_node_attr(node, key, value);
                }
            }
            scope.add_member(node);
        }
        node
    }

    fn connect(&mut self, tails: &[NodeId], heads: &[NodeId], attrs: &Attrs) {
        for &tail in tails {
            for &head in heads {
                let before = self.graph.edge_count();
                let Some(edge) = self.graph.create_edge(tail, head) else {
                    continue;
                };
                if self.graph.edge_count() > before {
                    if let Some(scope) = self.scopes.last() {
                        for (key, value) in &scope.edge_defaults {
                            self.graph.set_edge_attr(edge, key, value);
                        }
                    }
                }
                for (key, value) in attrs {
                    self.graph.set_edge_attr(edge, key, value);
                }
            }
        }
    }

    fn node_defaults(&mut self, attrs: Attrs) {
        match self.scopes.last_mut() {
            Some(scope) => attrs
                .into_iter()
                .for_each(|(k, v)| upsert(&mut scope.node_defaults, k, v)),
            None => attrs
                .iter()
                .for_each(|(k, v)| self.graph.declare_node_attr(k, v)),
        }
    }

    fn edge_defaults(&mut self, attrs: Attrs) {
        match self.scopes.last_mut() {
            Some(scope) => attrs
                .into_iter()
                .for_each(|(k, v)| upsert(&mut scope.edge_defaults, k, v)),
            None => attrs
                .iter()
                .for_each(|(k, v)| self.graph.declare_edge_attr(k, v)),
        }
    }

    /// Subgraph-level graph attributes are not kept.
    fn graph_attrs(&mut self, attrs: Attrs) {
        if self.scopes.is_empty() {
            for (key, value) in attrs {
                self.graph.set_graph_attr(&key, &value);
            }
        }
    }

    fn push_scope(&mut self) {
        let scope = match self.scopes.last() {
            Some(parent) => Scope {
                node_defaults: parent.node_defaults.clone(),
                edge_defaults: parent.edge_defaults.clone(),
                ..Scope::default()
            },
            None => Scope::default(),
        };
        self.scopes.push(scope);
    }

    fn pop_scope(&mut self) -> Vec<NodeId> {
        let scope = self.scopes.pop().unwrap_or_default();
        if let Some(parent) = self.scopes.last_mut() {
            for &node in &scope.members {
                parent.add_member(node);
            }
        }
        scope.members
    }
}

/// Pulls one graph at a time out of a DOT source.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn bump(&mut self) -> Result<Option<Token>, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.next_token(),
        }
    }

    /// Whether the next token satisfies `pred`, without consuming it.
    fn check(&mut self, pred: impl Fn(&Token) -> bool) -> Result<bool, ParseError> {
        Ok(self.peek()?.is_some_and(pred))
    }

    /// Consume the next token if it satisfies `pred`.
    fn eat(&mut self, pred: impl Fn(&Token) -> bool) -> Result<bool, ParseError> {
        if self.check(pred)? {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        match self.bump()? {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(unexpected(&token, expected)),
            None => Err(ParseError::UnexpectedEof { expected }),
        }
    }

    /// Parse the next graph of the input, `None` once the input is exhausted.
    pub fn next_graph(&mut self) -> Result<Option<Graph>, ParseError> {
        if self.peek()?.is_none() {
            return Ok(None);
        }

        let strict = self.eat(|t| t.is_keyword("strict"))?;
        let directed = match self.bump()? {
            Some(token) if token.is_keyword("digraph") => true,
            Some(token) if token.is_keyword("graph") => false,
            Some(token) => return Err(unexpected(&token, "`graph` or `digraph`")),
            None => return Err(ParseError::UnexpectedEof { expected: "`graph` or `digraph`" }),
        };
        let name = if self.check(|t| t.kind == TokenKind::LBrace)? {
            String::new()
        } else {
            self.parse_id("graph name")?
        };
        self.expect(TokenKind::LBrace, "`{`")?;

        let mut state = GraphState::new(Graph::with_name(name, strict));
        self.parse_stmt_list(&mut state)?;
        self.expect(TokenKind::RBrace, "`}`")?;

        let graph = state.graph;
        tracing::debug!(
            name = graph.name(),
            directed,
            strict,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "parsed graph"
        );
        Ok(Some(graph))
    }

    fn parse_stmt_list(&mut self, state: &mut GraphState) -> Result<(), ParseError> {
        loop {
            match self.peek()? {
                None => return Err(ParseError::UnexpectedEof { expected: "`}`" }),
                Some(token) if token.kind == TokenKind::RBrace => return Ok(()),
                Some(_) => {}
            }
            self.parse_stmt(state)?;
            self.eat(|t| t.kind == TokenKind::Semicolon)?;
        }
    }

    fn parse_stmt(&mut self, state: &mut GraphState) -> Result<(), ParseError> {
        let Some(token) = self.bump()? else {
            return Err(ParseError::UnexpectedEof { expected: "statement" });
        };

        if token.is_keyword("graph") {
            let attrs = self.parse_attr_lists()?;
            state.graph_attrs(attrs);
            return Ok(());
        }
        if token.is_keyword("node") {
            let attrs = self.parse_attr_lists()?;
            state.node_defaults(attrs);
            return Ok(());
        }
        if token.is_keyword("edge") {
            let attrs = self.parse_attr_lists()?;
            state.edge_defaults(attrs);
            return Ok(());
        }
        if token.is_keyword("subgraph") || token.kind == TokenKind::LBrace {
            let members = self.parse_subgraph(token, state)?;
            return self.parse_edge_rhs(members, state);
        }

        let id = self.finish_id(token, "statement")?;
        if self.eat(|t| t.kind == TokenKind::Equals)? {
            let value = self.parse_id("attribute value")?;
            state.graph_attrs(vec![(id, value)]);
            return Ok(());
        }

        self.skip_port()?;
        let node = state.ensure_node(&id);
        if self.check(is_edge_op)? {
            return self.parse_edge_rhs(vec![node], state);
        }
        for (key, value) in self.parse_attr_lists()? {
            state.graph.set_node_attr(node, &key, &value);
        }
        Ok(())
    }

    /// Parse `-> endpoint` repetitions following a first endpoint, then the
    /// edge attributes, and connect every consecutive pair of endpoints.
    fn parse_edge_rhs(&mut self, first: Vec<NodeId>, state: &mut GraphState) -> Result<(), ParseError> {
        let mut endpoints = vec![first];
        while self.eat(is_edge_op)? {
            let Some(token) = self.bump()? else {
                return Err(ParseError::UnexpectedEof { expected: "edge endpoint" });
            };
            if token.is_keyword("subgraph") || token.kind == TokenKind::LBrace {
                endpoints.push(self.parse_subgraph(token, state)?);
            } else {
                let id = self.finish_id(token, "edge endpoint")?;
                self.skip_port()?;
                endpoints.push(vec![state.ensure_node(&id)]);
            }
        }
        if endpoints.len() == 1 {
            return Ok(());
        }

        let attrs = self.parse_attr_lists()?;
        for pair in endpoints.windows(2) {
            state.connect(&pair[0], &pair[1], &attrs);
        }
        Ok(())
    }

    /// `first` is either the `subgraph` keyword or the opening brace.
    fn parse_subgraph(&mut self, first: Token, state: &mut GraphState) -> Result<Vec<NodeId>, ParseError> {
        let mut name = None;
        if first.kind != TokenKind::LBrace {
            if !self.check(|t| t.kind == TokenKind::LBrace)? {
                let id = self.parse_id("subgraph name")?;
                if !self.check(|t| t.kind == TokenKind::LBrace)? {
                    // Reference to a subgraph defined earlier.
                    return Ok(state.subgraphs.get(&id).cloned().unwrap_or_default());
                }
                name = Some(id);
            }
            self.expect(TokenKind::LBrace, "`{`")?;
        }

        state.push_scope();
        self.parse_stmt_list(state)?;
        self.expect(TokenKind::RBrace, "`}`")?;
        let members = state.pop_scope();

        if let Some(name) = name {
            let known = state.subgraphs.entry(name).or_default();
            for &node in &members {
                if !known.contains(&node) {
                    known.push(node);
                }
            }
        }
        Ok(members)
    }

    fn parse_attr_lists(&mut self) -> Result<Attrs, ParseError> {
        let mut attrs = Vec::new();
        while self.eat(|t| t.kind == TokenKind::LBracket)? {
            while !self.eat(|t| t.kind == TokenKind::RBracket)? {
                let key = self.parse_id("attribute name")?;
                let value = if self.eat(|t| t.kind == TokenKind::Equals)? {
                    self.parse_id("attribute value")?
                } else {
                    "true".to_string()
                };
                upsert(&mut attrs, key, value);
                self.eat(|t| matches!(t.kind, TokenKind::Comma | TokenKind::Semicolon))?;
            }
        }
        Ok(attrs)
    }

    fn skip_port(&mut self) -> Result<(), ParseError> {
        for _ in 0..2 {
            if !self.eat(|t| t.kind == TokenKind::Colon)? {
                break;
            }
            self.parse_id("port")?;
        }
        Ok(())
    }

    fn parse_id(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.bump()? {
            Some(token) => self.finish_id(token, expected),
            None => Err(ParseError::UnexpectedEof { expected }),
        }
    }

    /// Turn an already consumed token into an identifier, joining
    /// `"a" + "b"` concatenations.
    fn finish_id(&mut self, token: Token, expected: &'static str) -> Result<String, ParseError> {
        let Token { kind, line, column } = token;
        match kind {
            TokenKind::Id(id) | TokenKind::Html(id) => Ok(id),
            TokenKind::Quoted(mut value) => {
                while self.eat(|t| t.kind == TokenKind::Plus)? {
                    match self.bump()? {
                        Some(Token { kind: TokenKind::Quoted(more), .. }) => value.push_str(&more),
                        Some(other) => return Err(unexpected(&other, "quoted string after `+`")),
                        None => {
                            return Err(ParseError::UnexpectedEof {
                                expected: "quoted string after `+`",
                            })
                        }
                    }
                }
                Ok(value)
            }
            kind => Err(unexpected(&Token { kind, line, column }, expected)),
        }
    }
}

/// `--` is accepted in directed graphs and `->` in undirected ones; both
/// connect tail to head as written.
fn is_edge_op(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Arrow | TokenKind::Line)
}

fn unexpected(token: &Token, expected: &'static str) -> ParseError {
    ParseError::Unexpected {
        line: token.line,
        column: token.column,
        found: token.kind.to_string(),
        expected,
    }
}
