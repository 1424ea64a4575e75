use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::text::tokenize;
use crate::{Operation, TypeRef};

/// A method call found inside a statement.
///
/// Two invocations are considered the same call when receiver, name and the
/// *number* of arguments agree. Argument text is deliberately not part of the
/// identity: across versions a call keeps its identity when the expressions
/// passed to it are renamed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(default)]
    pub receiver: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl Invocation {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            receiver: None,
            name: name.into(),
            arguments,
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Whether this call can resolve to `operation` (same name, compatible arity).
    pub fn matches_operation(&self, operation: &Operation) -> bool {
        if self.name != operation.name {
            return false;
        }
        let params = operation.parameters.len();
        let args = self.arguments.len();
        match operation.parameters.last() {
            Some(last) if last.varargs => args + 1 >= params,
            _ => args == params,
        }
    }
}

impl PartialEq for Invocation {
    fn eq(&self, other: &Self) -> bool {
        self.receiver == other.receiver
            && self.name == other.name
            && self.arguments.len() == other.arguments.len()
    }
}

impl Eq for Invocation {}

impl Hash for Invocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.receiver.hash(state);
        self.name.hash(state);
        self.arguments.len().hash(state);
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(receiver) = &self.receiver {
            write!(f, "{receiver}.")?;
        }
        write!(f, "{}({})", self.name, self.arguments.join(", "))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// A statement without nested statements (`x = 1;`, `return y;`).
    Leaf,
    /// A statement owning nested statements (`if(..)`, `for(..)`, `try`).
    Composite,
    /// A bare `{ ... }` block.
    Block,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub text: String,
    #[serde(default)]
    pub invocations: Vec<Invocation>,
    #[serde(default)]
    pub declarations: Vec<VariableDeclaration>,
    #[serde(default)]
    pub children: Vec<Statement>,
}

impl Statement {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            kind: StatementKind::Leaf,
            text: text.into(),
            invocations: Vec::new(),
            declarations: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn composite(text: impl Into<String>, children: Vec<Statement>) -> Self {
        Self {
            kind: StatementKind::Composite,
            text: text.into(),
            invocations: Vec::new(),
            declarations: Vec::new(),
            children,
        }
    }

    pub fn block(children: Vec<Statement>) -> Self {
        Self {
            kind: StatementKind::Block,
            text: "{".to_string(),
            invocations: Vec::new(),
            declarations: Vec::new(),
            children,
        }
    }

    pub fn is_block(&self) -> bool {
        self.kind == StatementKind::Block
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == StatementKind::Leaf
    }

    /// Blocks are structural only and never counted as (un)mapped elements.
    pub fn is_countable(&self) -> bool {
        !self.is_block()
    }

    pub fn throws_new_exception(&self) -> bool {
        self.text.trim_start().starts_with("throw new ")
    }

    /// The invocation that makes up the whole statement, if any.
    ///
    /// Accepts `call(..);`, `return call(..);` and `lhs = call(..);` forms.
    pub fn invocation_covering_entire_fragment(&self) -> Option<&Invocation> {
        if !self.is_leaf() {
            return None;
        }
        let tokens = tokenize(&self.text);
        let mut body: &[&str] = &tokens;
        if let Some((&";", rest)) = body.split_last() {
            body = rest;
        }
        if let Some((&"return", rest)) = body.split_first() {
            body = rest;
        } else if let Some(idx) = assignment_operator(body) {
            body = &body[idx + 1..];
        }

        self.invocations
            .iter()
            .find(|invocation| tokenize(&invocation.to_string()) == body)
    }

    /// This statement followed by all nested statements, depth first.
    pub fn pre_order(&self) -> Vec<&Statement> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.pre_order());
        }
        out
    }
}

/// Index of a plain `=` token (not part of `==`, `!=`, `<=`, `>=`).
fn assignment_operator(tokens: &[&str]) -> Option<usize> {
    tokens.iter().enumerate().find_map(|(idx, token)| {
        if *token != "=" {
            return None;
        }
        let prev = idx.checked_sub(1).map(|i| tokens[i]);
        let next = tokens.get(idx + 1).copied();
        let compound = matches!(prev, Some("=" | "!" | "<" | ">")) || next == Some("=");
        (!compound).then_some(idx)
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBody {
    pub statements: Vec<Statement>,
}

impl OperationBody {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Every statement in the body, depth first, in declaration order.
    pub fn all_statements(&self) -> Vec<&Statement> {
        self.statements.iter().flat_map(Statement::pre_order).collect()
    }

    pub fn leaves(&self) -> Vec<&Statement> {
        self.all_statements()
            .into_iter()
            .filter(|statement| statement.is_leaf())
            .collect()
    }

    pub fn inner_nodes(&self) -> Vec<&Statement> {
        self.all_statements()
            .into_iter()
            .filter(|statement| !statement.is_leaf())
            .collect()
    }

    /// All invocations of the body in first-seen order.
    pub fn all_invocations(&self) -> IndexSet<&Invocation> {
        self.all_statements()
            .into_iter()
            .flat_map(|statement| statement.invocations.iter())
            .collect()
    }
}
