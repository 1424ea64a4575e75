use classdiff_model::{tokenize, Operation, Statement};

use crate::{
    BodyMapper, BodyMapperFactory, CodeMapping, MapperError, ParameterMap, Replacement,
    ReplacementKind,
};

/// Token-based statement aligner.
///
/// Statements are compared as token streams. Leaves are only aligned with
/// leaves and inner nodes with inner nodes; bare blocks are never aligned.
/// Alignment is greedy in declaration order:
/// 1. token-identical pairs (after parameter substitution) become exact mappings;
/// 2. remaining pairs that differ in exactly one token become mappings with a
///    typed replacement, as do `return E;` statements facing a call that passes `E`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextualMapper;

impl TextualMapper {
    pub fn new() -> Self {
        Self
    }
}

impl BodyMapperFactory for TextualMapper {
    fn map_operations<'a>(
        &self,
        operation1: &'a Operation,
        operation2: &'a Operation,
    ) -> Result<BodyMapper<'a>, MapperError> {
        let mut mapper = BodyMapper::new(operation1, operation2);
        align(
            &mut mapper,
            Side::new(operation1.leaves(), None),
            Side::new(operation2.leaves(), None),
        );
        align(
            &mut mapper,
            Side::new(operation1.inner_nodes(), None),
            Side::new(operation2.inner_nodes(), None),
        );
        tracing::trace!(
            operation1 = %operation1.signature(),
            operation2 = %operation2.signature(),
            mappings = mapper.mappings().len(),
            exact = mapper.exact_match_count(),
            "mapped operation bodies"
        );
        Ok(mapper)
    }

    fn map_inlined_operation<'a>(
        &self,
        inlined: &'a Operation,
        parent: &BodyMapper<'a>,
        parameter_to_argument: &ParameterMap,
    ) -> Result<BodyMapper<'a>, MapperError> {
        let body = inlined.body.as_ref().ok_or_else(|| MapperError::MissingBody {
            operation: inlined.signature(),
        })?;
        let mut mapper = BodyMapper::new(inlined, parent.operation2());
        align(
            &mut mapper,
            Side::new(body.leaves(), Some(parameter_to_argument)),
            Side::new(parent.non_mapped_leaves_t2().to_vec(), None),
        );
        align(
            &mut mapper,
            Side::new(body.inner_nodes(), Some(parameter_to_argument)),
            Side::new(parent.non_mapped_inner_nodes_t2().to_vec(), None),
        );
        Ok(mapper)
    }

    fn map_extracted_operation<'a>(
        &self,
        parent: &BodyMapper<'a>,
        extracted: &'a Operation,
        old_parameter_map: &ParameterMap,
        parameter_to_argument: &ParameterMap,
    ) -> Result<BodyMapper<'a>, MapperError> {
        let body = extracted.body.as_ref().ok_or_else(|| MapperError::MissingBody {
            operation: extracted.signature(),
        })?;
        let mut mapper = BodyMapper::new(parent.operation1(), extracted);
        align(
            &mut mapper,
            Side::new(parent.non_mapped_leaves_t1().to_vec(), Some(old_parameter_map)),
            Side::new(body.leaves(), Some(parameter_to_argument)),
        );
        align(
            &mut mapper,
            Side::new(parent.non_mapped_inner_nodes_t1().to_vec(), Some(old_parameter_map)),
            Side::new(body.inner_nodes(), Some(parameter_to_argument)),
        );
        Ok(mapper)
    }
}

struct Side<'a> {
    statements: Vec<&'a Statement>,
    tokens: Vec<Vec<String>>,
}

impl<'a> Side<'a> {
    fn new(statements: Vec<&'a Statement>, substitution: Option<&ParameterMap>) -> Self {
        let tokens = statements
            .iter()
            .map(|statement| normalized_tokens(&statement.text, substitution))
            .collect();
        Self { statements, tokens }
    }

    fn len(&self) -> usize {
        self.statements.len()
    }
}

/// Tokens of `text` with unqualified parameter names replaced by their arguments.
fn normalized_tokens(text: &str, substitution: Option<&ParameterMap>) -> Vec<String> {
    let raw = tokenize(text);
    let mut out = Vec::with_capacity(raw.len());
    for (idx, token) in raw.iter().enumerate() {
        let qualified = idx > 0 && raw[idx - 1] == ".";
        match substitution.and_then(|map| map.get(*token)) {
            Some(argument) if !qualified => {
                out.extend(tokenize(argument).into_iter().map(str::to_string));
            }
            _ => out.push((*token).to_string()),
        }
    }
    out
}

fn align<'a>(mapper: &mut BodyMapper<'a>, old: Side<'a>, new: Side<'a>) {
    let mut old_matched = vec![false; old.len()];
    let mut new_matched = vec![false; new.len()];
    let mut pairs: Vec<(usize, usize, Option<Replacement>)> = Vec::new();

    for i in 0..old.len() {
        if old.statements[i].is_block() {
            continue;
        }
        let found = (0..new.len()).find(|&j| {
            !new_matched[j] && !new.statements[j].is_block() && new.tokens[j] == old.tokens[i]
        });
        if let Some(j) = found {
            old_matched[i] = true;
            new_matched[j] = true;
            pairs.push((i, j, None));
        }
    }

    for i in 0..old.len() {
        if old_matched[i] || old.statements[i].is_block() {
            continue;
        }
        for j in 0..new.len() {
            if new_matched[j] || new.statements[j].is_block() {
                continue;
            }
            if let Some(replacement) = classify(
                old.statements[i],
                &old.tokens[i],
                new.statements[j],
                &new.tokens[j],
            ) {
                old_matched[i] = true;
                new_matched[j] = true;
                pairs.push((i, j, Some(replacement)));
                break;
            }
        }
    }

    pairs.sort_by_key(|(i, _, _)| *i);
    for (i, j, replacement) in pairs {
        let mut mapping = CodeMapping::new(old.statements[i], new.statements[j]);
        if let Some(replacement) = replacement {
            mapping = mapping.with_replacement(replacement);
        }
        mapper.push_mapping(mapping);
    }
    for (i, statement) in old.statements.iter().copied().enumerate() {
        if !old_matched[i] {
            mapper.push_non_mapped_t1(statement);
        }
    }
    for (j, statement) in new.statements.iter().copied().enumerate() {
        if !new_matched[j] {
            mapper.push_non_mapped_t2(statement);
        }
    }
}

fn classify(
    statement1: &Statement,
    tokens1: &[String],
    statement2: &Statement,
    tokens2: &[String],
) -> Option<Replacement> {
    if let Some(argument) = argument_returned(statement1, tokens2) {
        let returned = tokens2[1..tokens2.len() - 1].join(" ");
        return Some(Replacement::new(
            argument,
            returned,
            ReplacementKind::ArgumentReplacedWithReturnExpression,
        ));
    }
    if let Some(argument) = argument_returned(statement2, tokens1) {
        let returned = tokens1[1..tokens1.len() - 1].join(" ");
        return Some(Replacement::new(
            returned,
            argument,
            ReplacementKind::ArgumentReplacedWithReturnExpression,
        ));
    }
    if let Some(target) = returned_value_assigned(tokens1, tokens2) {
        return Some(Replacement::new("return", target, ReplacementKind::ReturnValueAssigned));
    }
    if let Some(target) = returned_value_assigned(tokens2, tokens1) {
        return Some(Replacement::new(target, "return", ReplacementKind::ReturnValueAssigned));
    }

    if tokens1.len() != tokens2.len() {
        return None;
    }
    let mut differences = tokens1
        .iter()
        .zip(tokens2)
        .enumerate()
        .filter(|(_, (a, b))| a != b);
    let (idx, (before, after)) = differences.next()?;
    if differences.next().is_some() {
        return None;
    }

    let kind = if declares_type(statement1, before) && declares_type(statement2, after) {
        ReplacementKind::Type
    } else if tokens1.get(idx + 1).map(String::as_str) == Some("(")
        && invokes(statement1, before)
        && invokes(statement2, after)
    {
        ReplacementKind::MethodInvocationName
    } else if is_literal(before) && is_literal(after) {
        ReplacementKind::Literal
    } else if is_identifier(before) && is_identifier(after) {
        ReplacementKind::VariableName
    } else {
        return None;
    };
    Some(Replacement::new(before.clone(), after.clone(), kind))
}

/// `E` of a `return E;` statement.
fn return_expression(tokens: &[String]) -> Option<&[String]> {
    match tokens {
        [first, expression @ .., last]
            if first == "return" && last == ";" && !expression.is_empty() =>
        {
            Some(expression)
        }
        _ => None,
    }
}

/// The argument of a call in `call_side` that `return_tokens` (`return E;`) returns.
fn argument_returned(call_side: &Statement, return_tokens: &[String]) -> Option<String> {
    let expression = return_expression(return_tokens)?;
    call_side
        .invocations
        .iter()
        .flat_map(|invocation| invocation.arguments.iter())
        .find(|argument| tokenize(argument) == expression)
        .cloned()
}

/// The variable that `assign_tokens` (`.. target = E;`) assigns the `E` of `return E;` to.
fn returned_value_assigned(return_tokens: &[String], assign_tokens: &[String]) -> Option<String> {
    let expression = return_expression(return_tokens)?;
    let eq = assign_tokens.iter().position(|token| token == "=")?;
    let target = assign_tokens.get(eq.checked_sub(1)?)?;
    if !is_identifier(target) || assign_tokens.get(eq + 1).map(String::as_str) == Some("=") {
        return None;
    }
    let (last, value) = assign_tokens[eq + 1..].split_last()?;
    (last == ";" && value == expression).then(|| target.clone())
}

fn declares_type(statement: &Statement, token: &str) -> bool {
    statement
        .declarations
        .iter()
        .any(|declaration| tokenize(declaration.ty.as_str()).contains(&token))
}

fn invokes(statement: &Statement, name: &str) -> bool {
    statement.invocations.iter().any(|invocation| invocation.name == name)
}

fn is_literal(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit() || c == '"' || c == '\'')
        || matches!(token, "true" | "false" | "null")
}

fn is_identifier(token: &str) -> bool {
    token.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$')
}
