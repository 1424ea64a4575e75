use classdiff_model::{
    tokenize, AnonymousClass, Attribute, ClassModel, Operation, OperationBody, Parameter,
    Statement, TypeRef, Visibility,
};

use crate::statements::{is_identifier, join_tokens, split_top_level};

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "abstract",
    "final",
    "synchronized",
    "native",
    "default",
];

pub fn class(name: &str) -> ClassBuilder {
    ClassBuilder::new(name)
}

/// An operation from a Java-like header, e.g. `public int size()`.
///
/// Without a `.body(..)` call the operation is bodyless (abstract/native).
pub fn method(header: &str) -> OperationBuilder {
    OperationBuilder::new(header)
}

/// A constructor; `header` is `Name(params)` with optional modifiers.
pub fn constructor(header: &str) -> OperationBuilder {
    OperationBuilder::new(header)
}

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    model: ClassModel,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            model: ClassModel::new(name),
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.model.visibility = visibility;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.model.is_abstract = true;
        self
    }

    pub fn interface(mut self) -> Self {
        self.model.is_interface = true;
        self
    }

    pub fn extends(mut self, superclass: &str) -> Self {
        self.model.superclass = Some(TypeRef::new(superclass));
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.model.implemented_interfaces.push(TypeRef::new(interface));
        self
    }

    /// Adds an attribute from a declaration such as `private static int count = 0`.
    pub fn field(mut self, declaration: &str) -> Self {
        self.model.attributes.push(parse_attribute(declaration));
        self
    }

    pub fn method(mut self, operation: OperationBuilder) -> Self {
        let operation = operation.build(&self.model.name);
        self.model.operations.push(operation);
        self
    }

    /// Adds an anonymous class declared inside the operation with signature `enclosing`.
    pub fn anonymous(mut self, enclosing: &str, operations: Vec<OperationBuilder>) -> Self {
        let name = format!("{}${}", self.model.name, self.model.anonymous_classes.len() + 1);
        let operations = operations
            .into_iter()
            .map(|operation| operation.build(&name))
            .collect();
        self.model.anonymous_classes.push(AnonymousClass {
            name,
            enclosing_operation: Some(enclosing.to_string()),
            attributes: Vec::new(),
            operations,
        });
        self
    }

    pub fn build(self) -> ClassModel {
        self.model
    }
}

#[derive(Debug, Clone)]
pub struct OperationBuilder {
    header: String,
    annotations: Vec<String>,
    body: Option<Vec<Statement>>,
}

impl OperationBuilder {
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
            annotations: Vec::new(),
            body: None,
        }
    }

    pub fn annotated(mut self, annotation: &str) -> Self {
        self.annotations.push(annotation.to_string());
        self
    }

    pub fn body(mut self, statements: Vec<Statement>) -> Self {
        self.body = Some(statements);
        self
    }

    pub fn build(self, class_name: &str) -> Operation {
        let open = self
            .header
            .find('(')
            .unwrap_or_else(|| panic!("operation header `{}` has no parameter list", self.header));
        let close = self
            .header
            .rfind(')')
            .unwrap_or_else(|| panic!("operation header `{}` is not closed", self.header));

        let head_tokens = tokenize(&self.header[..open]);
        let (modifiers, rest) = split_modifiers(&head_tokens);
        let (name, type_tokens) = rest
            .split_last()
            .unwrap_or_else(|| panic!("operation header `{}` has no name", self.header));
        let is_constructor = type_tokens.is_empty();

        let param_tokens = tokenize(&self.header[open + 1..close]);
        let parameters = split_top_level(&param_tokens)
            .into_iter()
            .map(parse_parameter)
            .collect();

        Operation {
            class_name: class_name.to_string(),
            name: (*name).to_string(),
            visibility: visibility_of(modifiers),
            is_abstract: modifiers.contains(&"abstract"),
            is_constructor,
            is_static: modifiers.contains(&"static"),
            return_type: (!is_constructor).then(|| TypeRef::new(join_tokens(type_tokens))),
            parameters,
            annotations: self.annotations,
            body: self.body.map(OperationBody::new),
        }
    }
}

fn split_modifiers<'s, 't>(tokens: &'s [&'t str]) -> (&'s [&'t str], &'s [&'t str]) {
    let count = tokens
        .iter()
        .take_while(|token| MODIFIERS.contains(*token))
        .count();
    tokens.split_at(count)
}

fn visibility_of(modifiers: &[&str]) -> Visibility {
    modifiers
        .iter()
        .find_map(|modifier| match *modifier {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        })
        .unwrap_or(Visibility::Package)
}

fn parse_parameter(tokens: &[&str]) -> Parameter {
    let tokens: Vec<&str> = tokens.iter().copied().filter(|t| *t != "final").collect();
    let (name, mut type_tokens) = tokens
        .split_last()
        .expect("empty parameter declaration");
    assert!(is_identifier(name), "parameter `{name}` is not an identifier");
    let varargs = type_tokens.ends_with(&[".", ".", "."]);
    if varargs {
        type_tokens = &type_tokens[..type_tokens.len() - 3];
    }
    let mut parameter = Parameter::new(*name, TypeRef::new(join_tokens(type_tokens)));
    parameter.varargs = varargs;
    parameter
}

fn parse_attribute(declaration: &str) -> Attribute {
    let tokens = tokenize(declaration.trim_end_matches(';'));
    let (modifiers, rest) = split_modifiers(&tokens);
    let (declared, initializer) = match rest.iter().position(|t| *t == "=") {
        Some(idx) => (&rest[..idx], Some(join_tokens(&rest[idx + 1..]))),
        None => (rest, None),
    };
    let (name, type_tokens) = declared
        .split_last()
        .unwrap_or_else(|| panic!("attribute declaration `{declaration}` has no name"));

    let mut attribute = Attribute::new(*name, TypeRef::new(join_tokens(type_tokens)));
    attribute.visibility = visibility_of(modifiers);
    attribute.is_static = modifiers.contains(&"static");
    attribute.is_final = modifiers.contains(&"final");
    attribute.initializer = initializer;
    attribute
}
