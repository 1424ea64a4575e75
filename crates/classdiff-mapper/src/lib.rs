//! Statement-level alignment of two operation bodies.
//!
//! The class differ only consumes the *results* of body mapping: counts of
//! mapped/unmapped statements, exact matches and the replacements detected
//! inside matched statements. [`BodyMapperFactory`] is that boundary.
//! [`TextualMapper`] is a token-based implementation that is good enough for
//! fixtures and for small models; richer mappers can be plugged in through the
//! same trait.

#![forbid(unsafe_code)]

mod factory;
mod mapper;
mod replacement;
mod textual;

pub use factory::{BodyMapperFactory, MapperError, ParameterMap};
pub use mapper::{BodyMapper, CodeMapping};
pub use replacement::{MethodInvocationRename, Replacement, ReplacementKind};
pub use textual::TextualMapper;
