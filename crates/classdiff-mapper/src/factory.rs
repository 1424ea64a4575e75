use classdiff_model::Operation;
use indexmap::IndexMap;
use thiserror::Error;

use crate::BodyMapper;

/// Parameter name -> argument expression, in parameter order.
pub type ParameterMap = IndexMap<String, String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapperError {
    #[error("operation `{operation}` has no body to map")]
    MissingBody { operation: String },
    #[error("cannot map `{operation}`: {reason}")]
    Malformed { operation: String, reason: String },
}

/// Builds body mappers for the class differ.
///
/// Implementations must be deterministic: the same operations always produce
/// the same mappings in the same order.
pub trait BodyMapperFactory {
    /// Aligns the bodies of two versions of (possibly) the same operation.
    fn map_operations<'a>(
        &self,
        operation1: &'a Operation,
        operation2: &'a Operation,
    ) -> Result<BodyMapper<'a>, MapperError>;

    /// Aligns the body of `inlined` against the statements of `parent`'s new
    /// body that `parent` left unmapped. Parameters of `inlined` are read as
    /// the arguments of the inlined call site.
    fn map_inlined_operation<'a>(
        &self,
        inlined: &'a Operation,
        parent: &BodyMapper<'a>,
        parameter_to_argument: &ParameterMap,
    ) -> Result<BodyMapper<'a>, MapperError>;

    /// Aligns the statements of `parent`'s old body that `parent` left
    /// unmapped against the body of `extracted`. Parameters of `extracted` are
    /// read as the arguments of the extracting call site.
    fn map_extracted_operation<'a>(
        &self,
        parent: &BodyMapper<'a>,
        extracted: &'a Operation,
        old_parameter_map: &ParameterMap,
        parameter_to_argument: &ParameterMap,
    ) -> Result<BodyMapper<'a>, MapperError>;
}
