use classdiff_mapper::MapperError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiffError {
    #[error(transparent)]
    Mapper(#[from] MapperError),
    /// A pooled operation could not be located in its declaring class.
    #[error("operation `{signature}` is not declared by class `{class}`")]
    UnknownOperation { class: String, signature: String },
}
