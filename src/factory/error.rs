use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FactoryError {
    #[error("call to undefined object '{0}'")]
    UndefinedObject(String),

    #[error("class '{0}' not found")]
    ClassNotFound(String),

    #[error("too few arguments to construct '{class}': no value for parameter '{parameter}'")]
    TooFewArguments { class: String, parameter: String },

    #[error("cyclic object reference: {chain}")]
    CyclicReference { chain: String },
}
