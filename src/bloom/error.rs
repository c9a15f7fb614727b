use thiserror::Error;

pub type BloomResult<T> = std::result::Result<T, BloomError>;

#[derive(Error, Debug, PartialEq)]
pub enum BloomError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error(
        "Incompatible filters: {left_bits} bits / {left_hashes} hashes vs {right_bits} bits / {right_hashes} hashes"
    )]
    IncompatibleFilters {
        left_bits: usize,
        left_hashes: usize,
        right_bits: usize,
        right_hashes: usize,
    },
}
