use thiserror::Error;

/// Error returned by [`WideString::from_vec_with_nul`](crate::WideString::from_vec_with_nul).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromUnitsError {
    /// The buffer is empty or its last unit is not zero.
    #[error("wide string is not null-terminated")]
    MissingTerminator,
    /// A zero unit appears before the terminator.
    #[error("wide string has an interior zero at unit {position}")]
    InteriorNul {
        /// Index of the first zero unit.
        position: usize,
    },
}
