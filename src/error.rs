#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("Ride endpoints must be non-empty")]
    EmptyEndpoint,
    #[error("No ride with id {0}")]
    RideNotFound(String),
    #[error("Top-up amount must be positive")]
    ZeroAmount,
}
