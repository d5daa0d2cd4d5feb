#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error while processing the geometry.")]
    GeozeroError(#[from] geozero::error::GeozeroError),

    #[error("Serde error.")]
    SerdeError(#[from] serde_json::error::Error),

    #[error("Invalid hex encoding.")]
    HexError(#[from] hex::FromHexError),

    #[error("Unsupported GeoJSON object: {0}")]
    Unsupported(String),

    #[error("Normalization produced no features.")]
    EmptyCollection,

    #[error("No geometry was produced.")]
    EmptyGeometry,

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("No features with coordinates to bound.")]
    EmptyBounds,
}

pub type Result<T> = std::result::Result<T, Error>;
