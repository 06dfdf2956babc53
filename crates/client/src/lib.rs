pub mod config;
pub mod error;
pub mod gateway;
pub mod models;

pub use config::{ClientConfig, DEFAULT_TOP_N, MAX_TOP_N, MIN_TOP_N};
pub use error::{ApiError, ApiResult};
pub use gateway::{ApiClient, SectionApi};
pub use models::{
    Chunk, ChunkContext, Confidence, Paper, QueryRequest, QueryResponse, SectionPointer,
};
