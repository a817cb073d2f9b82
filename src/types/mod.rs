pub mod error;
pub mod generation;
pub mod product;
pub mod seo;

pub use error::{ApiError, ErrorCategory, Result, SeoError};
pub use generation::{Generation, GenerationMetadata};
pub use product::ProductSnapshot;
pub use seo::{SeoField, SeoResult};
