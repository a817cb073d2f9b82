//! Message Protocol
//!
//! JSON messages exchanged between the front end, the background generator
//! and the page. Requests are tagged by `action`; responses are untagged and
//! keep the field names the browser side expects.
//!
//! | action               | handled by   | response                          |
//! |----------------------|--------------|-----------------------------------|
//! | `generate_seo`       | background   | `{data, metadata}` or `{error}`   |
//! | `GET_PRODUCT_DATA`   | content      | `{productData}`                   |
//! | `APPLY_JSON`         | content      | `{success}`                       |
//! | `APPLY_SINGLE_FIELD` | content      | `{success, error?}`               |
//! | `DEBUG_EDITORS`      | content      | `{success: true}`                 |
//!
//! Anything else gets `{success: false, error: "Invalid message"}`.

mod background;
mod content;

pub use background::BackgroundHandler;
pub use content::ContentHandler;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::types::{Generation, GenerationMetadata, ProductSnapshot, Result, SeoResult};

pub const INVALID_MESSAGE: &str = "Invalid message";

/// Incoming message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "generate_seo")]
    GenerateSeo {
        #[serde(default)]
        data: ProductSnapshot,
    },
    #[serde(rename = "GET_PRODUCT_DATA")]
    GetProductData,
    /// Payload is validated against the seven-key contract on receipt
    #[serde(rename = "APPLY_JSON")]
    ApplyJson { data: Value },
    #[serde(rename = "APPLY_SINGLE_FIELD")]
    ApplySingleField { field: String, value: String },
    #[serde(rename = "DEBUG_EDITORS")]
    DebugEditors,
}

impl Request {
    /// Parse a raw message; `None` for anything that is not a known request
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!("Rejected message: {}", e);
                None
            }
        }
    }

    /// Generation runs in the background context, everything else on the page
    pub fn is_background(&self) -> bool {
        matches!(self, Request::GenerateSeo { .. })
    }
}

/// Outgoing message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Generated {
        data: SeoResult,
        metadata: GenerationMetadata,
    },
    ProductData {
        #[serde(rename = "productData")]
        product_data: ProductSnapshot,
    },
    Status {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl Response {
    pub fn ok() -> Self {
        Response::Status {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Response::Status {
            success: false,
            error: Some(error.into()),
        }
    }

    pub fn invalid() -> Self {
        Self::failure(INVALID_MESSAGE)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Generation> for Response {
    fn from(generation: Generation) -> Self {
        Response::Generated {
            data: generation.result,
            metadata: generation.metadata,
        }
    }
}
