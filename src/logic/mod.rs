pub mod account_ops;
pub mod bulk_create;
pub mod classification;
pub mod endpoint_ops;
pub mod import_ops;
pub mod openapi_document;
pub mod operation_extractor;
pub mod project_ops;
pub mod schema_example;

pub use account_ops::*;
pub use bulk_create::BulkCreator;
pub use classification::ImportClassifier;
pub use endpoint_ops::*;
pub use import_ops::*;
pub use openapi_document::{DocumentError, OpenApiDocument, SchemaLimits};
pub use operation_extractor::{extract_operations, OperationExtractor};
pub use project_ops::*;
pub use schema_example::{synthesize_example, SchemaNode, SchemaType};
