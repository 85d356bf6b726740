pub mod classify;
pub mod config;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod store;
pub mod types;

pub use classify::{CategoryMap, CategoryTracker, LineKind};
pub use config::{load_processors, parse_processors, CategoryMappings, ConfigError, DocumentFormat, ProcessorEntry};
pub use extract::{ExtractionPattern, LineOutcome, LineRejection, PatternError};
pub use normalize::{clean_line, normalize};
pub use pipeline::{extract_products, extract_with_store, ExtractionError, ExtractionPipeline};
pub use store::{detect_store, StoreConfig, StoreRegistry};
pub use types::{ExtractedLine, ReceiptExtraction, RegistryKind};
