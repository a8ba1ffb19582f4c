pub use error::AppError;

/// Main architecture layers (dependency flow: CLI → Core → Storage)
pub mod cli; // Command-line interface
pub mod core; // Query pipeline and business logic
pub mod storage; // Configuration and credential persistence

/// Support modules (used across layers)
pub mod api; // neuPrint API client
pub mod display; // Table rendering, sorting, pagination, export
pub mod error; // Error handling
pub mod plugins; // Built-in query plugins
pub mod utils; // Shared utilities and helpers

pub type Result<T> = std::result::Result<T, AppError>;
