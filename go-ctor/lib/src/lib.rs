pub mod config;
pub mod emit;
pub mod error;
pub mod locate;
pub mod pipeline;
pub mod syntax;
pub mod synthesize;

pub use config::{GenerateConfig, MissingTypePolicy, constructor_name};
pub use error::GoCtorError;
pub use locate::{Located, locate};
pub use pipeline::{GenerateReport, Rewrite, generate, rewrite_source};
pub use syntax::GoFile;
