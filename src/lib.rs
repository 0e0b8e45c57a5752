pub mod analysis;
pub mod auth;
pub mod conditions;
pub mod config;
pub mod error;
pub mod transport;
pub mod xml;

pub use analysis::AnalysisService;
pub use auth::AuthMethod;
pub use conditions::{evaluate_all, BuildOutcome, WarningCountCondition};
pub use config::Config;
pub use error::{Error, Result};
pub use transport::HubSession;
pub use xml::{Analysis, Project, ProjectIndex, Warning};
