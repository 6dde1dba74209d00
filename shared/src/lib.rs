pub mod asset;
pub mod config;
pub mod connection;
pub mod error;
pub mod grid;
pub mod notify;
pub mod orchestrator;
pub mod render;
pub mod response;
pub mod session;

#[cfg(test)]
mod testing;

pub use asset::{ImageAsset, RawFile};
pub use config::ClientConfig;
pub use connection::{ClientFactory, ConnectionStatus, InferenceClient, RetryPolicy, Timer};
pub use error::{ClientError, ConfigError};
pub use grid::{AugmentationGrid, SlotState};
pub use notify::{Notice, NoticeBoard, NoticeKind};
pub use orchestrator::Orchestrator;
pub use render::ClassificationView;
pub use response::{AugmentationKind, AugmentationSet, ClassificationResult, ImageRef};
pub use session::{PageSession, UiState};
