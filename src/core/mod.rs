pub mod gradio;
pub mod output;
pub mod relay;

pub use crate::domain::model::{RelayOutput, VitalsPayload};
pub use crate::domain::ports::{ConfigProvider, RemoteClient};
pub use crate::utils::error::Result;
