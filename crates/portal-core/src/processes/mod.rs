//! Process/step workflow engine shared by registration and offer subscriptions.

mod context;
pub mod domain;

pub use context::{close_process, ManualProcessContext};
pub use domain::{
    Process, ProcessStep, ProcessStepData, ProcessStepStatus, ProcessStepType, ProcessType,
};
