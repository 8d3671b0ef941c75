//! Application-level error type for the binary.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::AppConfigError;
use crate::corpus::OutputError;
use crate::input::InputError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    ConfigLoad(#[from] AppConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("cannot infer output format from `{path}`; pass --output-format")]
    UnknownOutputFormat { path: PathBuf },
}
