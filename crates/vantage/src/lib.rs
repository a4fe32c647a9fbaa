#![doc = include_str!("../../../README.md")]

mod comm;
mod namespace;
mod render;
mod session;
mod summary;
mod value;

pub use crate::{
    comm::{CollectChannel, CommError, EnvironmentChannel, EnvironmentMessage},
    namespace::{NamespaceChanges, NamespaceError, TrackedNamespace},
    render::{RenderError, RenderOptions, pformat, repr},
    session::{ENVIRONMENT_COMM_TARGET, EnvironmentSession, MAX_ITEMS, SessionConfig},
    summary::{
        DEFAULT_DATAFRAME_TYPES, MAX_VALUE_SUMMARY_LENGTH, Summarizer, VALUE_PRINT_WIDTH, VariableKind,
        VariableSummary,
    },
    value::{InstanceData, Value},
};
