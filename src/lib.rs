//! Calls a configurable URL when a survey response is completed.
//!
//! The URL is built from a per-survey template that may contain the `{SURVEYID}`, `{TOKEN}` and
//! `{TID}` placeholders. The survey platform hosting this plugin is reached through a few small
//! traits: [`ConfigStore`] for settings, [`SurveyRecords`] for response and participant lookups
//! and [`EventSource`] for completion events.

pub mod configuration;
pub mod database;
pub mod dispatch;
pub mod plugin;
pub mod records;
pub mod registry;
pub mod routes;
pub mod settings;
pub mod store;
pub mod template;

pub use configuration::Configuration;
pub use dispatch::{is_delivered, Dispatch, DispatchError, HttpDispatcher};
pub use plugin::{CompletionHook, Outcome, SurveyCompleted, WebHook};
pub use records::{Participant, SurveyRecords};
pub use registry::{EventSource, PluginRegistry};
pub use store::ConfigStore;
pub use template::{build_url, InvalidTemplateError, UrlTemplate};
