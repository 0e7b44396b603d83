use std::sync::Arc;

use crate::plugin::{CompletionHook, SurveyCompleted};

/// Where completion events come from
pub trait EventSource {
    fn subscribe(&mut self, hook: Arc<dyn CompletionHook>);
}

/// Holds the registered plugins and hands completion events to them
#[derive(Default)]
pub struct PluginRegistry {
    hooks: Vec<Arc<dyn CompletionHook>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.hooks.iter().map(|hook| hook.name())
    }

    /// Calls every plugin in registration order, one after another
    pub async fn publish(&self, event: &SurveyCompleted) {
        tracing::debug!(
            "Survey {} completed, notifying {} plugins",
            event.survey_id,
            self.hooks.len()
        );

        for hook in &self.hooks {
            hook.on_complete(event).await;
        }
    }
}

impl EventSource for PluginRegistry {
    fn subscribe(&mut self, hook: Arc<dyn CompletionHook>) {
        tracing::info!("Registered plugin {}: {}", hook.name(), hook.description());
        self.hooks.push(hook);
    }
}
