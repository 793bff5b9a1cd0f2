//! Identifiers recorded while a provisioning run creates resources.

use serde::Serialize;

use crate::types::ResourceKind;

/// A named slot in [`SagaContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSlot {
    ApiId,
    FunctionArn,
}

impl ContextSlot {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiId => "apiId",
            Self::FunctionArn => "functionArn",
        }
    }

    #[must_use]
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            Self::ApiId => ResourceKind::RestApi,
            Self::FunctionArn => ResourceKind::Function,
        }
    }
}

/// Identifiers of resources a run has created so far.
///
/// A slot is filled only after the step that creates the matching resource
/// succeeded, and is never cleared within a run. Rollback decides what to
/// delete from exactly these slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SagaContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_arn: Option<String>,
}

impl SagaContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn api_id(&self) -> Option<&str> {
        self.api_id.as_deref()
    }

    #[must_use]
    pub fn function_arn(&self) -> Option<&str> {
        self.function_arn.as_deref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.api_id.is_none() && self.function_arn.is_none()
    }

    /// Filled slots in the order their resources are created.
    #[must_use]
    pub fn populated_slots(&self) -> Vec<ContextSlot> {
        let mut slots = Vec::with_capacity(2);
        if self.api_id.is_some() {
            slots.push(ContextSlot::ApiId);
        }
        if self.function_arn.is_some() {
            slots.push(ContextSlot::FunctionArn);
        }
        slots
    }

    /// Context with the REST API slot filled, for reporting and tests.
    #[must_use]
    pub fn with_api_id(mut self, api_id: impl Into<String>) -> Self {
        self.record_api_id(api_id.into());
        self
    }

    #[must_use]
    pub fn with_function_arn(mut self, function_arn: impl Into<String>) -> Self {
        self.record_function_arn(function_arn.into());
        self
    }

    /// Renders the filled slots as pretty-printed JSON.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }

    pub(crate) fn record_api_id(&mut self, api_id: String) {
        self.api_id = Some(api_id);
    }

    pub(crate) fn record_function_arn(&mut self, function_arn: String) {
        self.function_arn = Some(function_arn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_empty() {
        let context = SagaContext::new();

        assert!(context.is_empty());
        assert!(context.populated_slots().is_empty());
        assert_eq!(context.to_json_pretty(), "{}");
    }

    #[test]
    fn populated_slots_follow_creation_order() {
        let mut context = SagaContext::new();
        context.record_function_arn("arn:aws:lambda:eu-central-1:1:function:f".to_string());
        context.record_api_id("a1b2c3".to_string());

        assert_eq!(
            context.populated_slots(),
            vec![ContextSlot::ApiId, ContextSlot::FunctionArn]
        );
        assert!(!context.is_empty());
    }

    #[test]
    fn json_includes_only_filled_slots() -> anyhow::Result<()> {
        let mut context = SagaContext::new();
        context.record_api_id("a1b2c3".to_string());

        let json: serde_json::Value = serde_json::from_str(&context.to_json_pretty())?;

        assert_eq!(json["apiId"], "a1b2c3");
        assert!(json.get("functionArn").is_none());
        Ok(())
    }

    #[test]
    fn slots_map_to_resource_kinds() {
        assert_eq!(ContextSlot::ApiId.as_str(), "apiId");
        assert_eq!(ContextSlot::ApiId.resource_kind(), ResourceKind::RestApi);
        assert_eq!(
            ContextSlot::FunctionArn.resource_kind(),
            ResourceKind::Function
        );
    }
}
