//! Fake planner for tests. Responses are matched by prompt substring, with
//! an optional default, so pipeline tests run without network access.

use super::{LlmError, Planner};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug)]
pub struct FakePlanner {
    /// Map of prompt substring -> canned response
    responses: RwLock<HashMap<String, Value>>,
    default_response: Option<Value>,
}

impl Default for FakePlanner {
    fn default() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: Some(Value::Object(serde_json::Map::new())),
        }
    }
}

impl FakePlanner {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: None,
        }
    }

    /// Respond with `response` to any prompt containing `prompt_contains`.
    pub fn with_response(prompt_contains: &str, response: Value) -> Self {
        let planner = Self::new();
        planner
            .responses
            .write()
            .expect("responses lock")
            .insert(prompt_contains.to_string(), response);
        planner
    }

    pub fn add_response(&self, prompt_contains: &str, response: Value) {
        self.responses
            .write()
            .expect("responses lock")
            .insert(prompt_contains.to_string(), response);
    }

    pub fn with_default_response(mut self, response: Value) -> Self {
        self.default_response = Some(response);
        self
    }
}

#[async_trait]
impl Planner for FakePlanner {
    async fn invoke(&self, prompt: &str, _response_schema: &Value) -> Result<Value, LlmError> {
        let responses = self.responses.read().expect("responses lock");
        let prompt_lower = prompt.to_lowercase();

        for (pattern, response) in responses.iter() {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        self.default_response
            .clone()
            .ok_or_else(|| LlmError::RequestFailed("no fake response registered".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn matches_by_substring() {
        let planner = FakePlanner::with_response("meal plan", json!({"days": []}));
        let out = planner
            .invoke("Create a 7-day MEAL PLAN", &json!({}))
            .await
            .expect("invoke");
        assert_eq!(out, json!({"days": []}));
    }

    #[tokio::test]
    async fn errors_without_default() {
        let planner = FakePlanner::new();
        let err = planner.invoke("anything", &json!({})).await.unwrap_err();
        assert!(err.to_string().contains("no fake response"));
    }

    #[tokio::test]
    async fn falls_back_to_default() {
        let planner = FakePlanner::new().with_default_response(json!({"ok": true}));
        let out = planner.invoke("anything", &json!({})).await.expect("invoke");
        assert_eq!(out["ok"], json!(true));
    }
}
