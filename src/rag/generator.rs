//! Grounded answer generation.

use super::context::format_context_for_prompt;
use crate::chunking::Passage;
use crate::config::{GenerationSettings, Prompts};
use crate::error::{DocentError, Result};
use crate::openai::{create_client, is_transient};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait for answer generation from retrieved context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Answer `question` using only `context`. Fails with
    /// [`DocentError::NoContext`] when `context` is empty.
    async fn generate(&self, question: &str, context: &[Passage]) -> Result<String>;
}

/// Answer generator backed by an OpenAI-compatible chat completions endpoint.
pub struct ChatGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

impl ChatGenerator {
    /// Create a new generator.
    pub fn new(settings: &GenerationSettings, api_key: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(settings.api_base.as_deref(), api_key, timeout)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts: Prompts::default(),
        })
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the user prompt for a question and its context.
    pub fn render_prompt(&self, question: &str, context: &[Passage]) -> String {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(context));

        self.prompts.render_with_custom(&self.prompts.rag.user, &vars)
    }

    fn build_messages(
        &self,
        question: &str,
        context: &[Passage],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let system = self
            .prompts
            .render_with_custom(&self.prompts.rag.system, &HashMap::new());

        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| DocentError::generation(e.to_string(), false))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(self.render_prompt(question, context))
                .build()
                .map_err(|e| DocentError::generation(e.to_string(), false))?
                .into(),
        ])
    }
}

#[async_trait]
impl AnswerGenerator for ChatGenerator {
    #[instrument(skip(self, context), fields(model = %self.model, passages = context.len()))]
    async fn generate(&self, question: &str, context: &[Passage]) -> Result<String> {
        if context.is_empty() {
            return Err(DocentError::NoContext);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.build_messages(question, context)?)
            .temperature(self.temperature)
            .build()
            .map_err(|e| DocentError::generation(e.to_string(), false))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            DocentError::generation(
                format!("Failed to generate response: {}", e),
                is_transient(&e),
            )
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| DocentError::generation("Empty response from LLM", false))?
            .clone();

        debug!("Generated answer of {} chars", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ChatGenerator {
        ChatGenerator::new(
            &GenerationSettings::default(),
            "gsk-test",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_context_is_rejected() {
        let result = generator().generate("What is the attendance policy?", &[]).await;
        assert!(matches!(result, Err(DocentError::NoContext)));
    }

    #[test]
    fn test_prompt_contains_context_and_question() {
        let context = vec![Passage::new(
            "Students must attend 75% of lectures.".to_string(),
            7,
            (0, 37),
        )];
        let prompt = generator().render_prompt("What is the attendance policy?", &context);

        assert!(prompt.contains("provided context only"));
        assert!(prompt.contains("<context>"));
        assert!(prompt.contains("(page 7)\nStudents must attend 75% of lectures."));
        assert!(prompt.ends_with("Question: What is the attendance policy?"));
    }

    #[test]
    fn test_messages_have_system_and_user() {
        let context = vec![Passage::new("Fees are due in August.".to_string(), 2, (0, 23))];
        let messages = generator().build_messages("When are fees due?", &context).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_placeholders_in_question_are_not_expanded() {
        let context = vec![Passage::new("SECRET PASSAGE".to_string(), 1, (0, 14))];
        let gen = generator();

        for _ in 0..20 {
            let prompt = gen.render_prompt("what does {{context}} mean?", &context);
            assert_eq!(prompt.matches("SECRET PASSAGE").count(), 1);
            assert!(prompt.ends_with("Question: what does {{context}} mean?"));
        }
    }

    #[test]
    fn test_placeholders_in_passage_are_not_expanded() {
        let context = vec![Passage::new("Write {{question}} here".to_string(), 3, (0, 23))];
        let prompt = generator().render_prompt("Where do I sign?", &context);

        assert!(prompt.contains("(page 3)\nWrite {{question}} here"));
        assert_eq!(prompt.matches("Where do I sign?").count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_generation_is_not_retried() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "message": "Rate limit reached for model",
                    "type": "rate_limit_exceeded",
                    "param": null,
                    "code": null
                }
            })))
            .mount(&server)
            .await;

        let settings = GenerationSettings {
            api_base: Some(server.uri()),
            ..GenerationSettings::default()
        };
        let generator = ChatGenerator::new(&settings, "gsk-test", Duration::from_secs(5)).unwrap();
        let context = vec![Passage::new("Fees are due in August.".to_string(), 2, (0, 23))];

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            generator.generate("When are fees due?", &context),
        )
        .await
        .expect("generation should fail fast on 429");

        assert!(matches!(
            result,
            Err(DocentError::GenerationService { transient: true, .. })
        ));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }
}
