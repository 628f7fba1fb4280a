use feedtag_core::TagSet;
use serde_json::{Value, json};

// ── Prompt templates ──

pub const SYSTEM_INSTRUCTION: &str = "\
You are a helpful assistant that summarizes LinkedIn posts. \
You must provide a structured output with a concise summary and categorize the post.";

pub const FUNCTION_DESCRIPTION: &str = "Summarize and classify a LinkedIn post";

pub const VERIFY_PROMPT: &str =
    "Hello! Please respond with 'API connection successful' if you receive this message.";

pub fn build_user_prompt(post: &str) -> String {
    format!(
        "Please analyze the following LinkedIn post:\n\
         \n\
         {post}\n\
         \n\
         Provide a concise summary of the key points in 2-3 short sentences \
         and classify this post with the most appropriate tag."
    )
}

/// Prompt for plain-text mode, where no function is declared and the answer
/// has to be scraped from the completion.
pub fn build_text_prompt(post: &str, tag_set: TagSet) -> String {
    format!(
        "{base}\n\
         \n\
         Respond with a JSON object with the keys \"summary\" and \"tag\". \
         The tag must be one of: {tags}.",
        base = build_user_prompt(post),
        tags = tag_list(tag_set),
    )
}

/// JSON schema for the analysis function's parameters.
pub fn output_schema(tag_set: TagSet) -> Value {
    let tags: Vec<&str> = tag_set.tags().iter().map(|t| t.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "summary": {
                "type": "string",
                "description": "A concise summary of the LinkedIn post in 2-3 short sentences."
            },
            "tag": {
                "type": "string",
                "enum": tags,
                "description": "Classification of the LinkedIn post content."
            }
        },
        "required": ["summary", "tag"]
    })
}

fn tag_list(tag_set: TagSet) -> String {
    tag_set
        .tags()
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
