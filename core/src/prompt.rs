//! System prompt construction and reply post-processing shared by the
//! provider clients.

use crate::types::{ChatMessage, GenerationRequest, ThinkingResponse, WireMessage};
use once_cell::sync::Lazy;
use regex::Regex;

static SOURCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Source \d+: [^\]]+\]").expect("valid source marker regex"));
static TITLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Title: [^\n]+\n").expect("valid title regex"));
static CATEGORY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Category: [^\n]+\n").expect("valid category regex"));
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));
static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>(.*?)</think>\s*").expect("valid think regex"));

const SCHOOL_NAME: &str = "St. Louis Demonstration Junior High School in Kumasi, Ghana";

/// Which instruction set a provider sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Context-grounded answers with a visible reasoning block
    Standard,
    /// Same role, with server-side web search and page visits available
    WebSearch,
}

/// Strips retrieval bookkeeping from context before it reaches the model
pub fn clean_context(context: &str) -> String {
    let cleaned = SOURCE_MARKER.replace_all(context, "");
    let cleaned = TITLE_LINE.replace_all(&cleaned, "");
    let cleaned = CATEGORY_LINE.replace_all(&cleaned, "");
    let cleaned = cleaned.replace("\n---\n\n", "\n\n");
    EXCESS_NEWLINES.replace_all(&cleaned, "\n\n").into_owned()
}

pub fn build_system_prompt(persona: Persona, context: &str) -> String {
    let cleaned = clean_context(context);
    let school_data = if cleaned.trim().is_empty() {
        String::new()
    } else {
        format!("\nRELEVANT SCHOOL DATA:\n{}\n", cleaned)
    };

    let mut prompt = String::new();
    match persona {
        Persona::Standard => prompt.push_str(&format!(
            "You are Louis AI, the intelligent assistant for {}.\n",
            SCHOOL_NAME
        )),
        Persona::WebSearch => prompt.push_str(&format!(
            "You are Louis AI, the intelligent assistant for {}, with access to real-time web search.\n",
            SCHOOL_NAME
        )),
    }

    prompt.push_str(
        "\nYOUR ROLE:\n\
         - Help students, parents and visitors with accurate information about the school\n\
         - Give academic guidance, admissions help and general school information\n\
         - Stay friendly, professional and encouraging\n",
    );

    prompt.push_str("\nSCHOOL INFORMATION:\n");
    prompt.push_str(&school_data);

    match persona {
        Persona::Standard => prompt.push_str(
            "\nTHINKING MODE:\n\
             Put your reasoning inside <think>...</think> before the final answer:\n\
             <think>\n[analysis of the question, how the school data applies, confidence]\n</think>\n\n\
             [final response to the user]\n",
        ),
        Persona::WebSearch => prompt.push_str(
            "\nWEB SEARCH CAPABILITIES:\n\
             - Use the web_search tool for current information\n\
             - Use the visit_website tool to read pages in detail\n\
             - Combine school data with current web data when relevant\n",
        ),
    }

    prompt.push_str(
        "\nRESPONSE GUIDELINES:\n\
         1. Only state information you are certain about\n\
         2. Keep the focus on school and educational topics\n\
         3. Use clear, simple language appropriate for students\n\
         4. Be respectful of Ghanaian culture and values\n",
    );
    if persona == Persona::Standard {
        prompt.push_str(
            "5. Do not include source references, citations or numbers in your response text\n",
        );
    }

    prompt.push_str(
        "\nRemember: you represent St. Louis Demonstration JHS. Support the school community \
         with accurate, useful information.",
    );
    prompt
}

/// System prompt, then history in order, then the new user message
pub fn build_messages<'a>(system_prompt: &'a str, request: &'a GenerationRequest) -> Vec<WireMessage<'a>> {
    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(WireMessage {
        role: crate::types::Role::System,
        content: system_prompt,
    });
    messages.extend(request.history.iter().map(|msg: &ChatMessage| WireMessage {
        role: msg.role,
        content: &msg.content,
    }));
    messages.push(WireMessage {
        role: crate::types::Role::User,
        content: &request.user_message,
    });
    messages
}

/// Removes every reasoning block from a reply
pub fn strip_thinking(text: &str) -> String {
    THINK_BLOCK.replace_all(text, "").trim().to_string()
}

/// Separates the first reasoning block from the answer.
///
/// Replies without a reasoning block come back whole with empty thinking.
pub fn split_thinking(text: &str) -> ThinkingResponse {
    match THINK_BLOCK.captures(text) {
        Some(captures) => {
            let thinking = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            let response = THINK_BLOCK.replacen(text, 1, "").trim().to_string();
            ThinkingResponse { response, thinking }
        }
        None => ThinkingResponse {
            response: text.to_string(),
            thinking: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_clean_context_strips_markers() {
        let context = "[Source 1: about] The school was founded in 1950.\n\
                       Title: About Us\n\
                       Category: General Information\n\
                       Located in Kumasi.\n---\n\nSecond chunk.\n\n\n\n\nEnd.";
        let cleaned = clean_context(context);

        assert!(!cleaned.contains("[Source"));
        assert!(!cleaned.contains("Title:"));
        assert!(!cleaned.contains("Category:"));
        assert!(!cleaned.contains("---"));
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.contains("The school was founded in 1950."));
        assert!(cleaned.contains("Located in Kumasi.\n\nSecond chunk.\n\nEnd."));
    }

    #[test]
    fn test_system_prompt_embeds_context_only_when_present() {
        let with = build_system_prompt(Persona::Standard, "Address: Kumasi");
        assert!(with.contains("RELEVANT SCHOOL DATA:\nAddress: Kumasi"));
        assert!(with.contains("<think>"));

        let without = build_system_prompt(Persona::Standard, "   ");
        assert!(!without.contains("RELEVANT SCHOOL DATA"));
    }

    #[test]
    fn test_web_search_persona_mentions_tools() {
        let prompt = build_system_prompt(Persona::WebSearch, "");
        assert!(prompt.contains("visit_website"));
        assert!(!prompt.contains("<think>"));
    }

    #[test]
    fn test_build_messages_order() {
        let request = GenerationRequest::new("And the fees?").with_history(vec![
            ChatMessage::user("Where is the school?"),
            ChatMessage::assistant("In Kumasi."),
        ]);
        let messages = build_messages("sys", &request);

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(messages[0].content, "sys");
        assert_eq!(messages[3].content, "And the fees?");
    }

    #[test]
    fn test_strip_thinking() {
        let reply = "<think>\nuser wants the address\n</think>\n\nWe are in Kumasi.";
        assert_eq!(strip_thinking(reply), "We are in Kumasi.");
        assert_eq!(strip_thinking("  plain answer "), "plain answer");
    }

    #[test]
    fn test_split_thinking() {
        let split = split_thinking("<think> weighing options </think>  Final answer.");
        assert_eq!(split.thinking, "weighing options");
        assert_eq!(split.response, "Final answer.");

        let plain = split_thinking("No reasoning here");
        assert_eq!(plain.thinking, "");
        assert_eq!(plain.response, "No reasoning here");
    }
}
