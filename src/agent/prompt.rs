// ABOUTME: Renders the fixed system message sent ahead of every conversation.
// ABOUTME: Lists each registered tool with an example argument object and the marker syntax.

use crate::tool::Registry;

const PREAMBLE: &str =
    "You are a helpful AI orchestrator with access to multiple tools and AI providers.";

const USAGE: &str = "Tool usage format:
[TOOL:tool_name]
{\"argument\": \"value\"}
[/TOOL]

Always provide clear, formatted responses and explain your reasoning when using multiple tools.";

/// Build the system message for `tools`.
pub fn system_prompt(tools: &Registry) -> String {
    let mut prompt = String::from(PREAMBLE);
    prompt.push_str("\n\nAvailable tools:\n");

    for tool in tools.all() {
        prompt.push_str(&format!(
            "- {}: {} Use {} format.\n",
            tool.name(),
            tool.description(),
            tool.example()
        ));
    }
    if tools.is_empty() {
        prompt.push_str("(none)\n");
    }

    prompt.push('\n');
    prompt.push_str(USAGE);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tools::default_tools;

    #[test]
    fn test_prompt_lists_tools_with_examples() {
        let prompt = system_prompt(&default_tools(&Config::default()));

        assert!(prompt.starts_with(PREAMBLE));
        assert!(prompt.contains(
            "- zipcode_lookup: Look up Brazilian addresses by postal code (CEP). Use {\"zipcode\":\"01310-100\"} format."
        ));
        assert!(prompt.contains("- ai_comparison: Compare responses from multiple AI providers. Use {"));
        assert!(prompt.contains("\"providers\":[\"claude\",\"openai\",\"gemini\"]"));
        assert!(prompt.ends_with(USAGE));
    }

    #[test]
    fn test_prompt_without_tools() {
        let prompt = system_prompt(&Registry::new());
        assert!(prompt.contains("Available tools:\n(none)\n"));
        assert!(prompt.contains("[TOOL:tool_name]"));
    }
}
