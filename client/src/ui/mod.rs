pub mod commands;
pub mod render;

pub const DISCLAIMER: &str = "LegalAI provides general legal information. For specific legal advice, consult a qualified advocate.";

/// Starter prompts shown for an empty conversation.
pub const SUGGESTED_QUERIES: [(&str, &str); 4] = [
    (
        "Rights under Constitution",
        "What are my fundamental rights under the Indian Constitution?",
    ),
    (
        "Property Laws",
        "Explain the process of property registration in India",
    ),
    ("Contract Basics", "What makes a contract legally valid in India?"),
    ("Consumer Rights", "How can I file a consumer complaint?"),
];
