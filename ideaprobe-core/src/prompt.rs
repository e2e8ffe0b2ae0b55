//! LLM prompt templates and output extraction
//!
//! Prompts are plain string templates. LLM output is free-form, so anything read
//! back out of it is best-effort: extraction is attempted against a few known
//! fragment shapes and falls back to a templated default when none match.

use serde::{Deserialize, Serialize};

/// System message shared by every prompt
pub const SYSTEM_PROMPT: &str = "You are an experienced startup advisor who gives candid, \
specific and actionable feedback to early-stage founders.";

/// Number of distinct interview personas
pub const PERSONA_COUNT: usize = 5;

const PERSONAS: [&str; PERSONA_COUNT] = [
    "a budget-conscious small business owner",
    "an operations manager at a mid-sized company",
    "a skeptical enterprise procurement lead",
    "an early adopter who tries every new tool",
    "a consultant who advises companies in this market",
];

/// Minimum length of an extracted prompt for it to be considered usable
const MIN_EXTRACTED_LEN: usize = 20;

/// Prompt requesting HTML-formatted validation feedback for an idea
pub fn validation_prompt(idea: &str, target_market: &str) -> String {
    format!(
        "Evaluate the following startup idea for the {market} market.\n\n\
         Idea: {idea}\n\n\
         Respond in HTML using <h3> section headings and <ul> lists. Cover: \
         the problem and who has it, existing alternatives, key risks, \
         how to validate demand in the next two weeks, and an overall verdict.",
        market = target_market.trim(),
        idea = idea.trim(),
    )
}

/// Prompt simulating one customer interview about an idea
///
/// `persona_index` wraps around the built-in persona list.
pub fn interview_prompt(idea: &str, persona_index: usize) -> String {
    let persona = PERSONAS[persona_index % PERSONA_COUNT];
    format!(
        "Simulate a short customer discovery interview. You are {persona}. \
         A founder is pitching you this idea: {idea}\n\n\
         Answer as that person would, in first person: describe how you handle \
         this problem today, what you would pay for a solution, and what would \
         stop you from switching. Keep it under 200 words.",
        idea = idea.trim(),
    )
}

/// Display name of the persona used by `interview_prompt`
pub fn persona_name(persona_index: usize) -> &'static str {
    PERSONAS[persona_index % PERSONA_COUNT]
}

/// Prompt asking the LLM for a site-builder prompt wrapped in markup
pub fn site_builder_prompt(idea: &str) -> String {
    format!(
        "Write a prompt that a website builder AI can use to generate a landing \
         page for this startup idea: {idea}\n\n\
         Return the prompt inside a single <pre> element and nothing else.",
        idea = idea.trim(),
    )
}

/// Templated site-builder prompt used when extraction fails
pub fn fallback_site_prompt(idea: &str) -> String {
    format!(
        "Create a modern, conversion-focused landing page for the following startup \
         idea: {idea}. Include a hero section with a clear value proposition, a features \
         section, social proof and a call to action for early-access signups.",
        idea = idea.trim(),
    )
}

/// Where an extracted prompt came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptSource {
    Extracted,
    Fallback,
}

/// Site-builder prompt read out of an LLM response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPrompt {
    pub text: String,
    pub source: PromptSource,
}

/// Extract the site-builder prompt from an LLM response
///
/// Tries `<pre>`, `<code>`, `<blockquote>` and `<p class="prompt">` fragments in
/// that order, then a `Prompt:` line. Falls back to `fallback_site_prompt`.
pub fn extract_site_prompt(response: &str, idea: &str) -> ExtractedPrompt {
    let response = strip_code_fences(response);

    let candidate = ["pre", "code", "blockquote"]
        .iter()
        .flat_map(|tag| tag_fragments(response, tag, None))
        .chain(tag_fragments(response, "p", Some("prompt")))
        .chain(labelled_line(response, "prompt:"))
        .map(|raw| clean_fragment(&raw))
        .find(|text| text.chars().count() >= MIN_EXTRACTED_LEN);

    match candidate {
        Some(text) => ExtractedPrompt {
            text,
            source: PromptSource::Extracted,
        },
        None => ExtractedPrompt {
            text: fallback_site_prompt(idea),
            source: PromptSource::Fallback,
        },
    }
}

/// Remove a surrounding markdown code fence such as ```html ... ```
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Inner text of every `<tag ...>...</tag>` element, in document order
///
/// When `class` is given only elements whose opening tag mentions that class
/// are kept. Tag matching is ASCII case-insensitive. Unterminated elements are
/// skipped rather than ending the scan.
fn tag_fragments(html: &str, tag: &str, class: Option<&str>) -> Vec<String> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);

    let mut fragments = Vec::new();
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find(&open) {
        let start = search_from + rel;
        let after_name = start + open.len();
        search_from = after_name;

        // Reject longer tag names sharing the prefix, e.g. <pre> vs <preview>
        match lower[after_name..].chars().next() {
            Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('/') => {}
            _ => continue,
        }

        let Some(open_len) = lower[after_name..].find('>') else {
            continue;
        };
        let open_end = after_name + open_len;
        if let Some(class) = class {
            if !lower[start..open_end].contains(class) {
                continue;
            }
        }

        let content_start = open_end + 1;
        let Some(content_len) = lower[content_start..].find(&close) else {
            continue;
        };
        let content_end = content_start + content_len;
        fragments.push(html[content_start..content_end].to_string());
        search_from = content_end + close.len();
    }

    fragments
}

/// Text following a `label` at the start of a line, case-insensitive
fn labelled_line(text: &str, label: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let trimmed = line.trim_start();
        let head = trimmed.get(..label.len())?;
        head.eq_ignore_ascii_case(label)
            .then(|| trimmed[label.len()..].to_string())
    })
}

/// Strip nested tags, decode common entities and collapse whitespace
fn clean_fragment(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
