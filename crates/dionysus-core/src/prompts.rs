//! Fixed prompt templates and user-facing texts.

use std::fmt::Write;

use dionysus_index::RetrievedDocument;
use dionysus_index::document::truncate_chars;

/// Content characters of each retrieved file placed into the answer context.
pub const CONTEXT_CONTENT_CHARS: usize = 2_000;

pub fn file_summary_prompt(source: &str, code: &str) -> String {
    format!(
        "You are an intelligent senior software engineer who specialises in onboarding junior \
software engineers onto projects.

You are onboarding a junior software engineer and explaining to them the purpose of the {source} file.
Here is the code:
---
{code}
---
Give a summary of no more than 100 words of the code above."
    )
}

const DIFF_PRIMER: &str = "You are an expert programmer, and you are trying to summarize a git diff.
Reminders about the git diff format:
For every file, there are a few metadata lines, like (for example):
```
diff --git a/lib/index.js b/lib/index.js
index aadf691..bfef603 100644
--- a/lib/index.js
+++ b/lib/index.js
```
This means that `lib/index.js` was modified in this commit. Note that this is only an example.
Then there is a specifier of the lines that were modified.
A line starting with `+` means it was added.
A line starting with `-` means that line was deleted.
A line that starts with neither `+` nor `-` is code given for context and better understanding.
It is not part of the diff.

EXAMPLE SUMMARY COMMENTS:
```
* Raised the amount of returned recordings from `10` to `100` [packages/server/recordings_api.ts], [packages/server/constants.ts]
* Fixed a typo in the github action name [.github/workflows/gpt-commit-summarizer.yml]
* Moved the `octokit` initialization to a separate file [src/octokit.ts], [src/index.ts]
* Added an API for completions [packages/utils/apis/completions.ts]
* Lowered numeric tolerance for test files
```
Most commits will have fewer comments than this example list.
The last comment does not include the file names,
because there were more than two relevant files in the hypothetical commit.
Do not include parts of the example in your summary.
It is given only as an example of appropriate comments.";

pub fn diff_summary_prompt(diff: &str) -> String {
    format!("{DIFF_PRIMER}\n\nPlease summarise the following diff file:\n\n{diff}")
}

pub const QUOTA_CONTEXT: &str = "Note: the embedding quota has been exceeded, so specific code \
context cannot be retrieved right now. Give a general answer.

To restore full functionality:
- Wait for the quota to reset (limits apply per minute, hour and day)
- Consider a plan with a higher quota

";

pub const STORE_UNAVAILABLE_CONTEXT: &str = "Note: the vector database is currently not \
available, so no code context could be retrieved. This usually means the store URL or its API \
key is misconfigured, or the store cannot be reached over the network.

For now, give a general answer based on common software development practices.

";

pub const EMPTY_CONTEXT: &str = "Note: no specific code context was found in the vector \
database. The repository might not have been indexed yet.

";

/// Labeled sections for each document in rank order.
pub fn render_documents(docs: &[RetrievedDocument]) -> String {
    let mut out = String::from("Here is relevant code context from the repository:\n\n");
    for doc in docs {
        let _ = write!(
            out,
            "--- File: {} ---\nSummary: {}\nContent:\n{}\n\n",
            doc.source,
            doc.summary,
            truncate_chars(&doc.content, CONTEXT_CONTENT_CHARS)
        );
    }
    out
}

pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are Dionysus, an intelligent AI assistant specialized in helping developers \
understand codebases.

You have access to a specific codebase and should answer questions based on the actual code \
context provided below.

{context}

User Question: {question}

Instructions:
- Answer the question based on the code context provided above
- If the context contains relevant information, use it to provide specific, accurate answers
- Include file names and code snippets when relevant
- Format your response in HTML with proper tags for readability
- If you cannot find relevant information in the context, say so honestly and provide general guidance
- Be helpful, clear, and concise

Answer:"
    )
}

/// Disclosure prepended to answers produced by the secondary provider.
pub fn failover_banner(primary: &str, secondary: &str) -> String {
    let primary = display_name(primary);
    let secondary = display_name(secondary);
    format!(
        "<div class=\"dionysus-failover\" style=\"padding: 10px; background-color: #e8f5e9; \
border-left: 4px solid #4caf50; margin-bottom: 15px;\">\n<small>ℹ️ <strong>Powered by \
{secondary}</strong> - {primary} quota exceeded, using {secondary} as failsafe</small>\n</div>"
    )
}

pub const QUOTA_FAILURE: &str = "<div style=\"padding: 20px; background-color: #fff3cd; \
border-left: 4px solid #ffc107;\">
<h3>⚠️ API Quota Exceeded</h3>
<p>I'm currently unable to process your question because the language model API quota has been exceeded.</p>
<p><strong>What this means:</strong> the API limits requests per minute, hour and day.</p>
<p><strong>Solutions:</strong></p>
<ul>
<li>Wait a few minutes and try again</li>
<li>Check your quota at: <a href=\"https://ai.google.dev/gemini-api/docs/rate-limits\" target=\"_blank\">Gemini API Rate Limits</a></li>
<li>Consider upgrading your API plan for higher quotas</li>
</ul>
</div>";

pub const CREDENTIALS_FAILURE: &str = "<div style=\"padding: 20px; background-color: #f8d7da; \
border-left: 4px solid #dc3545;\">
<h3>❌ API Key Error</h3>
<p>There seems to be an issue with the API key. Please check that GEMINI_API_KEY (and GROQ_API_KEY for the fallback provider) is set correctly.</p>
</div>";

pub const GENERIC_FAILURE: &str = "I'm sorry, but I encountered an error while processing your \
question. Please try again or contact support if the issue persists.";

pub const DIFF_FALLBACK: &str = "Unable to summarize commit changes";

pub fn file_fallback(source: &str) -> String {
    format!("Unable to generate summary for {source}")
}

fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retrieved(source: &str, content: &str) -> RetrievedDocument {
        RetrievedDocument {
            source: source.into(),
            content: content.into(),
            summary: format!("about {source}"),
            score: 1.0,
        }
    }

    #[test]
    fn documents_render_in_rank_order() {
        let ctx = render_documents(&[retrieved("b.go", "B"), retrieved("a.go", "A")]);
        let b = ctx.find("--- File: b.go ---").unwrap();
        let a = ctx.find("--- File: a.go ---").unwrap();
        assert!(b < a);
        assert!(ctx.contains("Summary: about a.go"));
        assert!(ctx.contains("Content:\nA\n"));
    }

    #[test]
    fn document_content_capped() {
        let long = "z".repeat(CONTEXT_CONTENT_CHARS + 10);
        let ctx = render_documents(&[retrieved("big.go", &long)]);
        assert!(ctx.contains(&"z".repeat(CONTEXT_CONTENT_CHARS)));
        assert!(!ctx.contains(&"z".repeat(CONTEXT_CONTENT_CHARS + 1)));
    }

    #[test]
    fn answer_prompt_embeds_context_and_question() {
        let p = answer_prompt("CTX", "what does a.go do");
        assert!(p.contains("CTX"));
        assert!(p.contains("User Question: what does a.go do"));
        assert!(p.contains("Format your response in HTML"));
    }

    #[test]
    fn file_prompt_mentions_source() {
        let p = file_summary_prompt("src/main.go", "package main");
        assert!(p.contains("purpose of the src/main.go file"));
        assert!(p.contains("no more than 100 words"));
    }

    #[test]
    fn diff_prompt_ends_with_diff() {
        assert!(diff_summary_prompt("+added").ends_with("+added"));
    }

    #[test]
    fn banner_discloses_secondary() {
        let b = failover_banner("gemini", "groq");
        assert!(b.contains("Powered by Groq"));
        assert!(b.contains("Gemini quota exceeded"));
    }

    #[test]
    fn display_name_capitalizes() {
        assert_eq!(display_name("groq"), "Groq");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn failure_texts_are_distinct() {
        assert_ne!(QUOTA_FAILURE, CREDENTIALS_FAILURE);
        assert_ne!(CREDENTIALS_FAILURE, GENERIC_FAILURE);
        assert_eq!(file_fallback("a.go"), "Unable to generate summary for a.go");
    }
}
