//! Fenced code block extraction for submitted DSA answers.
//!
//! Precedence: the first language-tagged fence wins; otherwise the first
//! untagged fence; otherwise nothing. An unterminated fence runs to the end
//! of the message.

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Lowercased first word of the fence info string, if any.
    pub language: Option<String>,
    pub code: String,
}

impl CodeBlock {
    pub fn is_blank(&self) -> bool {
        self.code.trim().is_empty()
    }

    /// Language name for prompts; untagged fences are assumed to be Python,
    /// which is what the coding editor submits.
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("python")
    }
}

pub fn extract_code_block(text: &str) -> Option<CodeBlock> {
    let blocks = scan_blocks(text);
    let tagged = blocks.iter().position(|b| b.language.is_some());
    match tagged {
        Some(index) => blocks.into_iter().nth(index),
        None => blocks.into_iter().next(),
    }
}

fn scan_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let Some(info) = line.trim_start().strip_prefix(FENCE) else {
            continue;
        };

        // Same-line block: ```python print(1)```
        if let Some(inner) = info.strip_suffix(FENCE) {
            if !inner.trim().is_empty() {
                let (language, code) = split_inline(inner);
                blocks.push(CodeBlock { language, code });
                continue;
            }
        }

        let language = info
            .split_whitespace()
            .next()
            .filter(|tag| tag.chars().all(|c| c.is_ascii_alphanumeric() || "+#-_.".contains(c)))
            .map(str::to_ascii_lowercase);

        let mut body = Vec::new();
        for inner in lines.by_ref() {
            if inner.trim() == FENCE {
                break;
            }
            body.push(inner);
        }

        blocks.push(CodeBlock {
            language,
            code: body.join("\n").trim_matches('\n').to_string(),
        });
    }

    blocks
}

fn split_inline(inner: &str) -> (Option<String>, String) {
    let trimmed = inner.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((tag, rest)) if is_known_language(tag) => {
            (Some(tag.to_ascii_lowercase()), rest.trim().to_string())
        }
        _ => (None, trimmed.to_string()),
    }
}

fn is_known_language(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "python" | "py" | "rust" | "rs" | "java" | "javascript" | "js" | "typescript" | "ts"
            | "go" | "c" | "cpp" | "c++" | "csharp" | "cs" | "kotlin" | "swift" | "ruby"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_language_tagged_block() {
        let msg = "Here is my answer:\n\n```python\ndef add(a, b):\n    return a + b\n```\n";
        let block = extract_code_block(msg).unwrap();
        assert_eq!(block.language.as_deref(), Some("python"));
        assert_eq!(block.code, "def add(a, b):\n    return a + b");
    }

    #[test]
    fn test_prefers_tagged_block_over_earlier_generic_block() {
        let msg = "Output:\n```\n3\n```\nCode:\n```rust\nfn main() {}\n```";
        let block = extract_code_block(msg).unwrap();
        assert_eq!(block.language.as_deref(), Some("rust"));
        assert_eq!(block.code, "fn main() {}");
    }

    #[test]
    fn test_falls_back_to_generic_block() {
        let msg = "```\nprint('hi')\n```";
        let block = extract_code_block(msg).unwrap();
        assert_eq!(block.language, None);
        assert_eq!(block.code, "print('hi')");
        assert_eq!(block.language_or_default(), "python");
    }

    #[test]
    fn test_no_fence_yields_none() {
        assert!(extract_code_block("I would use a hash map for O(n) lookups.").is_none());
        assert!(extract_code_block("").is_none());
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let block = extract_code_block("```python\nx = 1\ny = 2").unwrap();
        assert_eq!(block.code, "x = 1\ny = 2");
    }

    #[test]
    fn test_empty_block_is_blank() {
        let block = extract_code_block("```python\n\n```").unwrap();
        assert!(block.is_blank());
    }

    #[test]
    fn test_inline_block_on_one_line() {
        let block = extract_code_block("```python print(1)```").unwrap();
        assert_eq!(block.language.as_deref(), Some("python"));
        assert_eq!(block.code, "print(1)");

        let block = extract_code_block("```print(1)```").unwrap();
        assert_eq!(block.language, None);
        assert_eq!(block.code, "print(1)");
    }

    #[test]
    fn test_indented_fence_is_recognised() {
        let block = extract_code_block("  ```Python\n  return 1\n  ```").unwrap();
        assert_eq!(block.language.as_deref(), Some("python"));
        assert_eq!(block.code, "  return 1");
    }
}
