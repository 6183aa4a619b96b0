//! Truncation Utilities
//!
//! Caps free text (advisory narratives, relay details) on UTF-8 boundaries,
//! preferring to break at whitespace.

const APPROX_BYTES_PER_TOKEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    Bytes(usize),
    Tokens(usize),
}

impl TruncationPolicy {
    pub fn byte_budget(&self) -> usize {
        match self {
            TruncationPolicy::Bytes(b) => *b,
            TruncationPolicy::Tokens(t) => t.saturating_mul(APPROX_BYTES_PER_TOKEN),
        }
    }
}

/// Keep the head of `content` within the policy's byte budget, ending in `...`
/// when anything was cut.
pub fn cap_text(content: &str, policy: TruncationPolicy) -> String {
    let max_bytes = policy.byte_budget();
    if content.len() <= max_bytes {
        return content.to_string();
    }

    let mut end = 0;
    for (idx, c) in content.char_indices() {
        let char_end = idx + c.len_utf8();
        if char_end > max_bytes {
            break;
        }
        end = char_end;
    }

    let head = &content[..end];
    let head = match head.rfind(char::is_whitespace) {
        Some(ws) if ws > 0 => &head[..ws],
        _ => head,
    };
    format!("{}...", head.trim_end())
}
