//! Terminal markdown rendering with syntax-highlighted code blocks.
//!
//! `ChatRenderer` combines `termimad` for prose and `syntect` for fenced
//! code blocks. Replies arrive whole, so rendering happens once per turn.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;
use termimad::crossterm::style::Color;

/// Accent for headers and bold text.
const ACCENT: Color = Color::Cyan;

const THEME: &str = "base16-ocean.dark";

/// Terminal markdown renderer with syntax highlighting.
pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();

        skin.bold.set_fg(ACCENT);
        skin.headers[0].set_fg(ACCENT);
        skin.headers[1].set_fg(ACCENT);
        skin.inline_code.set_fg(Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a complete markdown reply.
    ///
    /// Code fences are highlighted via syntect; everything else goes through
    /// termimad.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.starts_with("```") && !in_code_block {
                in_code_block = true;
                code_lang = line.trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if line.starts_with("```") && in_code_block {
                in_code_block = false;
                output.push_str(&self.highlight_code(&code_buf, &code_lang));
                output.push('\n');
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                output.push_str(&self.skin.term_text(line).to_string());
            }
        }

        // Unclosed fence at the end of the reply.
        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    /// Print the footer after a reply.
    ///
    /// Format: "| {time}s . {model}"
    pub fn print_stats_footer(&self, response_ms: u64, model: &str) {
        let seconds = response_ms as f64 / 1000.0;
        println!(
            "\n  {} {:.1}s {} {}",
            console::style("|").dim(),
            console::style(seconds).dim(),
            console::style("\u{00b7}").dim(),
            console::style(model).dim(),
        );
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let mut output = String::new();
        output.push_str(&format!("  {}\n", console::style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get(THEME) else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };
        let mut h = HighlightLines::new(syntax, theme);

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_is_labelled_and_kept() {
        let renderer = ChatRenderer::new();

        let out = renderer.render_final("Here:\n```rust\nfn main() {}\n```\n");

        assert!(out.contains("--- rust ---"));
        assert!(out.contains("main"));
    }

    #[test]
    fn test_accent_applied_to_bold_and_headers() {
        let renderer = ChatRenderer::new();

        assert_eq!(renderer.skin.bold.get_fg(), Some(ACCENT));
        assert_eq!(renderer.skin.headers[0].compound_style.get_fg(), Some(ACCENT));
        assert_eq!(renderer.skin.inline_code.get_fg(), Some(Color::Yellow));
    }

    #[test]
    fn test_unclosed_fence_still_rendered() {
        let renderer = ChatRenderer::new();

        let out = renderer.render_final("```\nplain text");

        assert!(out.contains("plain text"));
    }
}
