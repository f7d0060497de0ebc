//! Local stand-in image used whenever the real pipeline fails: a gradient
//! card with the style label and the word-wrapped prompt, encoded as an SVG
//! data URL so it renders and persists exactly like a provider image.

use base64::Engine;

use crate::models::{AspectRatio, Style};

const GRADIENT_FROM: &str = "#7c3aed";
const GRADIENT_TO: &str = "#22d3ee";
const EMPTY_PROMPT_TEXT: &str = "Your prompt will appear here";

// SVG has no text measurement; 0.6em per glyph is close enough for the
// overlay font at these sizes.
const GLYPH_ADVANCE_EM: f32 = 0.6;
const TEXT_WIDTH_FRACTION: f32 = 0.82;

/// Renders the placeholder at the exact pixel dimensions of `ratio` and
/// returns it as a `data:image/svg+xml;base64,` URL. Never empty: a blank
/// prompt is replaced by a stock phrase.
pub fn render(prompt: &str, style: Style, ratio: AspectRatio) -> String {
    let (w, h) = ratio.dimensions();
    let max_width = w as f32 * TEXT_WIDTH_FRACTION;

    let style_size = std::cmp::max(20, w / 24);
    let style_leading = std::cmp::max(24, w / 28);
    let prompt_size = std::cmp::max(16, w / 30);
    let prompt_leading = std::cmp::max(22, w / 32);

    let prompt = prompt.trim();
    let prompt = if prompt.is_empty() {
        EMPTY_PROMPT_TEXT
    } else {
        prompt
    };

    let cx = w / 2;
    let mut texts = String::new();
    let mut y = h as i64 / 2 - 24;
    for line in wrap_text(style.label(), style_size, max_width) {
        texts.push_str(&text_element(cx, y, style_size, true, &line));
        y += style_leading as i64;
    }
    let mut y = h as i64 / 2 + 20;
    for line in wrap_text(prompt, prompt_size, max_width) {
        texts.push_str(&text_element(cx, y, prompt_size, false, &line));
        y += prompt_leading as i64;
    }

    let svg = format!(
        concat!(
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            r#"<defs><linearGradient id="g" x1="0%" y1="0%" x2="100%" y2="100%">"#,
            r#"<stop offset="0%" stop-color="{from}"/><stop offset="100%" stop-color="{to}"/>"#,
            r#"</linearGradient></defs>"#,
            r#"<rect width="{w}" height="{h}" fill="url(#g)"/>"#,
            r#"<rect width="{w}" height="{h}" fill="black" fill-opacity="0.35"/>"#,
            "{texts}</svg>"
        ),
        w = w,
        h = h,
        from = GRADIENT_FROM,
        to = GRADIENT_TO,
        texts = texts,
    );

    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(svg.as_bytes())
    )
}

fn text_element(cx: u32, y: i64, size: u32, bold: bool, line: &str) -> String {
    let weight = if bold { r#" font-weight="bold""# } else { "" };
    format!(
        r#"<text x="{cx}" y="{y}" font-family="Inter, Arial, sans-serif" font-size="{size}"{weight} fill="white" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
        xml_escape(line)
    )
}

/// Greedy word wrap: pack words while the estimated line width fits, start a
/// new line on overflow. A single over-long word still gets its own line.
fn wrap_text(text: &str, font_size: u32, max_width: f32) -> Vec<String> {
    let advance = font_size as f32 * GLYPH_ADVANCE_EM;
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate_len = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if !line.is_empty() && candidate_len as f32 * advance > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        } else {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use pretty_assertions::assert_eq;

    fn decode(data_url: &str) -> String {
        let b64 = data_url
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("placeholder should be an SVG data URL");
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn dimensions_match_the_ratio_table() {
        let cases = [
            (AspectRatio::Square, 1024, 1024),
            (AspectRatio::Wide, 1280, 720),
            (AspectRatio::Tall, 720, 1280),
            (AspectRatio::Classic, 1200, 900),
            (AspectRatio::Portrait, 900, 1200),
        ];
        for (ratio, w, h) in cases {
            let svg = decode(&render("a red bicycle", Style::Photorealistic, ratio));
            assert!(
                svg.contains(&format!(r#"<svg width="{w}" height="{h}""#)),
                "wrong dimensions for {ratio:?}: {svg}"
            );
        }
    }

    #[test]
    fn prompt_and_style_label_are_drawn() {
        let svg = decode(&render("a red bicycle", Style::Cyberpunk, AspectRatio::Square));
        assert!(svg.contains("a red bicycle"));
        assert!(svg.contains("Cyberpunk"));
    }

    #[test]
    fn empty_prompt_still_produces_text() {
        let svg = decode(&render("   ", Style::Photorealistic, AspectRatio::Square));
        assert!(svg.contains(EMPTY_PROMPT_TEXT));
    }

    #[test]
    fn long_prompts_wrap_onto_multiple_lines() {
        let prompt = "an extremely detailed panoramic view of a futuristic city \
                      at golden hour with flying vehicles and towering glass spires";
        let svg = decode(&render(prompt, Style::Photorealistic, AspectRatio::Square));
        let lines = svg.matches("<text").count();
        // one line for the style label, several for the prompt
        assert!(lines > 2, "expected wrapped prompt, got {lines} text nodes");
    }

    #[test]
    fn markup_in_prompts_is_escaped() {
        let svg = decode(&render(
            "<script>alert('x')</script> & friends",
            Style::Photorealistic,
            AspectRatio::Square,
        ));
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;"));
        assert!(svg.contains("&amp; friends"));
    }

    #[test]
    fn wrap_respects_the_width_budget() {
        // 10 chars per line at advance 6.0 and width 60
        let lines = wrap_text("aaa bbb ccc ddd", 10, 60.0);
        assert_eq!(lines, vec!["aaa bbb".to_string(), "ccc ddd".to_string()]);
    }
}
