//! SVG projection of a state
//!
//! Components are drawn top to bottom in creation order as rounded boxes on a
//! background coloured by the theme. The output is a pure function of the
//! state, so a replayed state renders byte-identical to the live one.

use kuhul_core::{Component, ComponentType, PropKey, State, Theme};

const WIDTH: usize = 480;
const MARGIN: usize = 24;
const ROW_HEIGHT: usize = 56;
const ROW_GAP: usize = 16;

struct Palette {
    background: &'static str,
    foreground: &'static str,
    surface: &'static str,
    accent: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            background: "#111827",
            foreground: "#f9fafb",
            surface: "#1f2937",
            accent: "#6366f1",
        },
        Theme::Light => Palette {
            background: "#f9fafb",
            foreground: "#111827",
            surface: "#ffffff",
            accent: "#4f46e5",
        },
    }
}

/// Top edge of the box for the component at `index`
fn row_top(index: usize) -> usize {
    index
        .saturating_mul(ROW_HEIGHT + ROW_GAP)
        .saturating_add(MARGIN + ROW_HEIGHT)
}

/// Render `state` as a standalone SVG document
pub fn render_svg(state: &State) -> String {
    let colors = palette(state.theme);
    let rows = state.components.len();
    let height = row_top(rows).saturating_add(MARGIN);

    let mut output = String::new();
    output.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}">"#
    ));
    output.push('\n');
    output.push_str(&format!(
        r#"  <rect width="100%" height="100%" fill="{}"/>"#,
        colors.background
    ));
    output.push('\n');
    output.push_str(&format!(
        r#"  <text x="{MARGIN}" y="{}" font-family="sans-serif" font-size="14" fill="{}">theme={} epoch_ms={} components={}</text>"#,
        MARGIN + 16,
        colors.foreground,
        state.theme,
        state.epoch_ms,
        rows
    ));
    output.push('\n');

    for (index, component) in state.components.iter().enumerate() {
        render_component(&mut output, component, row_top(index), &colors);
    }

    output.push_str("</svg>\n");
    output
}

fn render_component(output: &mut String, component: &Component, y: usize, colors: &Palette) {
    let width = WIDTH - MARGIN * 2;
    let (fill, stroke, radius, text_fill) = match component.kind {
        ComponentType::Button => (colors.accent, colors.accent, 8, "#ffffff"),
        ComponentType::Card => (colors.surface, colors.foreground, 4, colors.foreground),
        ComponentType::ChatBubble => (colors.surface, colors.accent, 20, colors.foreground),
    };
    let caption = component
        .props
        .get(&PropKey::Label)
        .or_else(|| component.props.get(&PropKey::Text))
        .map(String::as_str)
        .unwrap_or(component.kind.as_str());

    output.push_str(&format!(
        "  <g id=\"{}\" data-type=\"{}\">\n",
        escape(&component.id),
        component.kind
    ));
    output.push_str(&format!(
        r#"    <rect x="{MARGIN}" y="{y}" width="{width}" height="{ROW_HEIGHT}" rx="{radius}" fill="{fill}" stroke="{stroke}"/>"#
    ));
    output.push('\n');
    output.push_str(&format!(
        r#"    <text x="{}" y="{}" font-family="sans-serif" font-size="16" fill="{text_fill}">{}</text>"#,
        MARGIN + 16,
        y.saturating_add(ROW_HEIGHT / 2 + 6),
        escape(caption)
    ));
    output.push('\n');
    output.push_str("  </g>\n");
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuhul_core::{Phase, Props};

    fn state(theme: Theme, components: Vec<Component>) -> State {
        State::new(theme, components, 42, Phase::Accepting)
    }

    #[test]
    fn test_empty_state() {
        let svg = render_svg(&state(Theme::Light, Vec::new()));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("#f9fafb"));
        assert!(svg.contains("components=0"));
    }

    #[test]
    fn test_components_in_order() {
        let components = vec![
            Component::new("a", ComponentType::Card, Props::new()).with_prop(PropKey::Label, "First"),
            Component::new("b", ComponentType::ChatBubble, Props::new())
                .with_prop(PropKey::Text, "Second"),
        ];
        let svg = render_svg(&state(Theme::Dark, components));
        let first = svg.find("First").unwrap();
        let second = svg.find("Second").unwrap();
        assert!(first < second);
        assert!(svg.contains(r#"data-type="chat-bubble""#));
        assert!(svg.contains("#111827"));
    }

    #[test]
    fn test_caption_falls_back_to_type() {
        let components = vec![Component::new("a", ComponentType::Button, Props::new())];
        let svg = render_svg(&state(Theme::Light, components));
        assert!(svg.contains(">button</text>"));
    }

    #[test]
    fn test_escapes_markup() {
        let components = vec![Component::new("a", ComponentType::Button, Props::new())
            .with_prop(PropKey::Text, "<b>&\"x\"</b>")];
        let svg = render_svg(&state(Theme::Light, components));
        assert!(svg.contains("&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn test_rows_stack_downwards() {
        assert_eq!(row_top(0), MARGIN + ROW_HEIGHT);
        assert_eq!(row_top(2) - row_top(1), ROW_HEIGHT + ROW_GAP);
        assert_eq!(row_top(usize::MAX), usize::MAX);

        let components = vec![
            Component::new("a", ComponentType::Card, Props::new()),
            Component::new("b", ComponentType::Card, Props::new()),
        ];
        let svg = render_svg(&state(Theme::Light, components));
        let height = row_top(2) + MARGIN;
        assert!(svg.contains(&format!(r#"height="{height}""#)));
        assert!(svg.contains(&format!(r#"y="{}""#, row_top(1))));
    }

    #[test]
    fn test_deterministic() {
        let components = vec![Component::new("a", ComponentType::Card, Props::new())];
        let s = state(Theme::Dark, components);
        assert_eq!(render_svg(&s), render_svg(&s));
    }
}
