//! Block-level view of a rendered smart image.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::application::services::RenderedImage;

const FALLBACK_TITLE: &str = "image";

/// Colors used by [`SmartImageView`].
pub struct SmartImageViewStyle {
    /// Block border.
    pub border: Style,
    /// Alt text in the title.
    pub title: Style,
    /// Bound source line.
    pub source: Style,
    /// Attribute names.
    pub attribute_key: Style,
    /// Attribute values.
    pub attribute_value: Style,
}

impl Default for SmartImageViewStyle {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            source: Style::default().fg(Color::Cyan),
            attribute_key: Style::default().fg(Color::Gray),
            attribute_value: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Renders the bound source across the full width of its area.
pub struct SmartImageView<'a> {
    image: &'a RenderedImage,
    style: SmartImageViewStyle,
}

impl<'a> SmartImageView<'a> {
    /// Creates a view with the default style.
    #[must_use]
    pub fn new(image: &'a RenderedImage) -> Self {
        Self {
            image,
            style: SmartImageViewStyle::default(),
        }
    }

    /// Replaces the style.
    #[must_use]
    pub fn style(mut self, style: SmartImageViewStyle) -> Self {
        self.style = style;
        self
    }

    /// Rows needed to show the image: borders, source line and one row per attribute.
    #[must_use]
    pub fn height(&self) -> u16 {
        let rows = 3 + self.image.attributes.len();
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    fn title(&self) -> &str {
        if self.image.alt_text.is_empty() {
            FALLBACK_TITLE
        } else {
            &self.image.alt_text
        }
    }
}

impl Widget for SmartImageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 3 {
            return;
        }

        let block = Block::bordered()
            .border_style(self.style.border)
            .title(Span::styled(format!(" {} ", self.title()), self.style.title));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::with_capacity(1 + self.image.attributes.len());
        lines.push(Line::from(Span::styled(
            self.image.source.as_str(),
            self.style.source,
        )));
        for (key, value) in &self.image.attributes {
            lines.push(Line::from(vec![
                Span::styled(format!("{key}: "), self.style.attribute_key),
                Span::styled(value.as_str(), self.style.attribute_value),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::application::services::DisplayMode;

    fn rendered(alt: &str, attributes: &[(&str, &str)]) -> RenderedImage {
        RenderedImage {
            source: "https://x.io/a.png".to_string(),
            alt_text: alt.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
            display: DisplayMode::Block,
        }
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_renders_alt_source_and_attributes() {
        let image = rendered("cat", &[("class", "rounded")]);
        let view = SmartImageView::new(&image);
        assert_eq!(view.height(), 4);

        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);

        assert!(row(&buf, 0).contains(" cat "));
        assert!(row(&buf, 1).contains("https://x.io/a.png"));
        assert!(row(&buf, 2).contains("class: rounded"));
    }

    #[test]
    fn test_fallback_title_without_alt_text() {
        let image = rendered("", &[]);
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        SmartImageView::new(&image).render(area, &mut buf);

        assert!(row(&buf, 0).contains(" image "));
    }

    #[test]
    fn test_too_small_area_renders_nothing() {
        let image = rendered("cat", &[]);
        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        SmartImageView::new(&image).render(area, &mut buf);

        assert_eq!(buf, Buffer::empty(area));
    }
}
