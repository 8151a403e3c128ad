//! Page style generation
//!
//! Turns [`PrintOptions`] into the CSS `@page` rule the print service uses to
//! size and fit the printed map.

use crate::constants::PAGE_FIT_RULES;
use crate::options::PrintOptions;
use crate::types::*;

/// Page geometry derived from the print options
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Value of the `size` declaration (`A4`, `210mm 297mm`, ...)
    pub size: String,
    pub units: Units,
    /// Numeric page dimensions, when the size was given as a pair
    pub dimensions: Option<[f64; 2]>,
    /// Rendered margin text, `None` when no margins apply
    pub margins: Option<String>,
}

impl PageLayout {
    /// Build the layout for `options`. Orientation does not affect it.
    pub fn build(options: &PrintOptions) -> Self {
        let units = options.page_units;
        let (size, dimensions) = match &options.page_size {
            PageSize::Named(name) => (name.clone(), None),
            PageSize::Dimensions([width, height]) => (
                format!("{}{} {}{}", width, units, height, units),
                Some([*width, *height]),
            ),
        };

        let margins = options
            .page_margins
            .as_ref()
            .map(|margins| render_margins(margins, units))
            .filter(|text| !text.is_empty());

        Self {
            size,
            units,
            dimensions,
            margins,
        }
    }

    /// The `@page` rule text
    pub fn page_rule(&self) -> String {
        let mut rule = format!("@page{{ size:{}; ", self.size);
        rule.push_str(PAGE_FIT_RULES);
        if let Some(margins) = &self.margins {
            rule.push_str("margins: ");
            rule.push_str(margins);
            rule.push_str("; ");
        }
        rule.push_str(" }");
        rule
    }

    /// The page rule wrapped in a `<style>` element, as sent to the service
    pub fn style_element(&self) -> String {
        format!("<style type=\"text/css\">{}</style>", self.page_rule())
    }
}

/// Convenience wrapper around [`PageLayout::build`]
pub fn build_layout(options: &PrintOptions) -> PageLayout {
    PageLayout::build(options)
}

// List margins are emitted last to first, each followed by a space.
fn render_margins(margins: &PageMargins, units: Units) -> String {
    match margins {
        PageMargins::Text(text) => text.clone(),
        PageMargins::List(values) => {
            let mut text = String::new();
            for value in values.iter().rev() {
                match value {
                    Margin::Keyword(keyword) => text.push_str(keyword),
                    Margin::Length(length) => {
                        text.push_str(&length.to_string());
                        text.push_str(units.suffix());
                    }
                }
                text.push(' ');
            }
            text
        }
    }
}
