//! HTML report rendering.
//!
//! Each report section has its own template under `templates/`. Sections
//! are rendered separately from a typed view and composed by `report.html`,
//! so markup changes stay out of this module.
//!
//! Two differences in output bytes are intentional: escaping is opt-in
//! (see [`HtmlRenderer::with_escaping`]), and table-of-contents links carry
//! `href="#cat-..."` next to the `scrollToSection` handler so they also work
//! with scripts disabled.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::Result;
use crate::report::Report;
use crate::types::MatchedTrait;

const REPORT_TEMPLATE: &str = include_str!("../../templates/report.html");
const HEADER_TEMPLATE: &str = include_str!("../../templates/header.html");
const TOC_TEMPLATE: &str = include_str!("../../templates/toc.html");
const OVERVIEW_TEMPLATE: &str = include_str!("../../templates/overview.html");
const CATEGORY_TEMPLATE: &str = include_str!("../../templates/category.html");
const DISCLAIMER_TEMPLATE: &str = include_str!("../../templates/disclaimer.html");

const DEFAULT_ICON: &str = "🧬";

/// Width of the effect bar, in percent, for an effect level.
///
/// A keyword heuristic for presentation only.
pub fn effect_level_percent(effect_level: &str) -> u8 {
    let level = effect_level.to_uppercase();

    if level.contains("HIGH") && !level.contains("LOW") {
        80
    } else if level.contains("LOW") {
        30
    } else if ["MEDIUM", "INTERMEDIATE", "TYPICAL"]
        .iter()
        .any(|keyword| level.contains(keyword))
    {
        55
    } else {
        50
    }
}

/// Anchor id of a category section; spaces become hyphens.
pub fn category_anchor(category: &str) -> String {
    format!("cat-{}", category.replace(' ', "-"))
}

pub fn category_icon(category: &str) -> &'static str {
    match category {
        "Nutrition" => "🥦",
        "Fitness" => "🏃‍♀️",
        "Sleep" => "😴",
        "Neurobehavior" => "🧠",
        "Sensory" => "👁️",
        "Appearance" => "🌈",
        _ => DEFAULT_ICON,
    }
}

#[derive(Debug, Serialize)]
struct CategoryLink<'a> {
    name: &'a str,
    anchor: String,
    icon: &'static str,
}

#[derive(Debug, Serialize)]
struct TraitCard<'a> {
    #[serde(flatten)]
    details: &'a MatchedTrait,
    percent: u8,
}

#[derive(Debug, Serialize)]
struct CategorySection<'a> {
    name: &'a str,
    anchor: String,
    icon: &'static str,
    cards: Vec<TraitCard<'a>>,
}

/// Renders reports through the section templates.
///
/// Interpolated text is emitted as-is unless escaping is enabled with
/// [`HtmlRenderer::with_escaping`]; escaping changes the output bytes for
/// any text containing markup characters.
pub struct HtmlRenderer {
    tera: Tera,
    escape: bool,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self> {
        Self::with_escaping(false)
    }

    pub fn with_escaping(escape: bool) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("report.html", REPORT_TEMPLATE),
            ("header.html", HEADER_TEMPLATE),
            ("toc.html", TOC_TEMPLATE),
            ("overview.html", OVERVIEW_TEMPLATE),
            ("category.html", CATEGORY_TEMPLATE),
            ("disclaimer.html", DISCLAIMER_TEMPLATE),
        ])?;
        if !escape {
            tera.autoescape_on(vec![]);
        }

        Ok(Self { tera, escape })
    }

    /// Render the complete document, with the overview block only when a
    /// non-blank summary is given.
    pub fn render(&self, report: &Report, summary: Option<&str>) -> Result<String> {
        let overview = match summary.filter(|text| !text.trim().is_empty()) {
            Some(text) => Some(self.render_overview(text)?),
            None => None,
        };
        let sections = report
            .traits_by_category()
            .into_iter()
            .map(|(category, traits)| self.render_category(category, &traits))
            .collect::<Result<Vec<String>>>()?;

        let mut context = Context::new();
        context.insert("header", &self.render_header(report)?);
        context.insert("toc", &self.render_toc(report)?);
        context.insert("overview", &overview);
        context.insert("sections", &sections);
        context.insert("disclaimer", &self.tera.render("disclaimer.html", &Context::new())?);

        Ok(self.tera.render("report.html", &context)?)
    }

    pub fn render_header(&self, report: &Report) -> Result<String> {
        let summary = report.summary();
        let mut context = Context::new();
        context.insert("num_traits_found", &summary.num_traits_found);
        context.insert("categories", &summary.categories);
        Ok(self.tera.render("header.html", &context)?)
    }

    /// Table of contents over the summary's sorted categories; `None` for
    /// an empty report.
    pub fn render_toc(&self, report: &Report) -> Result<Option<String>> {
        let categories = &report.summary().categories;
        if categories.is_empty() {
            return Ok(None);
        }

        let links: Vec<CategoryLink> = categories
            .iter()
            .map(|name| CategoryLink {
                name,
                anchor: category_anchor(name),
                icon: category_icon(name),
            })
            .collect();

        let mut context = Context::new();
        context.insert("links", &links);
        Ok(Some(self.tera.render("toc.html", &context)?))
    }

    pub fn render_overview(&self, summary: &str) -> Result<String> {
        let text = if self.escape {
            tera::escape_html(summary)
        } else {
            summary.to_string()
        };

        let mut context = Context::new();
        context.insert("overview", &text.replace('\n', "<br>"));
        Ok(self.tera.render("overview.html", &context)?)
    }

    pub fn render_category(&self, category: &str, traits: &[&MatchedTrait]) -> Result<String> {
        let section = CategorySection {
            name: category,
            anchor: category_anchor(category),
            icon: category_icon(category),
            cards: traits
                .iter()
                .map(|t| TraitCard {
                    details: *t,
                    percent: effect_level_percent(&t.effect_level),
                })
                .collect(),
        };

        Ok(self
            .tera
            .render("category.html", &Context::from_serialize(&section)?)?)
    }
}

/// Render a report as a self-contained HTML document without escaping.
pub fn render_html(report: &Report, summary: Option<&str>) -> Result<String> {
    HtmlRenderer::new()?.render(report, summary)
}
