use std::fmt;

use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;

pub use index::{IndexVersion, TemplateGroup, TemplateIndex};
pub use template::{HexColor, Levels, MaskSource, MockupTemplate, ScreenPoints};

mod template {
    use super::*;

    /// Four screen corners in base-image pixels, wound top-left, bottom-left,
    /// bottom-right, top-right.
    #[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
    #[serde(transparent)]
    pub struct ScreenPoints(pub [[f32; 2]; 4]);

    impl ScreenPoints {
        pub fn scaled(&self, factor: f32) -> [[f32; 2]; 4] {
            self.0.map(|[x, y]| [x * factor, y * factor])
        }

        fn validate(&self) -> Result<()> {
            for (idx, [x, y]) in self.0.iter().enumerate() {
                ensure!(
                    x.is_finite() && y.is_finite(),
                    "screen_points[{}] must be finite",
                    idx
                );
            }
            Ok(())
        }
    }

    /// An RGB triple parsed from a `RRGGBB` string.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HexColor(pub [u8; 3]);

    impl HexColor {
        pub const BLACK: Self = Self([0, 0, 0]);
        pub const WHITE: Self = Self([255, 255, 255]);

        pub fn parse(raw: &str) -> Result<Self> {
            let hex = raw.trim().trim_start_matches('#');
            ensure!(
                hex.len() == 6 && hex.is_ascii(),
                "color {:?} must have exactly six hex digits",
                raw
            );
            let mut rgb = [0u8; 3];
            for (idx, channel) in rgb.iter_mut().enumerate() {
                let pair = &hex[idx * 2..idx * 2 + 2];
                *channel = u8::from_str_radix(pair, 16)
                    .with_context(|| format!("color {:?} is not valid hex", raw))?;
            }
            Ok(Self(rgb))
        }
    }

    impl fmt::Display for HexColor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Levels {
        pub black: HexColor,
        pub white: HexColor,
    }

    impl Levels {
        pub fn is_identity(&self) -> bool {
            self.black == HexColor::BLACK && self.white == HexColor::WHITE
        }
    }

    /// How the visible screen shape is derived for a template.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum MaskSource<'a> {
        Image(&'a str),
        AspectRatio(f32),
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct MockupTemplate {
        pub name: String,
        pub slug: String,
        pub base_file: String,
        pub screen_points: ScreenPoints,
        #[serde(default)]
        pub mask_file: Option<String>,
        #[serde(default)]
        pub mask_aspect_ratio: Option<f32>,
        #[serde(default)]
        pub black_white_point: Option<[String; 2]>,
        #[serde(default)]
        pub contrast: Option<f32>,
        #[serde(default)]
        pub brightness: Option<f32>,
        #[serde(default)]
        pub category: Option<String>,
        #[serde(default)]
        pub author: Option<String>,
        #[serde(default)]
        pub backlink: Option<String>,
    }

    impl MockupTemplate {
        /// The mask file takes precedence when both are declared.
        pub fn mask_source(&self) -> Result<MaskSource<'_>> {
            if let Some(file) = self.mask_file.as_deref() {
                return Ok(MaskSource::Image(file));
            }
            match self.mask_aspect_ratio {
                Some(ratio) => Ok(MaskSource::AspectRatio(ratio)),
                None => bail!(
                    "template {:?} declares neither mask_file nor mask_aspect_ratio",
                    self.slug
                ),
            }
        }

        pub fn levels(&self) -> Result<Option<Levels>> {
            let Some([black, white]) = &self.black_white_point else {
                return Ok(None);
            };
            let black = HexColor::parse(black)
                .with_context(|| format!("template {:?} black point", self.slug))?;
            let white = HexColor::parse(white)
                .with_context(|| format!("template {:?} white point", self.slug))?;
            Ok(Some(Levels { black, white }))
        }

        pub fn category_or_default(&self) -> &str {
            match self.category.as_deref() {
                Some(category) if !category.trim().is_empty() => category,
                _ => "Uncategorized",
            }
        }

        pub fn validate(&self) -> Result<()> {
            ensure!(!self.base_file.trim().is_empty(), "base_file must not be blank");
            self.screen_points.validate()?;
            if let MaskSource::AspectRatio(ratio) = self.mask_source()? {
                ensure!(
                    ratio.is_finite() && ratio > 0.0,
                    "mask_aspect_ratio must be positive"
                );
            }
            self.levels()?;
            for (field, value) in [("contrast", self.contrast), ("brightness", self.brightness)] {
                if let Some(value) = value {
                    ensure!(
                        value.is_finite() && value >= 0.0,
                        "{} must be a non-negative number",
                        field
                    );
                }
            }
            Ok(())
        }

        pub fn matches(&self, query: &str) -> bool {
            let query = query.trim();
            self.name.eq_ignore_ascii_case(query) || self.slug.eq_ignore_ascii_case(query)
        }
    }
}

mod index {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(untagged)]
    pub enum IndexVersion {
        Text(String),
        Number(f64),
    }

    impl fmt::Display for IndexVersion {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Text(text) => f.write_str(text),
                Self::Number(number) => write!(f, "{number}"),
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct TemplateIndex {
        #[serde(default)]
        pub index_version: Option<IndexVersion>,
        pub templates: Vec<MockupTemplate>,
    }

    /// Templates sharing a category, numbered the way `--list` shows them.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TemplateGroup<'a> {
        pub category: &'a str,
        pub entries: Vec<(usize, &'a MockupTemplate)>,
    }

    impl TemplateIndex {
        pub fn version_label(&self) -> String {
            self.index_version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unspecified".to_string())
        }

        /// Resolves a 1-based position or a case-insensitive name or slug.
        pub fn select(&self, query: &str) -> Option<&MockupTemplate> {
            let query = query.trim();
            if query.is_empty() {
                return None;
            }
            if query.bytes().all(|b| b.is_ascii_digit()) {
                let position: usize = query.parse().ok()?;
                return position
                    .checked_sub(1)
                    .and_then(|idx| self.templates.get(idx));
            }
            self.templates.iter().find(|t| t.matches(query))
        }

        /// Groups templates by category in first-appearance order. Numbering
        /// follows the grouped order and is what [`Self::select_listed`] accepts.
        pub fn grouped(&self) -> Vec<TemplateGroup<'_>> {
            let mut groups: Vec<TemplateGroup<'_>> = Vec::new();
            for template in &self.templates {
                let category = template.category_or_default();
                match groups.iter_mut().find(|g| g.category == category) {
                    Some(group) => group.entries.push((0, template)),
                    None => groups.push(TemplateGroup {
                        category,
                        entries: vec![(0, template)],
                    }),
                }
            }
            let mut number = 1;
            for group in &mut groups {
                for entry in &mut group.entries {
                    entry.0 = number;
                    number += 1;
                }
            }
            groups
        }

        /// Like [`Self::select`], but numbers refer to the grouped listing.
        pub fn select_listed(&self, query: &str) -> Option<&MockupTemplate> {
            let trimmed = query.trim();
            if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                let position: usize = trimmed.parse().ok()?;
                return self
                    .grouped()
                    .into_iter()
                    .flat_map(|g| g.entries)
                    .find(|(number, _)| *number == position)
                    .map(|(_, template)| template);
            }
            self.select(trimmed)
        }
    }
}
