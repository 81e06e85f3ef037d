//! Fontconfig-style font queries
//!
//! `families[:property]*`, for example `sans:weight=bold`,
//! `DejaVu Serif,serif:italic` or `mono:weight=300:slant=oblique`.
//! Weights use the CSS scale (400 regular, 700 bold).

use std::str::FromStr;

use inkrun_core::error::FontLoadError;

/// Families every system is expected to alias to something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    SansSerif,
    Serif,
    Monospace,
    Cursive,
    Fantasy,
}

impl GenericFamily {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sans" | "sans-serif" | "sansserif" => Some(Self::SansSerif),
            "serif" => Some(Self::Serif),
            "mono" | "monospace" => Some(Self::Monospace),
            "cursive" => Some(Self::Cursive),
            "fantasy" => Some(Self::Fantasy),
            _ => None,
        }
    }

    /// Installed families tried, in order, when the generic name is asked for
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::SansSerif => &[
                "DejaVu Sans",
                "Liberation Sans",
                "Noto Sans",
                "Cantarell",
                "Arial",
                "Helvetica",
                "Segoe UI",
            ],
            Self::Serif => &[
                "DejaVu Serif",
                "Liberation Serif",
                "Noto Serif",
                "Times New Roman",
                "Times",
            ],
            Self::Monospace => &[
                "DejaVu Sans Mono",
                "Liberation Mono",
                "Noto Sans Mono",
                "Courier New",
                "Menlo",
                "Consolas",
            ],
            Self::Cursive => &["Comic Neue", "Comic Sans MS", "Apple Chancery"],
            Self::Fantasy => &["Impact", "Papyrus"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FamilySpec {
    Generic(GenericFamily),
    Named(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Slant {
    #[default]
    Roman,
    Italic,
    Oblique,
}

/// A parsed query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontQuery {
    pub families: Vec<FamilySpec>,
    pub weight: u16,
    pub slant: Slant,
}

impl Default for FontQuery {
    fn default() -> Self {
        Self {
            families: vec![FamilySpec::Generic(GenericFamily::SansSerif)],
            weight: 400,
            slant: Slant::Roman,
        }
    }
}

fn weight_from_name(name: &str) -> Option<u16> {
    let weight = match name.to_ascii_lowercase().replace(['-', ' '], "").as_str() {
        "thin" | "hairline" => 100,
        "extralight" | "ultralight" => 200,
        "light" => 300,
        "regular" | "normal" | "book" => 400,
        "medium" => 500,
        "semibold" | "demibold" => 600,
        "bold" => 700,
        "extrabold" | "ultrabold" => 800,
        "black" | "heavy" => 900,
        _ => return None,
    };
    Some(weight)
}

fn slant_from_name(name: &str) -> Option<Slant> {
    match name.to_ascii_lowercase().as_str() {
        "roman" | "upright" => Some(Slant::Roman),
        "italic" => Some(Slant::Italic),
        "oblique" => Some(Slant::Oblique),
        _ => None,
    }
}

impl FromStr for FontQuery {
    type Err = FontLoadError;

    fn from_str(query: &str) -> Result<Self, Self::Err> {
        let not_found = || FontLoadError::NotFound {
            query: query.to_string(),
        };

        let mut parts = query.split(':');
        let mut parsed = FontQuery::default();

        let families: Vec<FamilySpec> = parts
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| match GenericFamily::from_name(name) {
                Some(generic) => FamilySpec::Generic(generic),
                None => FamilySpec::Named(name.to_string()),
            })
            .collect();
        if !families.is_empty() {
            parsed.families = families;
        }

        for property in parts.map(str::trim).filter(|p| !p.is_empty()) {
            match property.split_once('=') {
                Some((key, value)) => {
                    let value = value.trim();
                    match key.trim().to_ascii_lowercase().as_str() {
                        "weight" => {
                            parsed.weight = match value.parse::<u16>() {
                                Ok(n) if (1..=1000).contains(&n) => n,
                                Ok(_) => return Err(not_found()),
                                Err(_) => weight_from_name(value).ok_or_else(not_found)?,
                            };
                        },
                        "slant" | "style" => {
                            parsed.slant = slant_from_name(value).ok_or_else(not_found)?;
                        },
                        _ => return Err(not_found()),
                    }
                },
                None => {
                    if let Some(weight) = weight_from_name(property) {
                        parsed.weight = weight;
                    } else if let Some(slant) = slant_from_name(property) {
                        parsed.slant = slant;
                    } else {
                        return Err(not_found());
                    }
                },
            }
        }

        Ok(parsed)
    }
}
