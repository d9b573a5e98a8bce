use indexmap::IndexMap;

use crate::messages::Locale;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedName {
    pub vi: &'static str,
    pub en: &'static str,
    pub zh: &'static str,
}

impl LocalizedName {
    pub fn get(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Vi => self.vi,
            Locale::En => self.en,
            Locale::Zh => self.zh,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub id: &'static str,
    /// Only quick presets carry a display name; category items show their prompt.
    pub name: Option<LocalizedName>,
    pub prompt: &'static str,
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetCategory {
    pub id: &'static str,
    pub icon: &'static str,
    pub name: LocalizedName,
    pub items: Vec<Preset>,
}

/// Ordered catalog of prompt presets, keyed by category id.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    categories: IndexMap<&'static str, PresetCategory>,
    quick: Vec<Preset>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    pub fn builtin() -> Self {
        let mut categories = IndexMap::new();
        for category in builtin_categories() {
            categories.insert(category.id, category);
        }
        Self {
            categories,
            quick: builtin_quick_presets(),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &PresetCategory> {
        self.categories.values()
    }

    pub fn category(&self, id: &str) -> Option<&PresetCategory> {
        self.categories.get(id)
    }

    pub fn quick_presets(&self) -> &[Preset] {
        &self.quick
    }

    /// Finds a preset by id across categories and quick presets.
    pub fn find(&self, id: &str) -> Option<&Preset> {
        self.categories
            .values()
            .flat_map(|category| category.items.iter())
            .chain(self.quick.iter())
            .find(|preset| preset.id == id)
    }
}

fn item(id: &'static str, prompt: &'static str, count: u8) -> Preset {
    Preset {
        id,
        name: None,
        prompt,
        count,
    }
}

fn name(vi: &'static str, en: &'static str, zh: &'static str) -> LocalizedName {
    LocalizedName { vi, en, zh }
}

fn builtin_categories() -> Vec<PresetCategory> {
    vec![
        PresetCategory {
            id: "portrait",
            icon: "🧑",
            name: name("Chân dung", "Portrait", "人像"),
            items: vec![
                item(
                    "portrait-natural",
                    "Ultra-realistic portrait, soft natural light, 85mm lens, shallow depth of field",
                    2,
                ),
                item(
                    "portrait-studio",
                    "Studio portrait with dramatic lighting, high contrast, Rembrandt lighting",
                    1,
                ),
            ],
        },
        PresetCategory {
            id: "landscape",
            icon: "🏞️",
            name: name("Phong cảnh", "Landscape", "风景"),
            items: vec![
                item(
                    "landscape-golden",
                    "Golden hour landscape, wide angle, vivid colors, atmospheric perspective",
                    2,
                ),
                item(
                    "landscape-night",
                    "Night sky over mountains, long exposure, Milky Way, crisp stars",
                    1,
                ),
            ],
        },
        PresetCategory {
            id: "product",
            icon: "📦",
            name: name("Sản phẩm", "Product", "产品"),
            items: vec![
                item(
                    "product-hero",
                    "Product hero shot on reflective surface, cinematic lighting, high contrast",
                    4,
                ),
                item(
                    "product-minimal",
                    "Minimal product photo, soft diffused light, monochrome background",
                    2,
                ),
            ],
        },
        PresetCategory {
            id: "art",
            icon: "🎨",
            name: name("Nghệ thuật", "Art", "艺术"),
            items: vec![
                item(
                    "art-watercolor",
                    "Watercolor painting style, loose brush strokes, pastel palette",
                    3,
                ),
                item(
                    "art-neon",
                    "Cyberpunk neon illustration, high contrast, dynamic lighting",
                    2,
                ),
            ],
        },
        PresetCategory {
            id: "architecture",
            icon: "🏙️",
            name: name("Kiến trúc", "Architecture", "建筑"),
            items: vec![
                item(
                    "architecture-modern",
                    "Modern architecture exterior, wide shot, clean lines, evening light",
                    2,
                ),
                item(
                    "architecture-interior",
                    "Interior architecture, natural light, warm tones, wide dynamic range",
                    1,
                ),
            ],
        },
    ]
}

fn builtin_quick_presets() -> Vec<Preset> {
    vec![
        Preset {
            id: "portrait-beauty",
            name: Some(name("Chân dung beauty", "Beauty portrait", "美妆人像")),
            prompt: "Beauty portrait close-up, clean retouch, glossy skin, beauty dish lighting",
            count: 2,
        },
        Preset {
            id: "landscape-sunset",
            name: Some(name("Hoàng hôn", "Sunset vista", "日落景观")),
            prompt: "Panoramic sunset landscape, rich gradient sky, foreground silhouettes",
            count: 1,
        },
        Preset {
            id: "product-soft",
            name: Some(name("Sản phẩm nhẹ", "Soft light product", "柔光产品")),
            prompt: "Product shot with soft gradient background, volumetric lighting, 3d render",
            count: 3,
        },
        Preset {
            id: "art-impression",
            name: Some(name("Tranh ấn tượng", "Impressionist painting", "印象派")),
            prompt: "Impressionist oil painting, thick brush strokes, vibrant colors",
            count: 2,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::PresetCatalog;
    use crate::messages::Locale;

    #[test]
    fn categories_keep_declaration_order() {
        let catalog = PresetCatalog::builtin();
        let ids: Vec<&str> = catalog.categories().map(|category| category.id).collect();
        assert_eq!(
            ids,
            vec!["portrait", "landscape", "product", "art", "architecture"]
        );
        assert_eq!(
            catalog.category("art").map(|c| c.name.get(Locale::Zh)),
            Some("艺术")
        );
    }

    #[test]
    fn find_searches_categories_then_quick_presets() {
        let catalog = PresetCatalog::builtin();
        assert_eq!(catalog.find("product-hero").map(|p| p.count), Some(4));
        let quick = catalog.find("landscape-sunset");
        assert_eq!(
            quick.and_then(|p| p.name.as_ref()).map(|n| n.get(Locale::En)),
            Some("Sunset vista")
        );
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn preset_counts_stay_in_generation_range() {
        let catalog = PresetCatalog::builtin();
        let all = catalog
            .categories()
            .flat_map(|category| category.items.iter())
            .chain(catalog.quick_presets().iter());
        for preset in all {
            assert!((1..=4).contains(&preset.count), "{}", preset.id);
        }
    }
}
