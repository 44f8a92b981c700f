use shared::domain::{Product, ProductKey};

pub const MAX_LABELS: usize = 5;

/// Nutrient key, display label and unit, per 100g.
const NUTRIENT_SUMMARY: [(&str, &str, &str); 4] = [
    ("energy_100g", "Energy", "kJ"),
    ("fat_100g", "Fat", "g"),
    ("carbohydrates_100g", "Carbs", "g"),
    ("proteins_100g", "Protein", "g"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Lime,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl BadgeColor {
    pub fn for_grade(grade: &str) -> Self {
        match grade.trim().to_ascii_lowercase().as_str() {
            "a" => Self::Green,
            "b" => Self::Lime,
            "c" => Self::Yellow,
            "d" => Self::Orange,
            "e" => Self::Red,
            _ => Self::Gray,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Lime => "lime",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Gray => "gray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeBadge {
    pub label: String,
    pub color: BadgeColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductImage {
    Url(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutrientFact {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

/// Display projection of one product. Holds no state of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub key: ProductKey,
    pub name: String,
    pub image: ProductImage,
    pub grade_badge: Option<GradeBadge>,
    pub brand: Option<String>,
    pub categories: Option<String>,
    pub ingredients: Option<String>,
    pub nutrients: Vec<NutrientFact>,
    pub labels: Vec<String>,
}

impl ProductDetail {
    pub fn project(product: &Product) -> Self {
        Self {
            key: product.key.clone(),
            name: product.name.clone(),
            image: product
                .image_url
                .clone()
                .map_or(ProductImage::Placeholder, ProductImage::Url),
            grade_badge: product.nutrition_grade.as_deref().map(|grade| GradeBadge {
                label: grade.to_uppercase(),
                color: BadgeColor::for_grade(grade),
            }),
            brand: product.brand.clone(),
            categories: product.categories.clone(),
            ingredients: product.ingredients_text.clone(),
            nutrients: NUTRIENT_SUMMARY
                .iter()
                .filter_map(|&(key, label, unit)| {
                    product.nutrient(key).map(|value| NutrientFact {
                        label,
                        value,
                        unit,
                    })
                })
                .collect(),
            labels: product
                .labels
                .as_deref()
                .map(leading_labels)
                .unwrap_or_default(),
        }
    }
}

fn leading_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .take(MAX_LABELS)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn bare(name: &str) -> Product {
        Product {
            key: ProductKey::Code("737628064502".into()),
            name: name.to_string(),
            brand: None,
            categories: None,
            nutrition_grade: None,
            image_url: None,
            ingredients_text: None,
            labels: None,
            nutrients: BTreeMap::new(),
        }
    }

    #[test]
    fn grade_colors_follow_letter() {
        assert_eq!(BadgeColor::for_grade("a"), BadgeColor::Green);
        assert_eq!(BadgeColor::for_grade("B"), BadgeColor::Lime);
        assert_eq!(BadgeColor::for_grade("c"), BadgeColor::Yellow);
        assert_eq!(BadgeColor::for_grade("d"), BadgeColor::Orange);
        assert_eq!(BadgeColor::for_grade("e"), BadgeColor::Red);
        assert_eq!(BadgeColor::for_grade("unknown"), BadgeColor::Gray);
    }

    #[test]
    fn bare_product_projects_to_placeholder_without_badge() {
        let detail = ProductDetail::project(&bare("Rice noodles"));
        assert_eq!(detail.name, "Rice noodles");
        assert_eq!(detail.image, ProductImage::Placeholder);
        assert!(detail.grade_badge.is_none());
        assert!(detail.nutrients.is_empty());
        assert!(detail.labels.is_empty());
    }

    #[test]
    fn nutrients_are_independently_optional_in_fixed_order() {
        let mut product = bare("Granola");
        product.nutrients = BTreeMap::from([
            ("proteins_100g".to_string(), 9.5),
            ("energy_100g".to_string(), 1850.0),
            ("fat_100g".to_string(), 0.0),
            ("sugars_100g".to_string(), 21.0),
        ]);

        let detail = ProductDetail::project(&product);
        let labels: Vec<_> = detail.nutrients.iter().map(|fact| fact.label).collect();
        assert_eq!(labels, vec!["Energy", "Fat", "Protein"]);
        assert_eq!(detail.nutrients[0].unit, "kJ");
        assert_eq!(detail.nutrients[1].value, 0.0);
    }

    #[test]
    fn labels_keep_first_five_trimmed() {
        let mut product = bare("Chocolate");
        product.labels =
            Some("Organic, Fair trade ,Vegan, Gluten-free, No palm oil, Kosher, Halal".into());

        let detail = ProductDetail::project(&product);
        assert_eq!(
            detail.labels,
            vec!["Organic", "Fair trade", "Vegan", "Gluten-free", "No palm oil"]
        );
    }

    #[test]
    fn badge_and_image_come_from_product() {
        let mut product = bare("Crisps");
        product.nutrition_grade = Some("d".into());
        product.image_url = Some("https://images.example/crisps.jpg".into());

        let detail = ProductDetail::project(&product);
        assert_eq!(
            detail.grade_badge,
            Some(GradeBadge {
                label: "D".into(),
                color: BadgeColor::Orange,
            })
        );
        assert_eq!(
            detail.image,
            ProductImage::Url("https://images.example/crisps.jpg".into())
        );
    }
}
