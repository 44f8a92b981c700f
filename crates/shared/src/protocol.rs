use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Category, CategoryId, Product, ProductKey};

/// Product record as served by the directory. Every field is optional and
/// loosely typed upstream: text fields accept any JSON scalar and a
/// `nutriments` value that is not an object is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub code: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "lenient_text")]
    pub internal_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub brands: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub categories: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub nutrition_grades: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ingredients_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub labels: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutriments: Option<Value>,
}

/// `GET /api/v0/product/{barcode}.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductLookupResponse {
    #[serde(default, deserialize_with = "lenient_record")]
    pub product: Option<RawProduct>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub status_verbose: Option<String>,
}

/// `GET /cgi/search.pl?json=true`. Entries that fail to decode are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_records")]
    pub products: Vec<RawProduct>,
}

/// `GET /categories.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryListResponse {
    #[serde(default, deserialize_with = "lenient_records")]
    pub tags: Vec<CategoryTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTag {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Value>,
}

impl RawProduct {
    /// First usable identifier, in `id`, `code`, `_id` order.
    pub fn stable_key(&self) -> Option<String> {
        [&self.id, &self.code, &self.internal_id]
            .into_iter()
            .find_map(|candidate| non_blank(candidate.as_deref()))
    }

    /// Drops records without a usable name.
    pub fn into_product(self) -> Option<Product> {
        let name = non_blank(self.product_name.as_deref())?;
        let key = match self.stable_key() {
            Some(code) => ProductKey::Code(code),
            None => ProductKey::local(),
        };

        Some(Product {
            key,
            name,
            brand: non_blank(self.brands.as_deref()),
            categories: non_blank(self.categories.as_deref()),
            nutrition_grade: non_blank(self.nutrition_grades.as_deref())
                .map(|grade| grade.to_ascii_lowercase()),
            image_url: non_blank(self.image_url.as_deref()),
            ingredients_text: non_blank(self.ingredients_text.as_deref()),
            labels: non_blank(self.labels.as_deref()),
            nutrients: match self.nutriments {
                Some(Value::Object(raw)) => numeric_nutrients(raw),
                _ => BTreeMap::new(),
            },
        })
    }
}

impl ProductLookupResponse {
    /// A response without a `product` is an empty result, not a failure.
    pub fn into_products(self) -> Vec<Product> {
        normalize_products(self.product)
    }
}

impl SearchResponse {
    pub fn into_products(self) -> Vec<Product> {
        normalize_products(self.products)
    }
}

impl CategoryListResponse {
    pub fn into_categories(self, limit: usize) -> Vec<Category> {
        self.tags
            .into_iter()
            .take(limit)
            .map(|tag| Category {
                id: CategoryId(tag.id),
                name: tag.name.unwrap_or_default(),
            })
            .collect()
    }
}

pub fn normalize_products(raw: impl IntoIterator<Item = RawProduct>) -> Vec<Product> {
    raw.into_iter().filter_map(RawProduct::into_product).collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn numeric_nutrients(raw: Map<String, Value>) -> BTreeMap<String, f64> {
    raw.into_iter()
        .filter_map(|(name, value)| {
            let number = match &value {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            number.is_finite().then_some((name, number))
        })
        .collect()
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

fn lenient_record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
