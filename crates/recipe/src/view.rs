use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub(crate) const BLANK: &str = "This field may not be blank.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaxonomyView {
    pub id: i64,
    pub name: String,
}

pub type TagView = TaxonomyView;
pub type IngredientView = TaxonomyView;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaxonomyInput {
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: String,
}

/// Shallow recipe representation, relations as id lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub tags: Vec<i64>,
    pub time_minutes: i64,
    pub ingredients: Vec<i64>,
    pub price: Decimal,
    pub link: String,
}

/// Single-item representation with relations expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub tags: Vec<TagView>,
    pub time_minutes: i64,
    pub ingredients: Vec<IngredientView>,
    pub price: Decimal,
    pub link: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RecipeInput {
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub title: String,
    #[validate(required(message = "This field is required."))]
    pub time_minutes: Option<i64>,
    #[validate(required(message = "This field is required."))]
    pub price: Option<Decimal>,
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub link: Option<String>,
    #[serde(default, alias = "tag")]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub ingredients: Vec<i64>,
}

/// Partial update. A `None` field keeps the stored value; relation lists
/// replace the current set when present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RecipePatch {
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Decimal>,
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub link: Option<String>,
    #[serde(default, alias = "tag")]
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

impl From<RecipeInput> for RecipePatch {
    fn from(input: RecipeInput) -> Self {
        Self {
            title: Some(input.title),
            time_minutes: input.time_minutes,
            price: input.price,
            link: Some(input.link.unwrap_or_default()),
            tags: Some(input.tags),
            ingredients: Some(input.ingredients),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

pub(crate) fn collect_errors(result: Result<(), ValidationErrors>) -> ValidationErrors {
    result.err().unwrap_or_default()
}

pub(crate) fn add_error(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) {
    errors.add(field, ValidationError::new(code).with_message(message.into()));
}

/// Up to 5 digits in total with at most 2 after the decimal point.
pub(crate) fn check_price(price: &Decimal, errors: &mut ValidationErrors) {
    let price = price.normalize();

    if price.scale() > 2 {
        add_error(
            errors,
            "price",
            "max_decimal_places",
            "Ensure that there are no more than 2 decimal places.",
        );
    } else if price.abs() >= Decimal::ONE_THOUSAND {
        add_error(
            errors,
            "price",
            "max_whole_digits",
            "Ensure that there are no more than 3 digits before the decimal point.",
        );
    }
}

/// Stored form of a price, always two decimal places.
pub(crate) fn price_text(price: &Decimal) -> String {
    let mut price = price.normalize();
    price.rescale(2);
    price.to_string()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn price_errors(value: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_price(&Decimal::from_str(value).unwrap(), &mut errors);
        errors
    }

    #[test]
    fn price_precision() {
        assert!(price_errors("5").is_empty());
        assert!(price_errors("999.99").is_empty());
        assert!(price_errors("5.500").is_empty());
        assert!(!price_errors("5.555").is_empty());
        assert!(!price_errors("1000").is_empty());
        assert!(!price_errors("-1000.5").is_empty());
    }

    #[test]
    fn price_is_stored_with_two_places() {
        assert_eq!(price_text(&Decimal::from_str("5").unwrap()), "5.00");
        assert_eq!(price_text(&Decimal::from_str("0.4").unwrap()), "0.40");
        assert_eq!(price_text(&Decimal::from_str("12.340").unwrap()), "12.34");
    }

    #[test]
    fn input_accepts_legacy_tag_field() {
        let input: RecipeInput = serde_json::from_str(
            r#"{"title":"Soup","time_minutes":5,"price":"5.00","tag":[1,2]}"#,
        )
        .unwrap();
        assert_eq!(input.tags, vec![1, 2]);
        assert!(input.ingredients.is_empty());
        assert_eq!(input.link, None);

        let input: RecipeInput =
            serde_json::from_str(r#"{"title":"Soup","tags":[3],"price":5.5}"#).unwrap();
        assert_eq!(input.tags, vec![3]);
        assert_eq!(input.price, Some(Decimal::from_str("5.5").unwrap()));
    }

    #[test]
    fn summary_serializes_price_as_string() {
        let summary = RecipeSummary {
            id: 1,
            title: "Soup".to_owned(),
            tags: vec![2],
            time_minutes: 10,
            ingredients: vec![],
            price: Decimal::from_str("5.00").unwrap(),
            link: String::new(),
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["price"], "5.00");
        assert_eq!(value["tags"], serde_json::json!([2]));
    }
}
