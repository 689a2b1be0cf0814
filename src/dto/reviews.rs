use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{opt_string_or_number, optional_text, required_text};
use crate::{
    error::{AppError, AppResult},
    models::Review,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[schema(value_type = i32, minimum = 1, maximum = 5)]
    pub rating: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub customer_name: String,
    pub rating: i32,
    pub comment: String,
}

impl CreateReviewRequest {
    pub fn validate(self) -> AppResult<NewReview> {
        let rating = required_text("rating", self.rating)?
            .parse::<i32>()
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or_else(|| AppError::BadRequest("rating must be between 1 and 5".into()))?;
        Ok(NewReview {
            customer_name: required_text("customerName", self.customer_name)?,
            rating,
            comment: optional_text(self.comment).unwrap_or_default(),
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewList {
    pub items: Vec<Review>,
    /// Average over approved reviews only.
    pub average_rating: Option<f64>,
    pub approved_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_one_to_five() {
        let ok: CreateReviewRequest = serde_json::from_value(
            serde_json::json!({ "customerName": "Meena", "rating": 5, "comment": "Fresh" }),
        )
        .unwrap();
        assert_eq!(ok.validate().unwrap().rating, 5);

        for bad in [0, 6] {
            let req: CreateReviewRequest = serde_json::from_value(
                serde_json::json!({ "customerName": "Meena", "rating": bad }),
            )
            .unwrap();
            assert!(req.validate().is_err());
        }
    }
}
