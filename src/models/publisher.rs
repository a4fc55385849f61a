//! Publisher model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    book_instance::BookInstanceDetails,
    validation::{clean, FormErrors},
};
use crate::error::FieldError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

/// Publisher page: the publisher and the copies printed under its imprint
#[derive(Debug, Serialize, ToSchema)]
pub struct PublisherDetail {
    pub publisher: Publisher,
    pub instances: Vec<BookInstanceDetails>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct PublisherForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
}

impl PublisherForm {
    pub fn clean(&mut self) -> Vec<FieldError> {
        clean(&mut self.name);
        let mut errors = FormErrors::from_rules(self);
        errors.require("name", &self.name);
        errors.into_vec()
    }
}

impl From<&Publisher> for PublisherForm {
    fn from(publisher: &Publisher) -> Self {
        Self {
            name: publisher.name.clone(),
        }
    }
}
