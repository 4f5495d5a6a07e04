//! Parameter DTOs - Data Transfer Objects per parametri

use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per creare un nuovo parametro (senza id e timestamp)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct CreateParameterDTO {
    #[validate(length(min = 1, message = "Key must not be empty"))]
    pub key: String,
    pub value: String,
    #[validate(length(min = 1, message = "Environment must not be empty"))]
    pub environment: String,
}

/// DTO per aggiornare il valore di un parametro
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpdateParameterDTO {
    pub value: String,
}
