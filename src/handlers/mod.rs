pub mod ai_models;
pub mod spa;
pub mod user;
