pub mod profile;
pub mod score;
