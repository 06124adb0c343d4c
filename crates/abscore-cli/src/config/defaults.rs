use crate::cli::InputFormat;

pub struct DefaultsConfig {
    pub format: InputFormat,
    pub challenge: String,
    pub ranked: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: InputFormat::Wide,
            challenge: "challenge1".to_string(),
            ranked: false,
        }
    }
}
