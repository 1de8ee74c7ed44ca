/// Controls how schema documents are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// When true, object schemas that leave `additionalProperties` unset reject
    /// unknown fields.
    pub strict_mode: bool,
    /// When true, `format` keywords (built-in and injected) are enforced.
    pub validate_formats: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            validate_formats: true,
        }
    }
}
