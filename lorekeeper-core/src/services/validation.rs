use crate::errors::{CoreError, CoreResult};

const MAX_NAME_LEN: usize = 100;
const MAX_RATING: i32 = 5;

/// Field checks shared by every create call
pub struct ValidationService;

impl ValidationService {
    /// Trim and validate a display name
    pub fn validate_name(entity: &str, name: &str) -> CoreResult<String> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(CoreError::validation(format!(
                "{} name cannot be empty",
                entity
            )));
        }

        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(CoreError::validation(format!(
                "{} name is too long (max {} characters)",
                entity, MAX_NAME_LEN
            )));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_rating(rating: i32) -> CoreResult<i32> {
        if !(0..=MAX_RATING).contains(&rating) {
            return Err(CoreError::validation(format!(
                "Rating must be between 0 and {}, got {}",
                MAX_RATING, rating
            )));
        }
        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(
            ValidationService::validate_name("Tag", "  elf ").unwrap(),
            "elf"
        );
    }

    #[test]
    fn empty_and_long_names_are_rejected() {
        assert!(ValidationService::validate_name("Tag", "   ").is_err());
        let long = "x".repeat(101);
        assert!(ValidationService::validate_name("Tag", &long).is_err());
    }

    #[test]
    fn rating_bounds() {
        assert!(ValidationService::validate_rating(0).is_ok());
        assert!(ValidationService::validate_rating(5).is_ok());
        assert!(ValidationService::validate_rating(6).is_err());
        assert!(ValidationService::validate_rating(-1).is_err());
    }

}
