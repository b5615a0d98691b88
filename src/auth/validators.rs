// src/auth/validators.rs

use regex::Regex;

use super::models::{LoginRequest, RegisterRequest};
use crate::common::{ValidationResult, Validator};

pub struct CredentialsValidator {
    email_re: Regex,
}

impl CredentialsValidator {
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"),
        }
    }

    fn check_credentials(&self, email: &str, password: &str) -> ValidationResult {
        let mut result = ValidationResult::new();

        if email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if email.len() > 320 {
            result.add_error("email", "Email must be at most 320 characters");
        } else if !self.email_re.is_match(email) {
            result.add_error("email", "Email must be a valid address");
        }

        if password.chars().count() < 8 {
            result.add_error("password", "Password must be at least 8 characters");
        } else if password.chars().count() > 50 {
            // 50 characters keeps even all-multi-byte passwords under the
            // 72-byte hashing cap.
            result.add_error("password", "Password must be at most 50 characters");
        }

        result
    }
}

impl Default for CredentialsValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator<RegisterRequest> for CredentialsValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        self.check_credentials(&data.email, &data.password)
    }
}

impl Validator<LoginRequest> for CredentialsValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        self.check_credentials(&data.email, &data.password)
    }
}
