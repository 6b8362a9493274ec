// src/validation.rs
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_EMAIL_LENGTH: usize = 320;
const MAX_USERNAME_LENGTH: usize = 150;

static EMAIL_USER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^(?:[-!#$%&'*+/=?^_`{}|~0-9a-z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9a-z]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f!#-\[\]-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")$"#,
    )
    .expect("email user pattern is valid")
});

static EMAIL_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])$")
        .expect("email domain pattern is valid")
});

static EMAIL_LITERAL_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?:\d{1,3}\.){3}\d{1,3}\]$").expect("literal domain pattern is valid")
});

static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/// Lower-cased, most frequently leaked passwords, one per line.
static COMMON_PASSWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    include_str!("common-passwords.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
});

/// Email format check compatible with the common `local@domain.tld` rules.
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || email.contains('\n') {
        return false;
    }
    let Some((user, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if !EMAIL_USER.is_match(user) {
        return false;
    }
    domain.eq_ignore_ascii_case("localhost")
        || EMAIL_DOMAIN.is_match(domain)
        || EMAIL_LITERAL_DOMAIN.is_match(domain)
}

/// Letters, digits and `@.+-_`, at most 150 characters.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!("Ensure this field has no more than {MAX_USERNAME_LENGTH} characters."));
    }
    if !USERNAME.is_match(username) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }
    Ok(())
}

/// Runs the password policy in order: minimum length, common passwords,
/// all-numeric. Returns every failing message.
pub fn validate_password(password: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
    let normalized = password.trim().to_lowercase();
    if COMMON_PASSWORDS.contains(normalized.as_str()) {
        errors.push("This password is too common.".to_string());
    }
    // Vulgar fractions and CJK numerals are not digits.
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_emails() {
        assert!(validate_email("jane.doe@example.com"));
        assert!(validate_email("first+tag@sub.example.co.uk"));
        assert!(validate_email("root@localhost"));
        assert!(validate_email("ops@[127.0.0.1]"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!validate_email(""));
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("jane@"));
        assert!(!validate_email("jane@example"));
        assert!(!validate_email("jane..doe@example.com"));
        assert!(!validate_email("jane@-example.com"));
        assert!(!validate_email("jane@example.com\n"));
    }

    #[test]
    fn strong_password_passes() {
        assert!(validate_password("Gr33n-Planet-2024").is_ok());
    }

    #[test]
    fn short_common_and_numeric_passwords_collect_all_messages() {
        let errors = validate_password("123456").unwrap_err();
        assert_eq!(
            errors,
            vec![
                "This password is too short. It must contain at least 8 characters.".to_string(),
                "This password is too common.".to_string(),
                "This password is entirely numeric.".to_string(),
            ]
        );
    }

    #[test]
    fn common_check_ignores_case_and_surrounding_whitespace() {
        let errors = validate_password(" PassWord123 ").unwrap_err();
        assert_eq!(errors, vec!["This password is too common.".to_string()]);
    }

    #[test]
    fn password_close_to_the_username_is_allowed() {
        assert!(validate_password("ecowarrior1").is_ok());
    }

    #[test]
    fn well_known_passwords_are_too_common() {
        for pwd in ["mercedes", "Mercedes", "starwars", "corvette", "trustno1"] {
            assert_eq!(
                validate_password(pwd).unwrap_err(),
                vec!["This password is too common.".to_string()],
                "{pwd}"
            );
        }
    }

    #[test]
    fn only_decimal_digits_count_as_numeric() {
        assert!(validate_password("½½½½½½½½").is_ok());
        assert!(validate_password("三三三三三三三三").is_ok());
        assert_eq!(
            validate_password("90817263").unwrap_err(),
            vec!["This password is entirely numeric.".to_string()]
        );
    }

    #[test]
    fn usernames_follow_the_allowed_alphabet() {
        assert!(validate_username("eco.user+1@x_y-z").is_ok());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }
}
