//! Form checks run before the backend is contacted.

use lazy_static::lazy_static;
use regex::Regex;

use crate::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn validate_email(email: &str) -> Result<(), Error> {
    if !EMAIL.is_match(email) {
        return Err(Error::invalid("Invalid email format"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::invalid(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), Error> {
    validate_email(email)?;
    validate_password(password)
}

/// Registration checks, first failure wins: email shape, password length, retype match.
pub fn validate_registration(email: &str, password: &str, retyped: &str) -> Result<(), Error> {
    validate_login(email, password)?;
    if password != retyped {
        return Err(Error::invalid("Passwords do not match"));
    }
    Ok(())
}

/// Lower-cases the name, upper-cases the first character of every word and trims the ends.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_word = false;
    for ch in name.trim().chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && !in_word {
            normalized.extend(ch.to_uppercase());
        } else {
            normalized.extend(ch.to_lowercase());
        }
        in_word = is_word;
    }
    normalized
}
