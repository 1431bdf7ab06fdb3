use rand::{seq::SliceRandom, Rng};

pub const PASSWORD_LENGTH: usize = 16;

/// Mixed-case letters, digits and symbols, without the look-alikes `0 O o 1 l I`.
pub const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789!@#$%^&*-_=+?";

const MAX_USERNAME_STEM: usize = 20;

/// Builds a panel username from the local part of an email address and a random four-digit suffix.
///
/// Only lowercase letters, digits, `.`, `_` and `-` survive, and the stem never starts with punctuation.
pub fn generate_username(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let stem = local
        .chars()
        .filter_map(|c| {
            let c = c.to_ascii_lowercase();
            (c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')).then_some(c)
        })
        .skip_while(|c| matches!(c, '.' | '-'))
        .take(MAX_USERNAME_STEM)
        .collect::<String>();
    let stem = if stem.is_empty() { "user".to_string() } else { stem };
    let suffix = rand::thread_rng().gen_range(1000..10000);
    format!("{stem}{suffix}")
}

/// A random password of [`PASSWORD_LENGTH`] characters from [`PASSWORD_ALPHABET`], containing at least one
/// uppercase letter, one lowercase letter, one digit and one symbol.
pub fn generate_password() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let password = (0..PASSWORD_LENGTH)
            .filter_map(|_| PASSWORD_ALPHABET.choose(&mut rng).map(|b| char::from(*b)))
            .collect::<String>();
        let upper = password.chars().any(|c| c.is_ascii_uppercase());
        let lower = password.chars().any(|c| c.is_ascii_lowercase());
        let digit = password.chars().any(|c| c.is_ascii_digit());
        let symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
        if upper && lower && digit && symbol {
            return password;
        }
    }
}
