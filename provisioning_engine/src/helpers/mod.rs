mod credentials;
mod pricing;

pub use credentials::{generate_password, generate_username, PASSWORD_ALPHABET, PASSWORD_LENGTH};
pub use pricing::charge_for;
