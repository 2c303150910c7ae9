pub mod password;

pub use password::{generate, GeneratorError, PasswordGenerator};
