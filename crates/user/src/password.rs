use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password using Argon2id with OWASP-recommended parameters
/// - Memory: 65536 KB (64 MB)
/// - Iterations: 3
/// - Parallelism: 4
pub fn hash_password(password: &str) -> cookbook_shared::Result<String> {
    let params = Params::new(65536, 3, 4, None).map_err(argon2::password_hash::Error::from)?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a PHC-formatted Argon2 hash.
///
/// A hash that cannot be parsed is reported as an error, a wrong password as
/// `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> cookbook_shared::Result<bool> {
    let parsed_hash = PasswordHash::new(hash)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
