//! Self-describing, memory-hard password hashing.
//!
//! Produces a verifier string from a user-supplied password and later confirms
//! whether a candidate password reproduces it, without ever storing the
//! password itself. The encoded form carries its own algorithm, version and
//! parameters so verification never needs out-of-band context:
//!
//! ```text
//! $argon2id$v=19$t=1,m=65536,p=1$<base64-salt>$<base64-hash>
//! ```

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

const ALGORITHM_TAG: &str = "argon2id";
const HASH_VERSION: u32 = 0x13;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const TIME_COST: u32 = 1;
const MEMORY_COST_KIB: u32 = 64 * 1024;
const PARALLELISM: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum KeyDerivationError {
    #[error("malformed derived-key string")]
    Malformed,

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("argon2 computation failed: {0}")]
    Computation(String),
}

struct DecodedHash {
    algorithm: String,
    version: u32,
    time_cost: u32,
    memory_cost: u32,
    parallelism: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

/// Derive a self-describing password hash. The caller must not invoke this
/// with an empty password; the Secret Context stores an empty `password_hash`
/// field instead of calling through to here.
pub fn derive_password_hash(password: &str) -> Result<String, KeyDerivationError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let hash = compute_hash(password.as_bytes(), &salt, TIME_COST, MEMORY_COST_KIB, PARALLELISM)?;

    Ok(encode(
        ALGORITHM_TAG,
        HASH_VERSION,
        TIME_COST,
        MEMORY_COST_KIB,
        PARALLELISM,
        &salt,
        &hash,
    ))
}

/// Verify a candidate password against a previously derived encoded hash.
///
/// An empty candidate against a present hash is *not* an error at this layer;
/// it verifies false. The Secret Context is responsible for translating that
/// into `NotAuthorized`.
pub fn verify_password_hash(
    encoded: &str,
    candidate: &str,
) -> Result<bool, KeyDerivationError> {
    if candidate.is_empty() {
        return Ok(false);
    }

    let decoded = decode(encoded)?;
    if decoded.algorithm != ALGORITHM_TAG {
        return Err(KeyDerivationError::UnsupportedAlgorithm(decoded.algorithm));
    }

    let candidate_hash = compute_hash(
        candidate.as_bytes(),
        &decoded.salt,
        decoded.time_cost,
        decoded.memory_cost,
        decoded.parallelism,
    )?;

    Ok(bool::from(candidate_hash.ct_eq(&decoded.hash)))
}

fn compute_hash(
    password: &[u8],
    salt: &[u8],
    time_cost: u32,
    memory_cost: u32,
    parallelism: u32,
) -> Result<Zeroizing<Vec<u8>>, KeyDerivationError> {
    let params = Params::new(memory_cost, time_cost, parallelism, Some(HASH_LEN))
        .map_err(|e| KeyDerivationError::Computation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    // The raw hash output is intermediate key material: wiped on drop rather
    // than left to linger in memory once it has been base64-encoded (derive)
    // or compared (verify).
    let mut output = Zeroizing::new(vec![0u8; HASH_LEN]);
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| KeyDerivationError::Computation(e.to_string()))?;
    Ok(output)
}

fn encode(
    algorithm: &str,
    version: u32,
    time_cost: u32,
    memory_cost: u32,
    parallelism: u32,
    salt: &[u8],
    hash: &[u8],
) -> String {
    format!(
        "${}$v={}$t={},m={},p={}${}${}",
        algorithm,
        version,
        time_cost,
        memory_cost,
        parallelism,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(hash),
    )
}

fn decode(encoded: &str) -> Result<DecodedHash, KeyDerivationError> {
    let mut parts = encoded.split('$');

    // A leading '$' means the first split segment is empty.
    if parts.next() != Some("") {
        return Err(KeyDerivationError::Malformed);
    }

    let algorithm = parts.next().ok_or(KeyDerivationError::Malformed)?.to_string();

    let version_segment = parts.next().ok_or(KeyDerivationError::Malformed)?;
    let version = version_segment
        .strip_prefix("v=")
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or(KeyDerivationError::Malformed)?;

    let params_segment = parts.next().ok_or(KeyDerivationError::Malformed)?;
    let (time_cost, memory_cost, parallelism) = parse_params(params_segment)?;

    let salt_segment = parts.next().ok_or(KeyDerivationError::Malformed)?;
    let salt = URL_SAFE_NO_PAD
        .decode(salt_segment)
        .map_err(|_| KeyDerivationError::Malformed)?;

    let hash_segment = parts.next().ok_or(KeyDerivationError::Malformed)?;
    let hash = URL_SAFE_NO_PAD
        .decode(hash_segment)
        .map_err(|_| KeyDerivationError::Malformed)?;

    if parts.next().is_some() {
        return Err(KeyDerivationError::Malformed);
    }

    Ok(DecodedHash {
        algorithm,
        version,
        time_cost,
        memory_cost,
        parallelism,
        salt,
        hash,
    })
}

fn parse_params(segment: &str) -> Result<(u32, u32, u32), KeyDerivationError> {
    let mut time_cost = None;
    let mut memory_cost = None;
    let mut parallelism = None;

    for field in segment.split(',') {
        let (key, value) = field.split_once('=').ok_or(KeyDerivationError::Malformed)?;
        let value: u32 = value.parse().map_err(|_| KeyDerivationError::Malformed)?;
        match key {
            "t" => time_cost = Some(value),
            "m" => memory_cost = Some(value),
            "p" => parallelism = Some(value),
            _ => return Err(KeyDerivationError::Malformed),
        }
    }

    match (time_cost, memory_cost, parallelism) {
        (Some(t), Some(m), Some(p)) => Ok((t, m, p)),
        _ => Err(KeyDerivationError::Malformed),
    }
}

#[cfg(test)]
#[path = "key_derivation_tests.rs"]
mod tests;
