use super::*;

#[test]
fn verify_accepts_the_password_that_produced_the_hash() {
    let hash = derive_password_hash("theeaglefliesatmidnight").unwrap();
    assert!(verify_password_hash(&hash, "theeaglefliesatmidnight").unwrap());
}

#[test]
fn verify_rejects_a_wrong_candidate() {
    let hash = derive_password_hash("theeaglefliesatmidnight").unwrap();
    assert!(!verify_password_hash(&hash, "thesearentthedroidsyourelookingfor").unwrap());
}

#[test]
fn two_derivations_of_the_same_password_differ() {
    let a = derive_password_hash("lightning").unwrap();
    let b = derive_password_hash("lightning").unwrap();
    assert_ne!(a, b);
    assert!(verify_password_hash(&a, "lightning").unwrap());
    assert!(verify_password_hash(&b, "lightning").unwrap());
}

#[test]
fn verify_against_empty_candidate_is_false_not_an_error() {
    let hash = derive_password_hash("opensaysme").unwrap();
    assert!(!verify_password_hash(&hash, "").unwrap());
}

#[test]
fn encoded_form_is_self_describing() {
    let hash = derive_password_hash("correct horse battery staple").unwrap();
    assert!(hash.starts_with("$argon2id$v=19$t=1,m=65536,p=1$"));
    assert_eq!(hash.split('$').count(), 6);
}

#[test]
fn malformed_strings_fail_to_decode() {
    for bad in [
        "",
        "not-a-hash-at-all",
        "$argon2id$v=19$t=1,m=65536,p=1$onlyonefield",
        "$argon2id$v=nineteen$t=1,m=65536,p=1$c2FsdA$aGFzaA",
        "$argon2id$v=19$t=1,m=65536$c2FsdA$aGFzaA",
    ] {
        assert!(verify_password_hash(bad, "anything").is_err(), "expected error for {bad:?}");
    }
}

#[test]
fn unsupported_algorithm_is_rejected() {
    let hash = derive_password_hash("whatever").unwrap();
    let swapped = hash.replacen("argon2id", "bcrypt", 1);
    let err = verify_password_hash(&swapped, "whatever").unwrap_err();
    assert!(matches!(err, KeyDerivationError::UnsupportedAlgorithm(_)));
}
