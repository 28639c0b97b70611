use bcrypt::{DEFAULT_COST, hash, verify};

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hashed)
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash_password("Sup3rSecret").unwrap();
        assert_ne!(hashed, "Sup3rSecret");
        assert!(verify_password("Sup3rSecret", &hashed).unwrap());
        assert!(!verify_password("sup3rsecret", &hashed).unwrap());
    }
}
