use sha2::{Digest, Sha256};

/// Hex SHA-256 of a migration's SQL text
pub fn checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable_hex() {
        let sum = checksum("CREATE TABLE nodes (id INTEGER)");
        assert_eq!(sum.len(), 64);
        assert!(sum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(sum, checksum("CREATE TABLE nodes (id INTEGER)"));
        assert_ne!(sum, checksum("CREATE TABLE nodes (id TEXT)"));
    }
}
