use sha3::{Digest, Keccak256};

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of the Keccak-256 hash of a canonical method signature,
/// e.g. `balanceOf(address)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.trim().as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}
