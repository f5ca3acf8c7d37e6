use rand::Rng;

/// Excludes visually ambiguous characters (I, O, 0, 1) so codes survive
/// being read aloud or typed from paper.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const INVITE_CODE_LENGTH: usize = 8;

/// Draws one byte per character from the thread-local CSPRNG and maps it
/// into the alphabet. Uniqueness is not this function's job; the store's
/// unique index on `code` is, with the caller retrying on conflict.
pub fn generate_code(length: usize, alphabet: &[u8]) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let byte: u8 = rng.r#gen();
            alphabet[byte as usize % alphabet.len()] as char
        })
        .collect()
}
