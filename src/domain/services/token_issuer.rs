use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, RngCore};
use tracing::warn;

use crate::domain::ports::GuestRepository;
use crate::error::AppError;

/// 256 bits of entropy per access token.
pub const TOKEN_BYTES: usize = 32;
pub const SLUG_SUFFIX_LEN: usize = 8;
pub const MAX_SLUG_ATTEMPTS: usize = 10;

const SLUG_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Opaque access token, base64url without padding. Carries no guest identity.
pub fn issue_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn fold_accent(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => return None,
    };
    Some(folded)
}

/// Lower-cased, ASCII-only, hyphen separated form of a display name.
pub fn slug_base(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c).unwrap_or(c);
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }

    if out.is_empty() {
        "guest".to_string()
    } else {
        out
    }
}

pub fn candidate_slug<R: Rng + ?Sized>(base: &str, rng: &mut R) -> String {
    let suffix: String = (0..SLUG_SUFFIX_LEN)
        .map(|_| SLUG_SUFFIX_ALPHABET[rng.gen_range(0..SLUG_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", base, suffix)
}

/// Draws candidates until `is_taken` accepts one, giving up after
/// `MAX_SLUG_ATTEMPTS`.
pub fn generate_unique_slug<R, F>(name: &str, rng: &mut R, mut is_taken: F) -> Result<String, AppError>
where
    R: Rng + ?Sized,
    F: FnMut(&str) -> bool,
{
    let base = slug_base(name);
    for _ in 0..MAX_SLUG_ATTEMPTS {
        let slug = candidate_slug(&base, rng);
        if !is_taken(&slug) {
            return Ok(slug);
        }
    }
    Err(AppError::SlugGenerationExhausted(MAX_SLUG_ATTEMPTS))
}

pub struct TokenIssuer {
    guests: Arc<dyn GuestRepository>,
}

impl TokenIssuer {
    pub fn new(guests: Arc<dyn GuestRepository>) -> Self {
        Self { guests }
    }

    pub fn issue_token(&self) -> String {
        issue_token()
    }

    /// Slug unique within `wedding_id` at the time of the check. Persisting it
    /// is the caller's job; the database constraint catches later races.
    pub async fn issue_unique_slug(&self, name: &str, wedding_id: &str) -> Result<String, AppError> {
        let base = slug_base(name);
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let slug = candidate_slug(&base, &mut rand::thread_rng());
            if self.guests.find_by_slug(wedding_id, &slug).await?.is_none() {
                return Ok(slug);
            }
            warn!("Slug collision for {} in wedding {}, retrying", slug, wedding_id);
        }
        Err(AppError::SlugGenerationExhausted(MAX_SLUG_ATTEMPTS))
    }
}
