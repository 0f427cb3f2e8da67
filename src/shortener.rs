use crate::{
    error::{AppError, Result},
    models::UrlPair,
    store::{Store, StoreError},
};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::sync::{Arc, Mutex, PoisonError};

/// Characters an alias is drawn from.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Every alias has exactly this many characters.
pub const ALIAS_LENGTH: usize = 7;

/// Candidate draws allowed per new pair before giving up.
pub const MAX_ATTEMPTS: u32 = 10;

/// Draw `ALIAS_LENGTH` characters uniformly, with replacement, from `ALPHABET`.
pub fn random_alias<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ALIAS_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// `true` if `s` has the shape of a generated alias.
pub fn is_alias(s: &str) -> bool {
    s.len() == ALIAS_LENGTH && s.bytes().all(|b| ALPHABET.contains(&b))
}

/// Maps original URLs to aliases, creating a pair the first time a URL is seen.
///
/// The random source is created once and shared by every call. Uniqueness is
/// ultimately enforced by the store's `UNIQUE` indexes: a rejected insert is
/// retried with a fresh candidate, or resolved to the pair that won the race
/// when another request shortened the same URL first.
pub struct Shortener<R = StdRng> {
    store: Arc<dyn Store>,
    rng: Mutex<R>,
}

impl Shortener<StdRng> {
    /// Shortener with an OS-seeded generator.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }
}

impl<R: RngCore + Send> Shortener<R> {
    pub fn with_rng(store: Arc<dyn Store>, rng: R) -> Self {
        Self {
            store,
            rng: Mutex::new(rng),
        }
    }

    fn candidate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        random_alias(&mut *rng)
    }

    /// Return the alias for `original`, creating and persisting one if needed.
    ///
    /// Submitting the same URL again returns the alias it was first given.
    pub async fn shorten(&self, original: &str) -> Result<String> {
        if original.is_empty() {
            return Err(AppError::InvalidInput);
        }

        if let Some(alias) = self.store.find_by_original(original).await? {
            return Ok(alias);
        }

        for attempt in 1..=MAX_ATTEMPTS {
            let candidate = self.candidate();

            if self.store.exists_alias(&candidate).await? {
                tracing::debug!(attempt, alias = %candidate, "alias collision, redrawing");
                continue;
            }

            match self.store.insert(&UrlPair::new(original, &candidate)).await {
                Ok(()) => return Ok(candidate),
                Err(StoreError::UniquenessViolation(_)) => {
                    // Either the alias was taken after our check or the same
                    // URL was shortened concurrently; the latter has a winner.
                    if let Some(alias) = self.store.find_by_original(original).await? {
                        return Ok(alias);
                    }
                    tracing::debug!(attempt, alias = %candidate, "alias taken on insert, redrawing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::AliasSpaceExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }
}
