//! Reusable scratch tokens for the recursive element decoders.
//!
//! Each nested decoder call works on its own copy of the start token it was
//! entered with. Those copies are checked out of a [`TokenPool`] and go back
//! to it when the [`PooledToken`] guard drops, on success and error paths
//! alike. A pool with capacity zero hands out fresh tokens every time.

use crate::tokenizer::{DEFAULT_ATTR_CAPACITY, Token};
use log::trace;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Idle tokens kept by the process-wide pool
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Pool used by the free-standing decode functions
pub static DEFAULT_POOL: TokenPool = TokenPool::new(DEFAULT_POOL_CAPACITY, DEFAULT_ATTR_CAPACITY);

/// A thread-safe free list of [`Token`]s
#[derive(Debug)]
pub struct TokenPool {
    free: Mutex<Vec<Token>>,
    capacity: usize,
    attr_capacity: usize,
}

impl TokenPool {
    pub const fn new(capacity: usize, attr_capacity: usize) -> Self {
        TokenPool {
            free: Mutex::new(Vec::new()),
            capacity,
            attr_capacity,
        }
    }

    /// Check out an empty token.
    pub fn get(&self) -> PooledToken<'_> {
        let reused = if self.capacity == 0 {
            None
        } else {
            self.free.lock().unwrap_or_else(PoisonError::into_inner).pop()
        };
        let token = reused.unwrap_or_else(|| {
            trace!("token pool empty, allocating");
            Token::with_attr_capacity(self.attr_capacity)
        });
        PooledToken { token, pool: self }
    }

    /// Check out a token holding a copy of `token`.
    pub fn copy_of(&self, token: &Token) -> PooledToken<'_> {
        let mut pooled = self.get();
        pooled.copy_from(token);
        pooled
    }

    /// Number of idle tokens waiting to be reused
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn put(&self, mut token: Token) {
        if self.capacity == 0 {
            return;
        }
        token.reset();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.capacity {
            free.push(token);
        }
    }
}

impl Default for TokenPool {
    fn default() -> Self {
        TokenPool::new(DEFAULT_POOL_CAPACITY, DEFAULT_ATTR_CAPACITY)
    }
}

/// A token checked out of a [`TokenPool`]; returned to it on drop
#[derive(Debug)]
pub struct PooledToken<'p> {
    token: Token,
    pool: &'p TokenPool,
}

impl Deref for PooledToken<'_> {
    type Target = Token;

    fn deref(&self) -> &Token {
        &self.token
    }
}

impl DerefMut for PooledToken<'_> {
    fn deref_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}

impl Drop for PooledToken<'_> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{TokenSource, XmlTokenizer};

    #[test]
    fn tokens_return_on_drop() {
        let pool = TokenPool::new(4, 2);
        assert_eq!(pool.idle(), 0);
        {
            let _a = pool.get();
            let _b = pool.get();
            assert_eq!(pool.idle(), 0);
        }
        assert_eq!(pool.idle(), 2);
        let _c = pool.get();
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn returned_tokens_are_cleared() {
        let pool = TokenPool::new(1, 2);
        let mut tok = XmlTokenizer::new(b"<Ad id=\"7\">text</Ad>");
        {
            let copy = pool.copy_of(tok.next_token().unwrap().unwrap());
            assert_eq!(copy.local_name(), b"Ad");
            assert_eq!(copy.attrs().len(), 1);
        }
        let reused = pool.get();
        assert!(reused.local_name().is_empty());
        assert!(reused.attrs().is_empty());
        assert!(reused.data.is_empty());
    }

    #[test]
    fn capacity_bounds_idle_tokens() {
        let pool = TokenPool::new(1, 0);
        {
            let _a = pool.get();
            let _b = pool.get();
            let _c = pool.get();
        }
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn zero_capacity_disables_pooling() {
        let pool = TokenPool::new(0, 0);
        drop(pool.get());
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn released_on_error_paths() {
        fn fails(pool: &TokenPool) -> Result<(), ()> {
            let _scratch = pool.get();
            Err(())
        }
        let pool = TokenPool::new(2, 0);
        assert!(fails(&pool).is_err());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn shared_across_threads() {
        let pool = TokenPool::new(8, 1);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let mut token = pool.get();
                        token.data.extend_from_slice(b"scratch");
                        assert_eq!(token.data, b"scratch");
                    }
                });
            }
        });
        assert!(pool.idle() <= 8);
    }
}
