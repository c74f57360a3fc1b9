//! Prime capacity sizing. Table capacities are always primes within
//! `[MIN_PRIME, MAX_PRIME]` so the quadratic probe sequence covers the table
//! well; requested capacities are normalized here.

/// Smallest allowed table capacity.
pub const MIN_PRIME: usize = 101;
/// Largest allowed table capacity. Searches never go past this; sizing
/// degrades to the ceiling instead of failing.
pub const MAX_PRIME: usize = 99_991;

/// Primality by trial division up to `n / 2`.
pub(crate) fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    for d in 2..=n / 2 {
        if n % d == 0 {
            return false;
        }
    }
    true
}

/// Smallest prime `>= from`, clamped to `[MIN_PRIME, MAX_PRIME]`. The scan
/// tests divisors up to the square root of each candidate and stops at the
/// ceiling, so it never leaves the configured range.
pub(crate) fn next_prime(from: usize) -> usize {
    let mut candidate = from.max(MIN_PRIME);
    while candidate < MAX_PRIME {
        let mut divisor = 2;
        while divisor * divisor <= candidate {
            if candidate % divisor == 0 {
                break;
            }
            divisor += 1;
        }
        if divisor * divisor > candidate {
            return candidate;
        }
        candidate += 1;
    }
    MAX_PRIME
}

/// Normalize a requested capacity: an in-range prime is kept as-is, anything
/// else is bumped to the next prime (degrading to `MAX_PRIME` at the top).
pub(crate) fn normalize_capacity(requested: usize) -> usize {
    if (MIN_PRIME..=MAX_PRIME).contains(&requested) && is_prime(requested) {
        requested
    } else {
        next_prime(requested)
    }
}
