//! # Prime and Modular Arithmetic
//!
//! Small-number primality and exponentiation for the key exchange. Primes
//! here top out around 2^33 (a 32-bit seed doubled plus one), which keeps
//! trial division honest and every intermediate product inside u128.

use rand::Rng;

/// Trial division up to the square root. 0 and 1 are not prime.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut x = 2u64;
    // x <= n / x is the overflow-free form of x * x <= n.
    while x <= n / x {
        if n % x == 0 {
            return false;
        }
        x += 1;
    }
    true
}

/// Smallest prime not below `n`, scanning odd candidates.
pub fn next_prime(mut n: u64) -> u64 {
    if n % 2 == 0 {
        n += 1;
    }
    while !is_prime(n) {
        n += 2;
    }
    n
}

/// Right-to-left square-and-multiply, `value^exp mod modulus`.
///
/// Every multiplication is widened to u128 before reducing, so 64-bit
/// operands cannot overflow.
pub fn modexp(value: u64, exp: u64, modulus: u64) -> u64 {
    let m = modulus as u128;
    let mut v = value as u128 % m;
    let mut e = exp;
    let mut result = 1u128;

    while e > 0 {
        if e & 1 == 1 {
            result = result * v % m;
        }
        e >>= 1;
        v = v * v % m;
    }
    result as u64
}

/// Generate a safe prime p = 2q + 1 with q prime.
///
/// Draws a 32-bit seed, walks to the next prime q, and retries the whole
/// draw whenever 2q + 1 is composite. The result always fits in 64 bits.
pub fn generate_safe_prime() -> (u64, u64) {
    let mut rng = rand::thread_rng();
    loop {
        let q = next_prime(rng.gen::<u32>() as u64);
        let p = 2 * q + 1;
        if is_prime(p) {
            return (p, q);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primality_basics() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(97));
        assert!(!is_prime(91)); // 7 * 13
        assert!(is_prime(2_147_483_647)); // 2^31 - 1
        assert!(!is_prime(2_147_483_649));
    }

    #[test]
    fn next_prime_walks_upward() {
        assert_eq!(next_prime(0), 3);
        assert_eq!(next_prime(8), 11);
        assert_eq!(next_prime(13), 13);
        assert_eq!(next_prime(14), 17);
        assert_eq!(next_prime(90), 97);
    }

    #[test]
    fn modexp_known_values() {
        assert_eq!(modexp(2, 10, 1_000_000_007), 1024);
        assert_eq!(modexp(3, 0, 97), 1);
        assert_eq!(modexp(10, 9, 7), 10u64.pow(9) % 7);
        // Fermat: a^(p-1) = 1 mod p
        assert_eq!(modexp(5, 96, 97), 1);
    }

    #[test]
    fn modexp_exponent_addition_law() {
        // a^b * a^c = a^(b+c) in the multiplicative group mod a prime.
        let m = 1_000_003u64;
        for (a, b, c) in [(7u64, 13u64, 29u64), (2, 100, 3), (999, 5, 5)] {
            let lhs = (modexp(a, b, m) as u128 * modexp(a, c, m) as u128 % m as u128) as u64;
            assert_eq!(lhs, modexp(a, b + c, m));
        }
    }

    #[test]
    fn modexp_survives_large_operands() {
        // Operands near 2^33, the working range of the exchange.
        let p = 8_589_934_583u64; // safe-prime sized modulus
        let r = modexp(p - 2, p - 1, p);
        assert!(r < p);
    }

    #[test]
    fn safe_prime_structure() {
        for _ in 0..3 {
            let (p, q) = generate_safe_prime();
            assert_eq!(p, 2 * q + 1);
            assert!(is_prime(p), "{} is not prime", p);
            assert!(is_prime(q), "{} is not prime", q);
        }
    }
}
