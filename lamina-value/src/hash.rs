// lamina-value - Deep hashing for values and collections
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! 32-bit structural hashing.
//!
//! Ordered collections fold entry hashes with a multiply-add; unordered
//! collections fold commutatively so permutations of the same multiset hash
//! identically. The running accumulator is finalized with a Murmur3-style
//! avalanche seeded by the element count and reduced to a small-integer
//! range. Coherent with deep equality: equal values hash equal.

use std::hash::{Hash, Hasher};

use crate::value::{Value, Variant};

const NIL_HASH: u32 = 0x4210_8422;
const TRUE_HASH: u32 = 0x4210_8421;
const FALSE_HASH: u32 = 0x4210_8420;

/// Reduce a 32-bit hash to the small-integer range.
pub fn smi(h: u32) -> u32 {
    h & 0x3fff_ffff
}

/// Combine two hashes, order-sensitively.
pub fn hash_merge(a: u32, b: u32) -> u32 {
    a ^ b
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(a << 6)
        .wrapping_add(a >> 2)
}

/// Murmur3-style finalizer, seeded by the element count.
pub fn avalanche(count: u32, h: u32) -> u32 {
    let mut h = h.wrapping_mul(0xcc9e_2d51);
    h = h.rotate_left(15).wrapping_mul(0x1b87_3593);
    h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    h ^= count;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    smi(h)
}

pub fn hash_string(s: &str) -> u32 {
    let mut h: u32 = 0;
    for c in s.chars() {
        h = h.wrapping_mul(31).wrapping_add(c as u32);
    }
    smi(h)
}

/// Hash a number. Canonicalizes so that numerically equal values hash
/// equal regardless of representation: `-0.0` hashes as `0.0`, every NaN
/// hashes alike, and an integral float hashes as its integer.
pub fn hash_number(n: f64) -> u32 {
    if n.is_nan() {
        return 0x7ff8_0000 & 0x3fff_ffff;
    }
    let n = if n == 0.0 { 0.0 } else { n };
    let bits = n.to_bits();
    smi((bits ^ (bits >> 32)) as u32)
}

pub fn hash_value(v: &Value) -> u32 {
    match v {
        Value::Nil => NIL_HASH,
        Value::Bool(true) => TRUE_HASH,
        Value::Bool(false) => FALSE_HASH,
        Value::Int(n) => hash_number(*n as f64),
        Value::Float(n) => hash_number(*n),
        Value::Str(s) => hash_string(s),
        Value::Coll(c) => c.hash_code(),
    }
}

/// Fold entry hashes into a collection hash.
///
/// The caller is responsible for the infinite-collection case (hash 0);
/// this function consumes a finite entry iterator.
pub fn hash_collection<I>(variant: Variant, ordered: bool, entries: I) -> u32
where
    I: Iterator<Item = (Value, Value)>,
{
    let keyed = variant == Variant::Keyed;
    let mut h: u32 = if ordered { 1 } else { 0 };
    let mut count: u32 = 0;
    for (k, v) in entries {
        let e = if keyed {
            hash_merge(hash_value(&v), hash_value(&k))
        } else {
            hash_value(&v)
        };
        h = if ordered {
            h.wrapping_mul(31).wrapping_add(e)
        } else {
            h.wrapping_add(e)
        };
        count = count.wrapping_add(1);
    }
    avalanche(count, h)
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(hash_value(self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_hash_is_representation_independent() {
        assert_eq!(hash_number(1.0), hash_value(&Value::Int(1)));
        assert_eq!(hash_number(-0.0), hash_number(0.0));
        assert_eq!(hash_number(f64::NAN), hash_number(-f64::NAN));
    }

    #[test]
    fn unordered_fold_is_commutative() {
        let a = hash_collection(
            Variant::Set,
            false,
            vec![
                (Value::Int(1), Value::Int(1)),
                (Value::Int(2), Value::Int(2)),
            ]
            .into_iter(),
        );
        let b = hash_collection(
            Variant::Set,
            false,
            vec![
                (Value::Int(2), Value::Int(2)),
                (Value::Int(1), Value::Int(1)),
            ]
            .into_iter(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn ordered_fold_is_order_sensitive() {
        let entry = |n: i64, i: i64| (Value::Int(i), Value::Int(n));
        let a = hash_collection(
            Variant::Indexed,
            true,
            vec![entry(1, 0), entry(2, 1)].into_iter(),
        );
        let b = hash_collection(
            Variant::Indexed,
            true,
            vec![entry(2, 0), entry(1, 1)].into_iter(),
        );
        assert_ne!(a, b);
    }
}
