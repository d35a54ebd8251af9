use chrono::{SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Weyl increment used to spread row indices over the seed space.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// NURand run-time constants, A = 255, 1023 and 8191.
const C_LAST: u64 = 157;
const C_ID: u64 = 259;
const C_OL_I_ID: u64 = 7911;

const NAMESET: &[&str] = &[
    "BAR", "OUGHT", "ABLE", "PRI", "PRES", "ESE", "ANTI", "CALLY", "ATION", "EING",
];

/// Stable (process and platform independent) hash.
pub fn stable_hash<T: Hash>(t: &T) -> u64 {
    let mut s = FxHasher::default();
    t.hash(&mut s);
    finalize(s.finish())
}

/// splitmix64 finalizer; FxHash alone leaves the low bits of nearby keys correlated.
fn finalize(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Random source for a single row.
///
/// Depends only on the producer seed and the row index, so rows can be generated in any order and on
/// any thread.
pub fn row_rng(seed: u64, row_index: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(row_index.wrapping_mul(GOLDEN_GAMMA)))
}

/// Number of order lines of an order, in [5, 15].
pub fn order_line_count(w_id: u64, d_id: u64, row_index: u64) -> u64 {
    stable_hash(&(w_id, d_id, row_index)) % 11 + 5
}

/// Bit-reverse an id so sequential ids scatter across the key space.
pub fn reverse_id(id: u64) -> i64 {
    (id as i64).reverse_bits()
}

/// Random decimal in [0, max_scaled) * 10^-decimal_places.
pub fn random_decimal<R: Rng>(rng: &mut R, max_scaled: u64, decimal_places: u32) -> String {
    let value = rng.gen_range(0..max_scaled);
    format_decimal(value, decimal_places)
}

/// Random decimal in [lower, upper] * 10^-decimal_places.
pub fn random_decimal_between<R: Rng>(
    rng: &mut R,
    lower: u64,
    upper: u64,
    decimal_places: u32,
) -> String {
    let value = rng.gen_range(lower..=upper);
    format_decimal(value, decimal_places)
}

fn format_decimal(value: u64, decimal_places: u32) -> String {
    if decimal_places == 0 {
        return value.to_string();
    }
    let scale = 10u64.pow(decimal_places);
    format!(
        "{}.{:0width$}",
        value / scale,
        value % scale,
        width = decimal_places as usize
    )
}

/// Generate an alphanumeric string of exactly `len` characters.
pub fn random_string<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate an alphanumeric string with length in [lower, upper].
pub fn random_string_between<R: Rng>(rng: &mut R, lower: usize, upper: usize) -> String {
    let size = rng.gen_range(lower..=upper);
    random_string(rng, size)
}

/// Generate a string of `len` digits.
pub fn random_digits<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Wrap in a CSV string literal, doubling embedded quotes.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Current instant; not reproducible across runs.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Generate a zip code.
pub fn zip<R: Rng>(rng: &mut R) -> String {
    format!("{}11111", random_digits(rng, 4))
}

/// Generate a last name from a number in [0, 999].
pub fn last_name(num: u64) -> String {
    let f = format!("{:03}", num % 1000);
    let mut result = String::new();
    for i in f.bytes() {
        result.push_str(NAMESET[(i - b'0') as usize]);
    }
    result
}

/// Last name of a customer during loading; the first 1000 customers cover every name.
pub fn customer_last_name<R: Rng>(c_id: u64, rng: &mut R) -> String {
    if c_id < 1000 {
        last_name(c_id)
    } else {
        last_name(nu_rand(255, 0, 999, rng))
    }
}

/// Generate a random number between [x, y].
pub fn rand<R: Rng>(x: u64, y: u64, rng: &mut R) -> u64 {
    rng.gen_range(x..=y)
}

/// Generate a non-uniform random number in [x, y].
pub fn nu_rand<R: Rng>(a: u64, x: u64, y: u64, rng: &mut R) -> u64 {
    let c = match a {
        255 => C_LAST,
        1023 => C_ID,
        8191 => C_OL_I_ID,
        _ => 0,
    };
    (((rng.gen_range(0..=a) | rng.gen_range(x..=y)) + c) % (y - x + 1)) + x
}

/// Generate item data `i_data` / `s_data`; 10% contain "ORIGINAL".
pub fn item_data<R: Rng>(rng: &mut R) -> String {
    let size = rng.gen_range(26..=50);
    if rng.gen_bool(0.1) {
        let pos = rng.gen_range(0..=size - 8);
        let start = random_string(rng, pos);
        let end = random_string(rng, size - (pos + 8));
        format!("{}ORIGINAL{}", start, end)
    } else {
        random_string(rng, size)
    }
}
