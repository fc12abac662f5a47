//! # Synthetic Payloads
//!
//! Fake-but-plausible personal and financial records used to exercise the
//! block pipeline. None of the values are real; they only need to look
//! like the kind of heterogeneous, variably-sized data a producer would
//! feed into leaf records.
//!
//! Generation is driven by any `rand::Rng`, so a seeded `StdRng` yields
//! byte-identical payloads (and therefore identical Merkle roots) across
//! runs.

use chrono::{DateTime, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Margaret", "Ken", "Radia", "Linus",
    "Frances", "Dennis", "Hedy", "Tim", "Karen",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Thompson",
    "Perlman", "Torvalds", "Allen", "Ritchie", "Lamarr", "Berners-Lee", "Jones",
];

const TITLES: &[&str] = &["Mr.", "Ms.", "Mrs.", "Dr.", "Prof."];

const WORDS: &[&str] = &[
    "ledger", "sapphire", "merkle", "branch", "vector", "orbit", "harbor", "signal", "quartz",
    "lantern", "meadow", "cipher", "summit", "ember", "delta", "prism", "canyon", "falcon",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "mail.test", "corp.invalid"];

const TLDS: &[&str] = &["com", "org", "net", "io", "dev"];

const CARD_TYPES: &[&str] = &["VISA", "MasterCard", "American Express", "Discover", "JCB"];

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CHF", "BRL", "KES", "INR"];

const TIMEZONES: &[&str] = &[
    "UTC",
    "Europe/Lisbon",
    "America/Sao_Paulo",
    "Africa/Nairobi",
    "Asia/Tokyo",
    "Australia/Sydney",
];

/// Seconds since epoch bounding generated dates: 2000-01-01 .. 2030-01-01.
const EPOCH_RANGE: std::ops::Range<i64> = 946_684_800..1_893_456_000;

/// One synthetic record. Every field is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticRecord {
    pub latitude: f32,
    pub longitude: f32,
    pub credit_card_number: String,
    pub credit_card_type: String,
    pub email: String,
    pub ipv4: String,
    pub ipv6: String,
    pub password: String,
    pub phone_number: String,
    pub mac_address: String,
    pub url: String,
    pub username: String,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub unix_time: i64,
    pub date: String,
    pub time: String,
    pub month_name: String,
    pub year: String,
    pub day_of_week: String,
    pub day_of_month: String,
    pub timestamp: String,
    pub timezone: String,
    pub word: String,
    pub sentence: String,
    pub paragraph: String,
    pub currency: String,
    pub amount: f64,
    pub amount_with_currency: String,
}

/// Draw one record from `rng`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> SyntheticRecord {
    let first_name = pick(rng, FIRST_NAMES).to_string();
    let last_name = pick(rng, LAST_NAMES).to_string();
    let username = format!(
        "{}{}{}",
        first_name.to_lowercase(),
        pick(rng, &["", ".", "_"]),
        rng.gen_range(1..10_000)
    );

    let unix_time = rng.gen_range(EPOCH_RANGE);
    let moment = to_datetime(unix_time);

    let currency = pick(rng, CURRENCIES).to_string();
    let amount = (rng.gen_range(0.0..100_000.0f64) * 100.0).round() / 100.0;

    SyntheticRecord {
        latitude: rng.gen_range(-90.0..=90.0),
        longitude: rng.gen_range(-180.0..=180.0),
        credit_card_number: digits(rng, 16),
        credit_card_type: pick(rng, CARD_TYPES).to_string(),
        email: format!("{}@{}", username, pick(rng, DOMAINS)),
        ipv4: format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=223u8),
            rng.gen::<u8>(),
            rng.gen::<u8>(),
            rng.gen_range(1..=254u8)
        ),
        ipv6: (0..8)
            .map(|_| format!("{:x}", rng.gen::<u16>()))
            .collect::<Vec<_>>()
            .join(":"),
        password: hex::encode(rng.gen::<[u8; 12]>()),
        phone_number: format!("+{} {}-{}", rng.gen_range(1..=99), digits(rng, 3), digits(rng, 7)),
        mac_address: rng
            .gen::<[u8; 6]>()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":"),
        url: format!("https://{}.{}/", pick(rng, WORDS), pick(rng, TLDS)),
        username,
        title: pick(rng, TITLES).to_string(),
        name: format!("{} {}", first_name, last_name),
        first_name,
        last_name,
        unix_time,
        date: moment.format("%Y-%m-%d").to_string(),
        time: moment.format("%H:%M:%S").to_string(),
        month_name: moment.format("%B").to_string(),
        year: moment.format("%Y").to_string(),
        day_of_week: moment.format("%A").to_string(),
        day_of_month: moment.format("%d").to_string(),
        timestamp: moment.format("%Y-%m-%d %H:%M:%S").to_string(),
        timezone: pick(rng, TIMEZONES).to_string(),
        word: pick(rng, WORDS).to_string(),
        sentence: sentence(rng),
        paragraph: (0..rng.gen_range(2..6))
            .map(|_| sentence(&mut *rng))
            .collect::<Vec<_>>()
            .join(" "),
        amount_with_currency: format!("{} {:.2}", currency, amount),
        currency,
        amount,
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn digits<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let words: Vec<&str> = (0..rng.gen_range(4..12)).map(|_| pick(&mut *rng, WORDS)).collect();
    let mut sentence = words.join(" ");
    if let Some(first) = sentence.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    sentence.push('.');
    sentence
}

fn to_datetime(unix_time: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(unix_time, 0)
        .single()
        .unwrap_or_default()
}
