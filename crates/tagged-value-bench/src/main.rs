//! Benchmark for tagged-value marshalling using synthetic city records.
//!
//! Usage: `bench-cities [records] [iterations]`
//!
//! Set `RUST_LOG=tagged_value=debug` to see the library's tracing output.

use std::time::{Duration, Instant};

use tagged_value::{
    CodecOptions, Identifier, Mapping, Timestamp, Value, deserialize, marshal, marshal_with_options,
    unmarshal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

// =============================================================================
// SYNTHETIC DATA
// =============================================================================

const COUNTRIES: [(&str, &str); 6] = [
    ("FR", "France"),
    ("DE", "Germany"),
    ("JP", "Japan"),
    ("BR", "Brazil"),
    ("KE", "Kenya"),
    ("CA", "Canada"),
];

const TIMEZONES: [&str; 4] = ["Europe/Paris", "Asia/Tokyo", "America/Sao_Paulo", "Africa/Nairobi"];

const LANGUAGES: [&str; 5] = ["fr", "de", "ja", "pt", "sw"];

/// Deterministic identifier for a record of the given kind.
fn make_id(kind: &str, n: u32) -> Identifier {
    let mut input = Vec::with_capacity(kind.len() + 4);
    input.extend_from_slice(kind.as_bytes());
    input.extend_from_slice(&n.to_be_bytes());
    Identifier::derived(&input)
}

fn build_country(n: u32) -> Value {
    let (code, name) = COUNTRIES[n as usize % COUNTRIES.len()];
    Value::artefact(
        "Geo.Country",
        Mapping::new()
            .with_identifier("id", make_id("country", n))
            .with_string("code", code)
            .with_string("name", name),
    )
}

fn build_city(n: u32, created_at: Timestamp) -> Value {
    let lat = -60.0 + f64::from(n % 12_000) * 0.01;
    let lon = -170.0 + f64::from(n % 34_000) * 0.01;

    let mut translations = Mapping::new();
    for (i, lang) in LANGUAGES.iter().enumerate() {
        if (n as usize + i) % 3 != 0 {
            translations.insert(*lang, format!("City {} ({})", n, lang));
        }
    }

    let mut content = Mapping::new()
        .with_identifier("id", make_id("city", n))
        .with_string("name", format!("City {}", n))
        .with_int("population", (n.wrapping_mul(7_919) % 5_000_000) as i32)
        .with_artefact(
            "location",
            "Geo.Point",
            Mapping::new().with_double("lat", lat).with_double("lon", lon),
        )
        .with_string("timezone", TIMEZONES[n as usize % TIMEZONES.len()])
        .with("country", build_country(n % COUNTRIES.len() as u32))
        .with_mapping("translations", translations)
        .with_string_array("aliases", [format!("C{}", n), format!("city-{}", n)])
        .with_timestamp("created_at", created_at);

    if n % 5 == 0 {
        content = content.with_null("wikidata_id");
    } else {
        content = content.with_string("wikidata_id", format!("Q{}", 1_000 + n));
    }
    if n % 7 == 0 {
        content = content.with_sequence(
            "notes",
            vec![Value::string("capital"), Value::int(n as i32), Value::bool(true)],
        );
    }

    Value::artefact("Geo.City", content)
}

fn build_dataset(records: u32) -> Value {
    let created_at = Timestamp::from_epoch_micros(1_704_067_200_000_000).unwrap_or(Timestamp::UNIX_EPOCH);
    let cities: Vec<Value> = (0..records).map(|n| build_city(n, created_at)).collect();
    Mapping::new()
        .with_string("source", "synthetic")
        .with_int("count", records as i32)
        .with_sequence("cities", cities)
        .build()
}

// =============================================================================
// BENCHMARK
// =============================================================================

fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let records: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(50_000);
    let iterations: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5).max(1);

    info!(records, iterations, "building dataset");
    let build_start = Instant::now();
    let value = build_dataset(records);
    let build_time = build_start.elapsed();
    println!("Built {} city records in {:?}", records, build_time);

    // Marshal
    let marshal_start = Instant::now();
    let mut json = serde_json::Value::Null;
    for _ in 0..iterations {
        json = marshal(&value).expect("Failed to marshal");
    }
    let marshal_time = marshal_start.elapsed() / iterations;

    let render_start = Instant::now();
    let text = serde_json::to_string(&json).expect("Failed to render JSON");
    let render_time = render_start.elapsed();

    println!("\nMarshal: {:?} per iteration", marshal_time);
    println!("Render: {} bytes in {:?}", text.len(), render_time);
    println!("  Throughput: {:.2} MB/s", throughput(text.len(), render_time));

    // Parse + unmarshal
    let parse_start = Instant::now();
    let parsed: serde_json::Value = serde_json::from_str(&text).expect("Failed to parse JSON");
    let parse_time = parse_start.elapsed();

    // Warmup
    let _ = unmarshal(&parsed).expect("Failed to unmarshal");

    let unmarshal_start = Instant::now();
    let mut decoded = None;
    for _ in 0..iterations {
        decoded = Some(unmarshal(&parsed).expect("Failed to unmarshal"));
    }
    let unmarshal_time = unmarshal_start.elapsed() / iterations;

    println!("\nParse: {:?}", parse_time);
    println!("Unmarshal: {:?} per iteration", unmarshal_time);
    println!("  Throughput: {:.2} MB/s", throughput(text.len(), unmarshal_time));

    let decoded = decoded.expect("at least one iteration");
    assert_eq!(decoded, value, "Round trip should be exact");

    // Deserialize (tag stripping) for comparison with an untagged rendering
    let strip_start = Instant::now();
    let plain = deserialize(&value).expect("Failed to deserialize");
    let strip_time = strip_start.elapsed();
    let plain_json = plain.into_json().expect("Failed to render plain JSON");
    let plain_text = serde_json::to_string(&plain_json).expect("Failed to render JSON");

    println!("\nDeserialize: {:?}", strip_time);
    println!(
        "  Untagged size: {} bytes ({:.1}% tag overhead)",
        plain_text.len(),
        (text.len() as f64 / plain_text.len() as f64 - 1.0) * 100.0
    );

    // Custom type key must produce the same size (same key length)
    let options = CodecOptions::new().with_type_key("$kind").expect("valid type key");
    let custom = marshal_with_options(&value, &options).expect("Failed to marshal");
    let custom_text = serde_json::to_string(&custom).expect("Failed to render JSON");
    assert_eq!(custom_text.len(), text.len());

    info!("done");
}
