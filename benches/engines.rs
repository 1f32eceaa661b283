use criterion::{criterion_group, criterion_main, Criterion};
use std::path::Path;

use tridesk::{MemoryAttachmentStore, MessageNormalizer, RawMessage};

fn load_fixture() -> (Vec<RawMessage>, MemoryAttachmentStore) {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");
    let messages = std::fs::read_to_string(dir.join("messages.json")).unwrap();
    let store = MemoryAttachmentStore::open(dir.join("attachments.json")).unwrap();
    (serde_json::from_str(&messages).unwrap(), store)
}

fn bench_normalize_batch(c: &mut Criterion) {
    let (messages, store) = load_fixture();
    let normalizer = MessageNormalizer::new(store);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("normalize_fixture_batch", |b| {
        b.iter(|| runtime.block_on(normalizer.normalize_batch(&messages, "token")))
    });
}

fn bench_plain_to_html(c: &mut Criterion) {
    let text = "Hello <team> & friends,\r\nsee https://example.com/a?b=1&c=2 for details.\n".repeat(200);

    c.bench_function("plain_text_to_html_200_lines", |b| {
        b.iter(|| tridesk::parser::body::plain_text_to_html(&text))
    });
}

fn bench_rrule(c: &mut Criterion) {
    let rules = [
        "RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR",
        "RRULE:FREQ=MONTHLY;BYMONTHDAY=-1;COUNT=12",
        "RRULE:FREQ=YEARLY;BYMONTH=3,9;BYDAY=-1SU;UNTIL=20301231T235959Z",
    ];

    c.bench_function("rrule_parse_build", |b| {
        b.iter(|| {
            rules
                .iter()
                .filter_map(|r| tridesk::parse_recurrence_rule(r))
                .map(|r| tridesk::build_recurrence_rule(&r))
                .count()
        })
    });

    c.bench_function("rrule_describe", |b| {
        b.iter(|| {
            rules
                .iter()
                .map(|r| tridesk::describe_recurrence_in(r, tridesk::i18n::Lang::En))
                .count()
        })
    });
}

criterion_group!(benches, bench_normalize_batch, bench_plain_to_html, bench_rrule);
criterion_main!(benches);
