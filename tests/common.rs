#![allow(dead_code)]

use amqp_engine::types::{Map, Value};
use chrono::{TimeZone, Utc};
use fake::{Fake, Faker};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

pub fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn fake_scalar() -> Value {
    match (0..11).fake::<u8>() {
        0 => Value::Null,
        1 => Value::Boolean(Faker.fake()),
        2 => Value::from(Faker.fake::<u64>()),
        3 => Value::from(Faker.fake::<i64>()),
        4 => Value::from((-1.0e9..1.0e9).fake::<f64>()),
        5 => Value::Char(Faker.fake()),
        6 => {
            let millis = (-1_000_000_000_000i64..4_000_000_000_000).fake::<i64>();
            Value::Timestamp(Utc.timestamp_millis_opt(millis).unwrap())
        }
        7 => Value::Uuid(Uuid::from_u128(Faker.fake())),
        8 => Value::String(Faker.fake()),
        9 => Value::Binary(Faker.fake()),
        _ => Value::from((0..300u32).fake::<u32>()),
    }
}

/// A random native value nested at most `depth` levels deep.
pub fn fake_value(depth: u8) -> Value {
    if depth == 0 {
        return fake_scalar();
    }
    match (0..4).fake::<u8>() {
        0 => Value::List((0..(0..5).fake::<usize>()).map(|_| fake_value(depth - 1)).collect()),
        1 => {
            let mut map = Map::new();
            for _ in 0..(0..5).fake::<usize>() {
                map.insert(Faker.fake::<String>(), fake_value(depth - 1));
            }
            Value::Map(map)
        }
        _ => fake_scalar(),
    }
}
