use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rocket::http::ContentType;
use rocket::local::blocking::{Client, LocalResponse};

use subforum::{new_instance, Config};

fn list_subs<'c>(client: &'c Client) -> LocalResponse<'c> {
    client.get("/sub").dispatch()
}

pub fn bench_list_subs(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().expect("couldn't create temp dir");
    let config = Config {
        database_url: dir.path().join("bench.db").to_string_lossy().into_owned(),
        ..Config::default()
    };

    let rocket = new_instance(config).unwrap();
    let client = Client::tracked(rocket).expect("valid rocket instance");

    for i in 0..100 {
        client
            .post("/sub")
            .header(ContentType::JSON)
            .body(format!(
                r#"{{"name": "sub{}", "description": "bench sub"}}"#,
                i
            ))
            .dispatch();
    }

    c.bench_function("list subs", |b| {
        b.iter(|| list_subs(black_box(&client)))
    });
}

criterion_group!(benches, bench_list_subs);
criterion_main!(benches);
