use std::hint::black_box;
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sealed_envelope::{
    encrypt_value, inspect, parse_public_key, wire, PemCertificate, PlaintextValue, SealingScope,
};

const CONTROLLER_CERT: &str = include_str!("../testdata/controller.crt");

fn time_it<F: FnMut()>(label: &str, iters: usize, mut f: F) {
    // warmup
    for _ in 0..(iters / 10).max(10) {
        f();
    }

    let start = Instant::now();
    for _ in 0..iters {
        f();
    }
    let elapsed = start.elapsed();

    let per_iter = elapsed / (iters as u32);
    println!("{:<16} total={:?}  per_iter={:?}", label, elapsed, per_iter);
}

fn main() {
    let pem = PemCertificate::new(CONTROLLER_CERT);
    let key = parse_public_key(&pem).unwrap();

    let small = PlaintextValue::new("p@ss");
    let large = PlaintextValue::new("x".repeat(64 * 1024));

    let sealed = encrypt_value(&key, &small, "prod", "db-creds", SealingScope::Strict).unwrap();
    let blob = STANDARD.decode(sealed.as_str()).unwrap();

    let iters = 2_000;

    time_it("parse_cert", iters, || {
        black_box(parse_public_key(black_box(&pem)).unwrap());
    });

    time_it("seal_small", iters, || {
        let ct = encrypt_value(&key, black_box(&small), "prod", "db-creds", SealingScope::Strict);
        black_box(ct.unwrap());
    });

    time_it("seal_64k", iters / 4, || {
        let ct = encrypt_value(&key, black_box(&large), "prod", "db-creds", SealingScope::Strict);
        black_box(ct.unwrap());
    });

    time_it("inspect", iters * 10, || {
        black_box(inspect(black_box(&sealed)).unwrap());
    });

    time_it("decode_wire", iters * 10, || {
        black_box(wire::decode_wire(black_box(&blob)).unwrap());
    });

    println!("\nDone.");
}
