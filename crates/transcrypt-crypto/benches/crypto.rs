use secrecy::SecretString;
use transcrypt_crypto::{decrypt, encrypt, CipherSuite, Value};

fn make_text(size: usize) -> String {
    (0..size)
        .map(|i| char::from(b'a' + ((i.wrapping_mul(7) ^ (i >> 3)) % 26) as u8))
        .collect()
}

fn secret() -> SecretString {
    SecretString::from("62656e63682d6d61737465722d736563726574")
}

#[divan::bench(args = [16, 1024, 65536])]
fn bench_encrypt_string(bencher: divan::Bencher, size: usize) {
    let secret = secret();
    let value = Value::from(make_text(size));
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            encrypt(
                divan::black_box(&secret),
                Some(b"saltsaltsalt"),
                CipherSuite::ChaCha20Poly1305,
                divan::black_box(&value),
            )
            .unwrap()
        });
}

#[divan::bench(args = [16, 1024, 65536])]
fn bench_decrypt_string(bencher: divan::Bencher, size: usize) {
    let secret = secret();
    let value = Value::from(make_text(size));
    let envelope = encrypt(&secret, None, CipherSuite::ChaCha20Poly1305, &value).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt(divan::black_box(&secret), divan::black_box(&envelope)).unwrap());
}

#[divan::bench]
fn bench_roundtrip_int_aes(bencher: divan::Bencher) {
    let secret = secret();
    bencher.bench(|| {
        let envelope = encrypt(
            divan::black_box(&secret),
            None,
            CipherSuite::Aes256Gcm,
            &Value::Int(divan::black_box(123456)),
        )
        .unwrap();
        decrypt(&secret, &envelope).unwrap()
    });
}

fn main() {
    divan::main();
}
