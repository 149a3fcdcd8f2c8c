use codspeed_criterion_compat::{
    Criterion, Throughput, black_box, criterion_group, criterion_main,
};

static SOURCE: &str = "
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
func add(a: Int, b: Int) -> Int { return a + b * (a - b) / 2 } // sum
let total = add(1, 2) + add(3, 4) - -5
let total = add(1, 2) + add(3, 4) - -5
let total = add(1, 2) + add(3, 4) - -5
let total = add(1, 2) + add(3, 4) - -5
let total = add(1, 2) + add(3, 4) - -5
";

static IDENTIFIERS: &str =
    "It was the year when they finally immanentized the Eschaton It was the year when they \
     finally immanentized the Eschaton It was the year when they finally immanentized the \
     Eschaton It was the year when they finally immanentized the Eschaton It was the year when \
     they finally immanentized the Eschaton It was the year when they finally immanentized the \
     Eschaton It was the year when they finally immanentized the Eschaton";

static CANDIDATES: [(&str, &str); 2] =
    [("identifiers", IDENTIFIERS), ("keywords_operators_and_punctuation", SOURCE)];

fn iterate(s: &str) {
    use fidel_tokenizer::{SyntaxKind, Tokenizer};

    let mut tokenizer = Tokenizer::new(s);

    loop {
        let next_token = tokenizer.next_token();

        if next_token.kind == SyntaxKind::EOF {
            break;
        }

        black_box(next_token);
    }
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for (name, source) in CANDIDATES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(name, &source, |b, &s| b.iter(|| iterate(s)));
    }
}

criterion_group!(benches, bench_iterate);
criterion_main!(benches);
