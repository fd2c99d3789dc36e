use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::parser::{lint_quiz, parse_quiz_str};

fn make_quiz_toml(n: usize) -> String {
    let mut s = String::from(
        "[quiz]\nid = \"bench\"\ntitle = \"Bench\"\npassing_score = 80\n",
    );
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[questions]]
id = {i}
prompt = "What is the maximum Zs for circuit {i}?"
options = ["0.72 ohm", "1.44 ohm", "2.30 ohm", "3.68 ohm"]
correct_index = {}
explanation = "Tabulated in the regulations."
section = "{}.{}"
category = "Regulations"
difficulty = "intermediate"
"#,
            i % 4,
            i % 7 + 1,
            i % 5 + 1
        ));
    }
    s
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_quiz");
    let path = PathBuf::from("bench.toml");

    let small = make_quiz_toml(10);
    let bank = make_quiz_toml(250);

    group.bench_function("10_questions", |b| {
        b.iter(|| parse_quiz_str(black_box(&small), &path))
    });

    group.bench_function("250_questions", |b| {
        b.iter(|| parse_quiz_str(black_box(&bank), &path))
    });

    group.finish();
}

fn bench_lint(c: &mut Criterion) {
    let quiz = parse_quiz_str(&make_quiz_toml(250), &PathBuf::from("bench.toml")).unwrap();

    c.bench_function("lint_quiz/250", |b| b.iter(|| lint_quiz(black_box(&quiz), 70)));
}

criterion_group!(benches, bench_parse, bench_lint);
criterion_main!(benches);
