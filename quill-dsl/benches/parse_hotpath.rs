use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quill_dsl::Lexer;
use quill_test_utils::fixtures::imports_parser;

const DOC_ROUTE: &str = r#"/**
 * Shows a single user.
 *
 * @Route("/users/{id}", name = "user_show", methods = {"GET", "HEAD"}, defaults = {"id" = 1})
 */"#;

const DOC_MAPPING: &str = r#"/**
 * @ORM\JoinTable(name = "users_groups",
 *     joinColumns = {@ORM\JoinColumn(name = "user_id", referencedColumnName = "id")},
 *     inverseJoinColumns = {@ORM\JoinColumn(name = "group_id")}
 * )
 * @ORM\Column(type = "integer", length = 11, nullable = true, options = {"unsigned" = true})
 */"#;

fn bench_lexer(c: &mut Criterion) {
    c.bench_function("lexer/tokenize_mapping", |b| {
        b.iter(|| {
            let tokens = Lexer::new(black_box(DOC_MAPPING)).tokenize();
            black_box(tokens.len());
        });
    });
}

fn bench_parse(c: &mut Criterion) {
    let mut parser = imports_parser();
    parser.parse(DOC_MAPPING, "").expect("warm metadata cache");

    c.bench_function("parser/route_cached", |b| {
        b.iter(|| {
            let annotations = parser
                .parse(black_box(DOC_ROUTE), "method UserController::show()")
                .expect("parse route");
            black_box(annotations.len());
        });
    });

    c.bench_function("parser/mapping_cached", |b| {
        b.iter(|| {
            let annotations = parser
                .parse(black_box(DOC_MAPPING), "property User::$groups")
                .expect("parse mapping");
            black_box(annotations.len());
        });
    });

    c.bench_function("parser/route_cold", |b| {
        b.iter(|| {
            let mut cold = imports_parser();
            let annotations = cold.parse(black_box(DOC_ROUTE), "").expect("parse route");
            black_box(annotations.len());
        });
    });
}

criterion_group!(benches, bench_lexer, bench_parse);
criterion_main!(benches);
