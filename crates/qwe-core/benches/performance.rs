use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use qwe_core::{Cursor, Editor, Mode, Position};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (qwe benchmark line)\n"
        ));
    }
    out.pop();
    out
}

fn bench_open(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("open/50k_lines", |b| {
        b.iter(|| {
            let editor = Editor::with_text(black_box(&text));
            black_box(editor.active_buffer().map(|b| b.line_count()));
        })
    });
}

fn bench_multi_cursor_typing(c: &mut Criterion) {
    let text = large_text(5_000);
    c.bench_function("multi_cursor/1000_cursors_10_chars", |b| {
        b.iter_batched(
            || {
                let mut editor = Editor::with_text(&text);
                let cursors = (0..1_000).map(|row| Cursor::new(0, row * 5)).collect();
                if let Some(buffer) = editor.active_buffer_mut() {
                    buffer.set_cursors(cursors);
                }
                editor.set_mode(Mode::Insert);
                editor
            },
            |mut editor| {
                for ch in "0123456789".chars() {
                    editor.insert_rune(ch);
                }
                black_box(editor.active_buffer().map(|b| b.line_len(0)));
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || {
                let mut editor = Editor::with_text(&text);
                if let Some(buffer) = editor.active_buffer_mut() {
                    buffer.set_primary_position(Position::new(25_000, 10));
                }
                editor
            },
            |mut editor| {
                for _ in 0..100 {
                    editor.insert_rune('x');
                }
                black_box(editor.active_buffer().map(|b| b.line_len(25_000)));
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_global_replace(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("replace/global_10k_lines", |b| {
        b.iter_batched(
            || {
                let mut editor = Editor::with_text(&text);
                editor.start_replace();
                editor
            },
            |mut editor| {
                black_box(editor.execute_replace("/fox/cat/g").ok());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_open,
    bench_multi_cursor_typing,
    bench_typing_in_middle,
    bench_global_replace
);
criterion_main!(benches);
