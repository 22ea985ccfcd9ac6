use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use civicquiz_core::model::{Difficulty, Question, QuestionBank, QuizSummary};
use civicquiz_core::scoring::{award_points, compute_stats, max_possible_score};
use civicquiz_core::session::{Advance, QuizSession};

fn make_bank(count: u32) -> Arc<QuestionBank> {
    Arc::new(QuestionBank {
        id: "bench".into(),
        name: "Bench".into(),
        quiz_type: "politics".into(),
        description: String::new(),
        time_limit_secs: 30,
        questions: (1..=count)
            .map(|id| Question {
                id,
                prompt: format!("Question {id}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct: (id as usize) % 4,
                explanation: String::new(),
                difficulty: Difficulty::Medium,
                points: 10,
            })
            .collect(),
    })
}

/// Answer every third question wrong so the streak keeps resetting.
fn play(session: &mut QuizSession) -> QuizSummary {
    session.start().unwrap();
    loop {
        let question = session.current_question().unwrap();
        let choice = if session.current_index() % 3 == 2 {
            (question.correct + 1) % 4
        } else {
            question.correct
        };
        session.answer(choice).unwrap();
        if let Advance::Completed(summary) = session.advance().unwrap() {
            return summary;
        }
    }
}

fn bench_award_points(c: &mut Criterion) {
    c.bench_function("award_points", |b| {
        b.iter(|| award_points(black_box(10), black_box(7)))
    });
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    for count in [10, 100] {
        let bank = make_bank(count);
        group.bench_function(format!("play_{count}"), |b| {
            b.iter(|| {
                let mut session = QuizSession::new(Arc::clone(&bank));
                play(black_box(&mut session))
            })
        });
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let bank = make_bank(100);
    let summary = play(&mut QuizSession::new(Arc::clone(&bank)));

    c.bench_function("compute_stats/100", |b| {
        b.iter(|| compute_stats(black_box(&summary), black_box(&bank)))
    });

    c.bench_function("max_possible_score/100", |b| {
        b.iter(|| max_possible_score(black_box(&bank)))
    });
}

criterion_group!(benches, bench_award_points, bench_session, bench_stats);
criterion_main!(benches);
