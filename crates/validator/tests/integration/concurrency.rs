use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use tagval::{Validate, Validator};

#[derive(Validate)]
struct Job {
    #[validate("required,max=16")]
    id: String,
    #[validate("gte=1,lte=10")]
    priority: u8,
    #[validate("dive,alphanum")]
    labels: Vec<String>,
}

fn job(n: usize) -> Job {
    Job {
        id: format!("job-{n}"),
        priority: u8::try_from(n % 12).unwrap(),
        labels: vec!["ok".into(), if n % 2 == 0 { "fine".into() } else { "not ok".into() }],
    }
}

fn expected_errors(n: usize) -> usize {
    let priority = usize::from(n % 12 == 0 || n % 12 == 11);
    let label = n % 2;
    priority + label
}

#[test]
fn test_shared_validator_across_threads() {
    let validator = Arc::new(Validator::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                for i in 0..200 {
                    let n = worker * 200 + i;
                    let errors = validator.validate_struct(&job(n)).unwrap();
                    assert_eq!(errors.len(), expected_errors(n), "job {n}");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = validator.cache_stats();
    assert_eq!(stats.structs, 1);
}

#[test]
fn test_compiled_once_after_warm_up() {
    let validator = Validator::new();
    validator.validate_struct(&job(1)).unwrap();
    validator.validate_value(&5_u8, "gte=1,lte=10").unwrap();
    let warm = validator.cache_stats();

    thread::scope(|scope| {
        for worker in 0..4 {
            let validator = &validator;
            scope.spawn(move || {
                for i in 0..100 {
                    validator.validate_struct(&job(worker * 100 + i)).unwrap();
                    validator.validate_value(&(i % 12), "gte=1,lte=10").unwrap();
                }
            });
        }
    });

    assert_eq!(validator.cache_stats(), warm);
    assert_eq!(warm.parses, 4);
}

#[test]
fn test_clear_cache_recompiles() {
    let validator = Validator::new();
    validator.validate_struct(&job(1)).unwrap();
    validator.clear_cache();
    assert_eq!(validator.cache_stats().structs, 0);

    validator.validate_struct(&job(1)).unwrap();
    let stats = validator.cache_stats();
    assert_eq!(stats.structs, 1);
    assert_eq!(stats.parses, 6);
}
