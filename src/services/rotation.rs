use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};

use crate::models::question::{Question, QuestionCategory};

/// Number of rotating questions shown on a morning page.
const MORNING_ROTATION_SIZE: usize = 2;

/// Modulus of the legacy date-keyed ordering. Changing it would change which
/// questions users see on which days, so it stays.
const ROTATION_MODULUS: u64 = 17;

/// Pick the ordered set of questions to present for `date`.
///
/// Priority questions are always included while active. Morning pages add at
/// most [`MORNING_ROTATION_SIZE`] rotating questions chosen by a
/// deterministic date-keyed ordering; evening pages show every active
/// question. Calling this twice with the same inputs returns the same list,
/// so a page reload never changes "today".
pub fn select_todays_questions(
    questions: &[Question],
    category: QuestionCategory,
    date: NaiveDate,
) -> Vec<Question> {
    let priority: Vec<&Question> = questions
        .iter()
        .filter(|q| q.is_active && q.is_priority)
        .collect();
    let rotating: Vec<&Question> = questions
        .iter()
        .filter(|q| q.is_active && !q.is_priority)
        .collect();

    let selected: Vec<&Question> = match category {
        QuestionCategory::Evening => rotating,
        QuestionCategory::Morning => {
            let key = date_key(date);
            let mut slots: Vec<(u64, usize, &Question)> = rotating
                .iter()
                .enumerate()
                .map(|(pos, q)| (rotation_slot(q, key), pos, *q))
                .collect();
            slots.sort_by_key(|&(slot, pos, _)| (slot, pos));
            slots
                .into_iter()
                .take(MORNING_ROTATION_SIZE)
                .map(|(_, _, q)| q)
                .collect()
        }
    };

    let mut result: Vec<&Question> = priority.into_iter().chain(selected).collect();
    // Priority questions win ties on sort_order; the stable sort keeps
    // insertion order beyond that.
    result.sort_by_key(|q| (q.sort_order, !q.is_priority));
    result.into_iter().cloned().collect()
}

/// The date's digits with separators removed: 2024-01-03 -> 20240103.
fn date_key(date: NaiveDate) -> u64 {
    date.year().max(0) as u64 * 10_000 + date.month() as u64 * 100 + date.day() as u64
}

fn rotation_slot(question: &Question, date_key: u64) -> u64 {
    id_key(&question.id.to_string()).wrapping_mul(date_key) % ROTATION_MODULUS
}

/// Numeric ids participate as-is; anything else (UUIDs included) gets a
/// stable digest so the ordering survives reloads and process restarts.
fn id_key(id: &str) -> u64 {
    id.parse::<u64>().unwrap_or_else(|_| {
        let digest = Sha256::digest(id.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn question(
        n: u128,
        category: QuestionCategory,
        is_priority: bool,
        is_active: bool,
        sort_order: i32,
    ) -> Question {
        let now = Utc::now();
        Question {
            id: Uuid::from_u128(n),
            user_id: Uuid::from_u128(1),
            text: format!("Question {}", n),
            category,
            is_active,
            is_priority,
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(questions: &[Question]) -> Vec<Uuid> {
        questions.iter().map(|q| q.id).collect()
    }

    fn morning_pool() -> Vec<Question> {
        let mut pool = vec![question(100, QuestionCategory::Morning, true, true, 0)];
        for n in 1..=5 {
            pool.push(question(n, QuestionCategory::Morning, false, true, n as i32));
        }
        pool
    }

    #[test]
    fn morning_selection_is_deterministic() {
        let pool = morning_pool();
        let day = date(2024, 3, 15);
        let first = select_todays_questions(&pool, QuestionCategory::Morning, day);
        let second = select_todays_questions(&pool, QuestionCategory::Morning, day);
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn morning_caps_rotating_at_two() {
        let pool = morning_pool();
        let result = select_todays_questions(&pool, QuestionCategory::Morning, date(2024, 1, 3));
        assert_eq!(result.len(), 3); // 1 priority + 2 rotating
        assert_eq!(result.iter().filter(|q| !q.is_priority).count(), 2);
    }

    #[test]
    fn priority_always_included() {
        let pool = morning_pool();
        for day in [date(2024, 1, 1), date(2024, 6, 30), date(2025, 12, 31)] {
            let result = select_todays_questions(&pool, QuestionCategory::Morning, day);
            assert!(
                result.iter().any(|q| q.id == Uuid::from_u128(100)),
                "priority question missing on {}",
                day
            );
        }
    }

    #[test]
    fn evening_returns_all_active() {
        let pool = vec![
            question(1, QuestionCategory::Evening, true, true, 0),
            question(2, QuestionCategory::Evening, false, true, 1),
            question(3, QuestionCategory::Evening, false, true, 2),
            question(4, QuestionCategory::Evening, false, true, 3),
            question(5, QuestionCategory::Evening, false, false, 4),
        ];
        let result = select_todays_questions(&pool, QuestionCategory::Evening, date(2024, 1, 3));
        assert_eq!(result.len(), 4);
        assert!(!result.iter().any(|q| q.id == Uuid::from_u128(5)));
    }

    #[test]
    fn inactive_priority_is_excluded() {
        let pool = vec![
            question(1, QuestionCategory::Morning, true, false, 0),
            question(2, QuestionCategory::Morning, false, true, 1),
        ];
        let result = select_todays_questions(&pool, QuestionCategory::Morning, date(2024, 1, 3));
        assert_eq!(ids(&result), vec![Uuid::from_u128(2)]);
    }

    #[test]
    fn empty_rotating_returns_priority_only() {
        let pool = vec![
            question(1, QuestionCategory::Morning, true, true, 0),
            question(2, QuestionCategory::Morning, true, true, 1),
        ];
        let result = select_todays_questions(&pool, QuestionCategory::Morning, date(2024, 1, 3));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn no_questions_yields_empty_result() {
        let result = select_todays_questions(&[], QuestionCategory::Morning, date(2024, 1, 3));
        assert!(result.is_empty());
    }

    #[test]
    fn fewer_rotating_than_cap_returns_what_exists() {
        let pool = vec![
            question(1, QuestionCategory::Morning, true, true, 0),
            question(2, QuestionCategory::Morning, false, true, 1),
        ];
        let result = select_todays_questions(&pool, QuestionCategory::Morning, date(2024, 1, 3));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn result_is_ordered_by_sort_order() {
        let pool = vec![
            question(1, QuestionCategory::Evening, false, true, 3),
            question(2, QuestionCategory::Evening, true, true, 1),
            question(3, QuestionCategory::Evening, false, true, 2),
        ];
        let result = select_todays_questions(&pool, QuestionCategory::Evening, date(2024, 1, 3));
        let orders: Vec<i32> = result.iter().map(|q| q.sort_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn priority_wins_sort_order_ties() {
        let pool = vec![
            question(1, QuestionCategory::Evening, false, true, 1),
            question(2, QuestionCategory::Evening, true, true, 1),
        ];
        let result = select_todays_questions(&pool, QuestionCategory::Evening, date(2024, 1, 3));
        assert_eq!(ids(&result), vec![Uuid::from_u128(2), Uuid::from_u128(1)]);
    }

    #[test]
    fn date_key_strips_separators() {
        assert_eq!(date_key(date(2024, 1, 3)), 20240103);
        assert_eq!(date_key(date(1999, 12, 31)), 19991231);
    }

    #[test]
    fn id_key_parses_numeric_ids() {
        assert_eq!(id_key("42"), 42);
        assert_eq!(id_key("0"), 0);
    }

    #[test]
    fn id_key_digest_is_stable_and_distinct() {
        let a = Uuid::from_u128(11).to_string();
        let b = Uuid::from_u128(12).to_string();
        assert_eq!(id_key(&a), id_key(&a));
        assert_ne!(id_key(&a), id_key(&b));
    }
}
