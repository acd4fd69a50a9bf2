//! 选卡器
//!
//! 纯决策函数：给定用户当前可用的通卡集合（调用方已在事务内
//! FOR UPDATE 锁定），选出本次预约要消耗的那一张。
//!
//! 自动选卡顺序：
//! 1. 订阅优先于次卡（订阅不随消耗递减）
//! 2. 次卡之间先花最接近过期的（减少点数浪费）
//! 3. 仍相同时取 ID 最大者（最近签发的胜出）

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::error::{BookingError, Result};
use crate::models::{PassCandidate, PassKind};

/// 从可用通卡中选出要消耗的一张
///
/// - `requested`：显式指定的通卡 ID；必须属于该用户且此刻可用，
///   否则以 `no_active_pass` 失败（不泄露他人通卡是否存在）
/// - 未指定时按优先级自动选择
///
/// `candidates` 可以包含不可用的行，选卡前统一按 `now` 过滤。
pub fn select_pass<'a>(
    candidates: &'a [PassCandidate],
    requested: Option<i64>,
    now: DateTime<Utc>,
) -> Result<&'a PassCandidate> {
    let usable: Vec<&PassCandidate> = candidates.iter().filter(|c| c.is_usable(now)).collect();

    if let Some(id) = requested {
        return usable
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(BookingError::NoActivePass);
    }

    usable
        .into_iter()
        .min_by(|a, b| candidate_order(a, b))
        .ok_or(BookingError::NoActivePass)
}

/// 自动选卡的全序关系，排最前（最小）者被选中
fn candidate_order(a: &PassCandidate, b: &PassCandidate) -> Ordering {
    a.kind
        .priority()
        .cmp(&b.kind.priority())
        .then_with(|| match (a.kind, b.kind) {
            // 次卡之间按过期时间升序；订阅之间过期时间不参与排序
            (PassKind::Pack, PassKind::Pack) => a.expires_at.cmp(&b.expires_at),
            _ => Ordering::Equal,
        })
        .then_with(|| b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserPassStatus;
    use chrono::Duration;

    fn candidate(
        id: i64,
        kind: PassKind,
        credits: Option<i32>,
        expires_in_days: i64,
    ) -> PassCandidate {
        let now = Utc::now();
        PassCandidate {
            id,
            user_id: 1,
            pass_type_id: 1,
            starts_at: now - Duration::days(1),
            expires_at: now + Duration::days(expires_in_days),
            remaining_credits: credits,
            status: UserPassStatus::Active,
            kind,
        }
    }

    #[test]
    fn test_empty_set_fails() {
        let result = select_pass(&[], None, Utc::now());
        assert!(matches!(result, Err(BookingError::NoActivePass)));
    }

    #[test]
    fn test_subscription_preferred_over_pack() {
        let now = Utc::now();
        let candidates = vec![
            candidate(1, PassKind::Pack, Some(5), 3),
            candidate(2, PassKind::Subscription, None, 30),
        ];
        let selected = select_pass(&candidates, None, now).unwrap();
        assert_eq!(selected.id, 2);
    }

    #[test]
    fn test_soonest_expiring_pack_first() {
        let now = Utc::now();
        let candidates = vec![
            candidate(1, PassKind::Pack, Some(5), 60),
            candidate(2, PassKind::Pack, Some(5), 7),
            candidate(3, PassKind::Pack, Some(5), 30),
        ];
        let selected = select_pass(&candidates, None, now).unwrap();
        assert_eq!(selected.id, 2);
    }

    #[test]
    fn test_tie_broken_by_highest_id() {
        let now = Utc::now();
        let expires = now + Duration::days(10);
        let mut a = candidate(1, PassKind::Pack, Some(5), 10);
        let mut b = candidate(9, PassKind::Pack, Some(5), 10);
        a.expires_at = expires;
        b.expires_at = expires;

        let candidates = [a, b];
        let selected = select_pass(&candidates, None, now).unwrap();
        assert_eq!(selected.id, 9);
    }

    #[test]
    fn test_subscription_tie_broken_by_highest_id() {
        let now = Utc::now();
        // 两张订阅，过期时间不参与比较，ID 大者胜出
        let candidates = vec![
            candidate(3, PassKind::Subscription, None, 5),
            candidate(8, PassKind::Subscription, None, 90),
        ];
        let selected = select_pass(&candidates, None, now).unwrap();
        assert_eq!(selected.id, 8);
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let now = Utc::now();
        let mut candidates = vec![
            candidate(1, PassKind::Pack, Some(2), 45),
            candidate(2, PassKind::Subscription, None, 30),
            candidate(3, PassKind::Pack, Some(1), 5),
            candidate(4, PassKind::Pack, Some(9), 5),
        ];

        let first = select_pass(&candidates, None, now).unwrap().id;
        candidates.reverse();
        let second = select_pass(&candidates, None, now).unwrap().id;
        candidates.swap(0, 2);
        let third = select_pass(&candidates, None, now).unwrap().id;

        assert_eq!(first, 2);
        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_unusable_candidates_filtered_out() {
        let now = Utc::now();
        let mut expired_sub = candidate(1, PassKind::Subscription, None, 30);
        expired_sub.expires_at = now - Duration::hours(1);
        let empty_pack = candidate(2, PassKind::Pack, Some(0), 30);
        let good_pack = candidate(3, PassKind::Pack, Some(1), 30);

        let candidates = [expired_sub, empty_pack, good_pack];
        let selected = select_pass(&candidates, None, now).unwrap();
        assert_eq!(selected.id, 3);
    }

    #[test]
    fn test_explicit_id_must_be_usable() {
        let now = Utc::now();
        let mut cancelled = candidate(1, PassKind::Pack, Some(5), 30);
        cancelled.status = UserPassStatus::Cancelled;
        let good = candidate(2, PassKind::Pack, Some(5), 30);

        // 指定了不可用的卡 → no_active_pass，即便还有别的可用卡
        let candidates = [cancelled.clone(), good.clone()];
        let result = select_pass(&candidates, Some(1), now);
        assert!(matches!(result, Err(BookingError::NoActivePass)));

        // 指定可用的卡 → 直接返回，不做自动排序
        let candidates = [cancelled, good];
        let selected = select_pass(&candidates, Some(2), now).unwrap();
        assert_eq!(selected.id, 2);
    }

    #[test]
    fn test_explicit_id_unknown_fails() {
        let now = Utc::now();
        let candidates = vec![candidate(1, PassKind::Subscription, None, 30)];
        let result = select_pass(&candidates, Some(999), now);
        assert!(matches!(result, Err(BookingError::NoActivePass)));
    }
}
