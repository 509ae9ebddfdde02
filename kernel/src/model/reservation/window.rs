use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};
use shared::error::{AppError, AppResult};

pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 17;
pub const MAX_DURATION_HOURS: i64 = 2;

const CLOSING_TIME: NaiveTime = match NaiveTime::from_hms_opt(CLOSING_HOUR, 0, 0) {
    Some(t) => t,
    None => panic!("CLOSING_HOUR must be a valid hour"),
};

/// 予約希望の時間帯 [start, end) を業務ルールに照らして検証する。
/// ルールは順に評価し、最初に違反したものだけを返す。
///
/// 1. start が now より前の日付ではないこと（日単位。同日の過去時刻は許容）
/// 2. 営業時間内であること（開始 9:00 以降、終了 17:00 ちょうどまで）
/// 3. end が start より後であること
/// 4. 2 時間以内であること
pub fn validate_window(
    start: DateTime<Local>,
    end: DateTime<Local>,
    now: DateTime<Local>,
) -> AppResult<()> {
    if start.date_naive() < now.date_naive() {
        return Err(AppError::InvalidWindow(format!(
            "booking day ({}) is in the past",
            start.date_naive()
        )));
    }

    if start.hour() < OPENING_HOUR {
        return Err(AppError::InvalidWindow(format!(
            "rooms open at {OPENING_HOUR}:00"
        )));
    }

    // 終了 17:00 ちょうどは許容するが、それを過ぎた分は（秒未満でも）不可
    if end.time() > CLOSING_TIME {
        return Err(AppError::InvalidWindow(format!(
            "rooms close at {CLOSING_HOUR}:00"
        )));
    }

    if end <= start {
        return Err(AppError::InvalidWindow(
            "end time must be after start time".into(),
        ));
    }

    if end - start > Duration::hours(MAX_DURATION_HOURS) {
        return Err(AppError::InvalidWindow(format!(
            "reservations are limited to {MAX_DURATION_HOURS} hours"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn dt(day: u32, hour: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2030, 3, day, hour, min, 0).unwrap()
    }

    #[rstest]
    // 営業時間より前に開始
    #[case(dt(10, 8, 0), dt(10, 9, 0))]
    // 営業時間を超えて終了
    #[case(dt(10, 16, 30), dt(10, 17, 30))]
    #[case(dt(10, 17, 0), dt(10, 18, 0))]
    // 長さゼロまたは逆転
    #[case(dt(10, 10, 0), dt(10, 10, 0))]
    #[case(dt(10, 11, 0), dt(10, 10, 0))]
    // 2 時間超
    #[case(dt(10, 9, 0), dt(10, 11, 30))]
    fn rejects_invalid_windows(#[case] start: DateTime<Local>, #[case] end: DateTime<Local>) {
        let now = dt(1, 12, 0);
        assert!(matches!(
            validate_window(start, end, now),
            Err(AppError::InvalidWindow(_))
        ));
    }

    #[rstest]
    #[case(dt(10, 9, 0), dt(10, 11, 0))]
    #[case(dt(10, 15, 0), dt(10, 17, 0))] // 17:00 ちょうど終了は境界として許容
    #[case(dt(10, 10, 0), dt(10, 10, 30))]
    fn accepts_valid_windows(#[case] start: DateTime<Local>, #[case] end: DateTime<Local>) {
        let now = dt(1, 12, 0);
        assert!(validate_window(start, end, now).is_ok());
    }

    #[test]
    fn rejects_an_end_fractionally_past_closing() {
        // 17:00:00.500 のような秒未満のはみ出しも営業時間超過
        let now = dt(1, 12, 0);
        let end = dt(10, 17, 0) + Duration::milliseconds(500);
        assert!(matches!(
            validate_window(dt(10, 16, 0), end, now),
            Err(AppError::InvalidWindow(_))
        ));
    }

    #[test]
    fn rejects_a_booking_on_a_prior_day() {
        let now = dt(10, 12, 0);
        let res = validate_window(dt(9, 10, 0), dt(9, 11, 0), now);
        assert!(matches!(res, Err(AppError::InvalidWindow(_))));
    }

    #[test]
    fn allows_an_earlier_slot_on_the_same_day() {
        // 日単位の判定なので、当日中であれば now より前の時刻でも通る
        let now = dt(10, 12, 0);
        assert!(validate_window(dt(10, 9, 0), dt(10, 10, 0), now).is_ok());
    }

    #[test]
    fn rule_order_reports_the_first_violation() {
        // 過去日かつ営業時間外の場合、過去日のほうが先に報告される
        let now = dt(10, 12, 0);
        let err = validate_window(dt(9, 8, 0), dt(9, 7, 0), now).unwrap_err();
        let AppError::InvalidWindow(reason) = err else {
            panic!("expected InvalidWindow");
        };
        assert!(reason.contains("in the past"));
    }
}
