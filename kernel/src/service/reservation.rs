use std::sync::Arc;

use chrono::{DateTime, Local};
use derive_new::new;
use shared::error::{AppError, AppResult};

use crate::model::{
    id::ReservationId,
    reservation::{
        event::{BookRoom, CreateReservation},
        window::validate_window,
        Reservation, ReservationListing, ReservationMember,
    },
    user::User,
};
use crate::notifier::ReservationNotifier;
use crate::repository::{reservation::ReservationRepository, user::UserRepository};

/// 予約には予約者本人のほかに最低 3 名のメンバーコードが必要
pub const MIN_MEMBERS: usize = 3;

/// 予約のライフサイクルを司るサービス。
/// 時間帯の検証 → 空き確認 → メンバー解決 → 永続化 → 通知の順で進み、
/// どこかで失敗した場合はその時点のエラーを返して何も書き込まない。
#[derive(new)]
pub struct ReservationService {
    reservation_repository: Arc<dyn ReservationRepository>,
    user_repository: Arc<dyn UserRepository>,
    notifier: Arc<dyn ReservationNotifier>,
}

impl ReservationService {
    pub async fn book(&self, event: BookRoom) -> AppResult<Reservation> {
        // メンバーコードは重複を除いて数える
        let mut codes: Vec<String> = Vec::new();
        for code in &event.member_codes {
            if !codes.contains(code) {
                codes.push(code.clone());
            }
        }
        if codes.len() < MIN_MEMBERS {
            return Err(AppError::InsufficientMembers {
                required: MIN_MEMBERS,
                supplied: codes.len(),
            });
        }

        validate_window(event.start_time, event.end_time, Local::now())?;

        // 先に空きを確認して早期に弾く。
        // 競合する同時リクエストは create 内のトランザクションで再確認される。
        if !self
            .reservation_repository
            .is_available(event.room_id, event.start_time, event.end_time)
            .await?
        {
            return Err(AppError::RoomUnavailable(format!(
                "room ({}) is already reserved in the requested window",
                event.room_id
            )));
        }

        let resolved = self.user_repository.find_by_codes(&codes).await?;
        let missing: Vec<String> = codes
            .iter()
            .filter(|code| !resolved.iter().any(|u| &u.member_code == *code))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AppError::UnknownMembers(missing));
        }

        // 予約時点の名前とメールアドレスをスナップショットとして保存する
        let members = resolved
            .into_iter()
            .map(|u| ReservationMember {
                member_name: u.user_name,
                member_email: u.email,
            })
            .collect();

        let reservation = self
            .reservation_repository
            .create(CreateReservation::new(
                event.reserved_by,
                event.room_id,
                event.start_time,
                event.end_time,
                members,
            ))
            .await?;

        // 通知は best-effort。失敗しても予約自体は成立している
        self.notifier.reservation_created(&reservation);

        Ok(reservation)
    }

    /// 所有者の確認は行わない（元システムの仕様をそのまま引き継いでいる）
    pub async fn cancel(&self, reservation_id: ReservationId) -> AppResult<()> {
        self.reservation_repository.cancel(reservation_id).await
    }

    pub async fn list_for_user(&self, member_code: &str) -> AppResult<Vec<ReservationListing>> {
        let user = self
            .user_repository
            .find_by_code(member_code)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "user with member code ({member_code}) not found"
                ))
            })?;

        // 一覧取得のたびに期限切れの PENDING を確定させる（遅延タイマー）
        self.confirm_expired(Local::now()).await?;

        self.reservation_repository
            .find_for_user(user.user_id, &user.email)
            .await
    }

    /// 終了時刻を過ぎた PENDING 予約を CONFIRMED にする。
    /// list_for_user から遅延実行されるほか、外部スケジューラからも呼べる。
    pub async fn confirm_expired(&self, now: DateTime<Local>) -> AppResult<u64> {
        self.reservation_repository.confirm_expired(now).await
    }

    /// 予約フォームの逐次バリデーション用の単発ルックアップ
    pub async fn check_member(&self, member_code: &str) -> AppResult<User> {
        self.user_repository
            .find_by_code(member_code)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "user with member code ({member_code}) not found"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::{RoomId, UserId};
    use crate::model::reservation::ReservationStatus;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    // アダプタと同じ重なり判定・状態遷移を持つインメモリ実装
    #[derive(Default)]
    struct InMemoryReservationRepository {
        rows: Mutex<Vec<Reservation>>,
    }

    impl InMemoryReservationRepository {
        fn overlaps(rows: &[Reservation], event: &CreateReservation) -> bool {
            rows.iter().any(|r| {
                r.room_id == event.room_id
                    && r.status != ReservationStatus::Cancelled
                    && r.start_time < event.end_time
                    && r.end_time > event.start_time
            })
        }
    }

    #[async_trait]
    impl ReservationRepository for InMemoryReservationRepository {
        async fn create(&self, event: CreateReservation) -> AppResult<Reservation> {
            let mut rows = self.rows.lock().unwrap();
            if Self::overlaps(&rows, &event) {
                return Err(AppError::RoomUnavailable(format!(
                    "room ({}) is already reserved in the requested window",
                    event.room_id
                )));
            }
            let reservation = Reservation {
                reservation_id: ReservationId::new(),
                reserved_by: event.reserved_by,
                room_id: event.room_id,
                start_time: event.start_time,
                end_time: event.end_time,
                status: ReservationStatus::Pending,
                created_at: Local::now(),
                members: event.members,
            };
            rows.push(reservation.clone());
            Ok(reservation)
        }

        async fn is_available(
            &self,
            room_id: RoomId,
            start_time: DateTime<Local>,
            end_time: DateTime<Local>,
        ) -> AppResult<bool> {
            let rows = self.rows.lock().unwrap();
            Ok(!rows.iter().any(|r| {
                r.room_id == room_id
                    && r.status != ReservationStatus::Cancelled
                    && r.start_time < end_time
                    && r.end_time > start_time
            }))
        }

        async fn cancel(&self, reservation_id: ReservationId) -> AppResult<()> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|r| r.reservation_id == reservation_id) {
                Some(row) => {
                    row.status = ReservationStatus::Cancelled;
                    Ok(())
                }
                None => Err(AppError::EntityNotFound(format!(
                    "reservation ({reservation_id}) not found"
                ))),
            }
        }

        async fn confirm_expired(&self, now: DateTime<Local>) -> AppResult<u64> {
            let mut rows = self.rows.lock().unwrap();
            let mut affected = 0;
            for row in rows
                .iter_mut()
                .filter(|r| r.status == ReservationStatus::Pending && r.end_time <= now)
            {
                row.status = ReservationStatus::Confirmed;
                affected += 1;
            }
            Ok(affected)
        }

        async fn find_for_user(
            &self,
            user_id: UserId,
            email: &str,
        ) -> AppResult<Vec<ReservationListing>> {
            let rows = self.rows.lock().unwrap();
            let mut listings: Vec<ReservationListing> = rows
                .iter()
                .filter(|r| {
                    r.status != ReservationStatus::Cancelled
                        && (r.reserved_by == user_id
                            || r.members.iter().any(|m| m.member_email == email))
                })
                .map(|r| ReservationListing {
                    reservation_id: r.reservation_id,
                    reserved_by: r.reserved_by,
                    room_id: r.room_id,
                    room_name: "Room A".into(),
                    location: "3F".into(),
                    start_time: r.start_time,
                    end_time: r.end_time,
                    status: r.status,
                    member_count: r.members.len() as i64,
                })
                .collect();
            listings.sort_by_key(|l| l.start_time);
            Ok(listings)
        }
    }

    struct InMemoryUserRepository {
        users: Vec<User>,
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_code(&self, member_code: &str) -> AppResult<Option<User>> {
            Ok(self
                .users
                .iter()
                .find(|u| u.member_code == member_code)
                .cloned())
        }

        async fn find_by_codes(&self, member_codes: &[String]) -> AppResult<Vec<User>> {
            Ok(self
                .users
                .iter()
                .filter(|u| member_codes.contains(&u.member_code))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        created: Mutex<Vec<ReservationId>>,
    }

    impl ReservationNotifier for RecordingNotifier {
        fn reservation_created(&self, reservation: &Reservation) {
            self.created
                .lock()
                .unwrap()
                .push(reservation.reservation_id);
        }
    }

    fn user(code: &str, name: &str, email: &str) -> User {
        User {
            user_id: UserId::new(),
            member_code: code.into(),
            user_name: name.into(),
            email: email.into(),
            faculty: "Engineering".into(),
            major: "CS".into(),
        }
    }

    struct Fixture {
        service: ReservationService,
        reservations: Arc<InMemoryReservationRepository>,
        notifier: Arc<RecordingNotifier>,
        owner: User,
    }

    fn fixture() -> Fixture {
        let owner = user("1001", "Aoi", "aoi@example.com");
        let users = vec![
            owner.clone(),
            user("1002", "Ben", "ben@example.com"),
            user("1003", "Chika", "chika@example.com"),
            user("1004", "Dai", "dai@example.com"),
        ];
        let reservations = Arc::new(InMemoryReservationRepository::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = ReservationService::new(
            reservations.clone(),
            Arc::new(InMemoryUserRepository { users }),
            notifier.clone(),
        );
        Fixture {
            service,
            reservations,
            notifier,
            owner,
        }
    }

    fn dt(hour: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2030, 3, 10, hour, min, 0).unwrap()
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn book_persists_a_pending_reservation_and_notifies() {
        let f = fixture();
        let room_id = RoomId::new();

        let reservation = f
            .service
            .book(BookRoom::new(
                f.owner.user_id,
                room_id,
                dt(9, 0),
                dt(10, 30),
                codes(&["1002", "1003", "1004"]),
            ))
            .await
            .unwrap();

        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.members.len(), 3);
        assert_eq!(
            f.notifier.created.lock().unwrap().as_slice(),
            &[reservation.reservation_id]
        );

        let listings = f.service.list_for_user("1001").await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].reservation_id, reservation.reservation_id);
        assert_eq!(listings[0].status, ReservationStatus::Pending);
        assert_eq!(listings[0].member_count, 3);
    }

    #[tokio::test]
    async fn book_requires_three_distinct_member_codes() {
        let f = fixture();

        let err = f
            .service
            .book(BookRoom::new(
                f.owner.user_id,
                RoomId::new(),
                dt(9, 0),
                dt(10, 0),
                codes(&["1002", "1003"]),
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientMembers {
                required: 3,
                supplied: 2
            }
        ));

        // 重複したコードは 1 件として数える
        let err = f
            .service
            .book(BookRoom::new(
                f.owner.user_id,
                RoomId::new(),
                dt(9, 0),
                dt(10, 0),
                codes(&["1002", "1002", "1003"]),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientMembers { .. }));

        // ストアには何も書かれていない
        assert!(f.reservations.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn book_rejects_an_invalid_window_before_touching_the_store() {
        let f = fixture();

        let err = f
            .service
            .book(BookRoom::new(
                f.owner.user_id,
                RoomId::new(),
                dt(8, 0),
                dt(9, 0),
                codes(&["1002", "1003", "1004"]),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidWindow(_)));
        assert!(f.reservations.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn book_reports_every_unknown_member_code() {
        let f = fixture();

        let err = f
            .service
            .book(BookRoom::new(
                f.owner.user_id,
                RoomId::new(),
                dt(9, 0),
                dt(10, 0),
                codes(&["1002", "9901", "9902"]),
            ))
            .await
            .unwrap_err();

        let AppError::UnknownMembers(mut missing) = err else {
            panic!("expected UnknownMembers");
        };
        missing.sort();
        assert_eq!(missing, vec!["9901".to_string(), "9902".to_string()]);
        assert!(f.reservations.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn overlapping_bookings_conflict_and_adjacent_ones_do_not() {
        let f = fixture();
        let room_id = RoomId::new();
        let members = codes(&["1002", "1003", "1004"]);

        // 09:00-10:30 を確保
        f.service
            .book(BookRoom::new(
                f.owner.user_id,
                room_id,
                dt(9, 0),
                dt(10, 30),
                members.clone(),
            ))
            .await
            .unwrap();

        // 10:00-11:00 は 10:00-10:30 で重なる
        let err = f
            .service
            .book(BookRoom::new(
                f.owner.user_id,
                room_id,
                dt(10, 0),
                dt(11, 0),
                members.clone(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoomUnavailable(_)));

        // 10:30-11:30 は隣接しているだけなので成立する（半開区間）
        f.service
            .book(BookRoom::new(
                f.owner.user_id,
                room_id,
                dt(10, 30),
                dt(11, 30),
                members.clone(),
            ))
            .await
            .unwrap();

        // 別の部屋なら同じ時間帯でも成立する
        f.service
            .book(BookRoom::new(
                f.owner.user_id,
                RoomId::new(),
                dt(9, 0),
                dt(10, 30),
                members,
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelling_frees_the_window_for_a_new_booking() {
        let f = fixture();
        let room_id = RoomId::new();
        let members = codes(&["1002", "1003", "1004"]);

        let reservation = f
            .service
            .book(BookRoom::new(
                f.owner.user_id,
                room_id,
                dt(9, 0),
                dt(10, 0),
                members.clone(),
            ))
            .await
            .unwrap();

        f.service.cancel(reservation.reservation_id).await.unwrap();

        // キャンセル済みの行は重なり判定から除外される
        f.service
            .book(BookRoom::new(
                f.owner.user_id,
                room_id,
                dt(9, 0),
                dt(10, 0),
                members,
            ))
            .await
            .unwrap();

        // キャンセル済みの予約は一覧にも出ない
        let listings = f.service.list_for_user("1001").await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_ne!(listings[0].reservation_id, reservation.reservation_id);
    }

    #[tokio::test]
    async fn cancel_of_an_unknown_reservation_is_not_found() {
        let f = fixture();
        let err = f.service.cancel(ReservationId::new()).await.unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn listing_includes_reservations_where_the_user_is_a_member() {
        let f = fixture();

        f.service
            .book(BookRoom::new(
                f.owner.user_id,
                RoomId::new(),
                dt(9, 0),
                dt(10, 0),
                codes(&["1002", "1003", "1004"]),
            ))
            .await
            .unwrap();

        // 1002 は所有者ではないがメンバーとして載っている
        let listings = f.service.list_for_user("1002").await.unwrap();
        assert_eq!(listings.len(), 1);

        // 存在しないコードは NotFound
        let err = f.service.list_for_user("0000").await.unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }

    #[tokio::test]
    async fn the_sweep_confirms_expired_pending_reservations_once() {
        let f = fixture();
        let now = Local::now();

        // 終了時刻が過ぎた予約を直接ストアに入れる（サービス経由では過去日は弾かれる）
        f.reservations
            .create(CreateReservation::new(
                f.owner.user_id,
                RoomId::new(),
                now - Duration::hours(2),
                now - Duration::hours(1),
                vec![ReservationMember {
                    member_name: "Ben".into(),
                    member_email: "ben@example.com".into(),
                }],
            ))
            .await
            .unwrap();

        // 一覧取得が sweep を兼ねる
        let listings = f.service.list_for_user("1001").await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].status, ReservationStatus::Confirmed);

        // 2 回目は何も変わらない
        assert_eq!(f.service.confirm_expired(Local::now()).await.unwrap(), 0);
        let listings = f.service.list_for_user("1001").await.unwrap();
        assert_eq!(listings[0].status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn cancel_applies_regardless_of_current_status() {
        let f = fixture();
        let now = Local::now();

        // 終了済みの予約を直接ストアに入れ、sweep で CONFIRMED にしておく
        let reservation = f
            .reservations
            .create(CreateReservation::new(
                f.owner.user_id,
                RoomId::new(),
                now - Duration::hours(2),
                now - Duration::hours(1),
                vec![],
            ))
            .await
            .unwrap();
        assert_eq!(f.service.confirm_expired(now).await.unwrap(), 1);

        // CONFIRMED の予約もキャンセルできる
        f.service.cancel(reservation.reservation_id).await.unwrap();
        assert_eq!(
            f.reservations.rows.lock().unwrap()[0].status,
            ReservationStatus::Cancelled
        );

        // 再度のキャンセルもエラーにならず、状態は変わらない
        f.service.cancel(reservation.reservation_id).await.unwrap();
        assert_eq!(
            f.reservations.rows.lock().unwrap()[0].status,
            ReservationStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn the_sweep_never_resurrects_a_cancelled_reservation() {
        let f = fixture();
        let now = Local::now();

        // 終了時刻を過ぎた PENDING をキャンセルしてから sweep を回す
        let reservation = f
            .reservations
            .create(CreateReservation::new(
                f.owner.user_id,
                RoomId::new(),
                now - Duration::hours(2),
                now - Duration::hours(1),
                vec![],
            ))
            .await
            .unwrap();
        f.service.cancel(reservation.reservation_id).await.unwrap();

        // CANCELLED は終了済みでも sweep の対象外
        assert_eq!(f.service.confirm_expired(Local::now()).await.unwrap(), 0);
        assert_eq!(
            f.reservations.rows.lock().unwrap()[0].status,
            ReservationStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn check_member_resolves_a_single_code() {
        let f = fixture();

        let found = f.service.check_member("1002").await.unwrap();
        assert_eq!(found.user_name, "Ben");

        let err = f.service.check_member("9901").await.unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }
}
